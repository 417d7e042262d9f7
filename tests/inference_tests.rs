//! End-to-end tests for XML-to-XSD inference
//!
//! Each test feeds a sample document through the whole pipeline and checks
//! the produced XSD text or the inferred model.

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::collections::HashSet;
use xml2xsd::{
    build_schema, check_schema, convert_xml_to_xsd, infer_primitive, parse_xml, render_xsd,
    Converter, Error, MaxOccurs, PrimitiveType, TypeScope, XsdConverter, XSD_NAMESPACE,
};

/// Every `type`/`base` reference must be a known primitive or a complex type
/// defined exactly once in the same document.
fn assert_no_dangling_references(xsd: &str) {
    let doc = roxmltree::Document::parse(xsd).expect("generated XSD must be well-formed");
    let schema = doc.root_element();
    assert_eq!(schema.tag_name().namespace(), Some(XSD_NAMESPACE));

    let defined: Vec<&str> = schema
        .children()
        .filter(|n| n.has_tag_name((XSD_NAMESPACE, "complexType")))
        .filter_map(|n| n.attribute("name"))
        .collect();
    let unique: HashSet<&str> = defined.iter().copied().collect();
    assert_eq!(defined.len(), unique.len(), "complex types defined twice");

    for node in schema.descendants().filter(|n| n.is_element()) {
        for attr in ["type", "base"] {
            if let Some(value) = node.attribute(attr) {
                let local = value.rsplit(':').next().unwrap();
                if value.starts_with("xs:") {
                    assert!(PrimitiveType::from_xsd_name(local).is_some(), "{}", value);
                } else {
                    assert!(unique.contains(local), "dangling reference {}", value);
                }
            }
        }
    }
}

/// A sequence may declare each element name only once.
fn assert_sequences_declare_each_name_once(xsd: &str) {
    let doc = roxmltree::Document::parse(xsd).expect("generated XSD must be well-formed");
    for sequence in doc.descendants().filter(|n| n.has_tag_name((XSD_NAMESPACE, "sequence"))) {
        let mut seen = HashSet::new();
        for element in sequence.children().filter(|n| n.is_element()) {
            let name = element.attribute("name").unwrap();
            assert!(seen.insert(name), "sequence declares '{}' twice", name);
        }
    }
}

#[test]
fn scenario_flat_record() {
    let xsd = convert_xml_to_xsd("<person><name>John Doe</name><age>30</age></person>").unwrap();
    assert!(xsd.contains(r#"<xs:complexType name="personType">"#));
    assert!(xsd.contains(
        r#"<xs:element name="name" type="xs:string" minOccurs="0" maxOccurs="1"/>"#
    ));
    assert!(xsd.contains(
        r#"<xs:element name="age" type="xs:integer" minOccurs="0" maxOccurs="1"/>"#
    ));
    let name_at = xsd.find(r#"name="name""#).unwrap();
    let age_at = xsd.find(r#"name="age""#).unwrap();
    assert!(name_at < age_at, "sequence keeps document order");
}

#[test]
fn scenario_repeated_children() {
    let xsd = convert_xml_to_xsd("<cart><item>A</item><item>B</item></cart>").unwrap();
    assert_eq!(xsd.matches(r#"<xs:element name="item""#).count(), 1);
    assert!(xsd.contains(r#"maxOccurs="unbounded""#));
}

#[test]
fn scenario_attributes() {
    let xsd = convert_xml_to_xsd(r#"<book isbn="123">Title</book>"#).unwrap();
    assert!(xsd.contains(r#"<xs:complexType name="bookType">"#));
    assert!(xsd.contains("<xs:simpleContent>"));
    assert!(xsd.contains(r#"<xs:attribute name="isbn" type="xs:integer" use="optional"/>"#));
}

#[test]
fn scenario_malformed_input() {
    match convert_xml_to_xsd("<a><b></a>") {
        Err(Error::Parse(err)) => assert!(!err.message.is_empty()),
        other => panic!("expected a parse error, got {:?}", other),
    }
}

#[test]
fn type_deduplication_across_parents() {
    let xml = r#"<customer>
        <billing><address><street>Main 1</street><zip>12345</zip></address></billing>
        <shipping><address><street>Side 2</street><zip>54321</zip></address></shipping>
    </customer>"#;
    let xsd = convert_xml_to_xsd(xml).unwrap();
    assert_eq!(xsd.matches(r#"<xs:complexType name="addressType">"#).count(), 1);
    assert_eq!(xsd.matches(r#"type="addressType""#).count(), 2);
    assert_no_dangling_references(&xsd);
}

#[test]
fn parent_scope_keeps_same_tag_types_apart() {
    let xml = "<r><a><name>x</name></a><b><name><first>y</first></name></b></r>";
    let xsd = XsdConverter::new()
        .with_type_scope(TypeScope::Parent)
        .convert(xml)
        .unwrap();
    assert!(xsd.contains(r#"<xs:complexType name="bNameType">"#));
    assert!(xsd.contains(
        r#"<xs:element name="name" type="xs:string" minOccurs="0" maxOccurs="1"/>"#
    ));
    assert!(!xsd.contains("mixed="));
    assert_no_dangling_references(&xsd);
}

#[test]
fn prefixed_siblings_share_one_declaration() {
    let xml = r#"<r xmlns:a="urn:a" xmlns:b="urn:b"><a:item x="1"/><b:item y="2"/></r>"#;
    let xsd = convert_xml_to_xsd(xml).unwrap();
    assert_sequences_declare_each_name_once(&xsd);
    assert_no_dangling_references(&xsd);
    assert!(xsd.contains(
        r#"<xs:element name="item" type="itemType" minOccurs="0" maxOccurs="unbounded"/>"#
    ));
    assert!(xsd.contains(r#"<xs:attribute name="x" type="xs:integer" use="optional"/>"#));
    assert!(xsd.contains(r#"<xs:attribute name="y" type="xs:integer" use="optional"/>"#));
}

#[test]
fn attribute_type_conflict_resolves_to_string() {
    let xsd = convert_xml_to_xsd(r#"<r><v id="7"/><v id="seven"/></r>"#).unwrap();
    assert!(xsd.contains(r#"<xs:attribute name="id" type="xs:string" use="optional"/>"#));
}

#[test]
fn complex_types_follow_first_reference_order() {
    let xsd = convert_xml_to_xsd(r#"<r><a><x k="1"/></a><b><y/></b></r>"#).unwrap();
    let order: Vec<usize> = ["rType", "aType", "bType", "xType"]
        .iter()
        .map(|name| xsd.find(&format!(r#"complexType name="{}""#, name)).unwrap())
        .collect();
    let mut sorted = order.clone();
    sorted.sort();
    assert_eq!(order, sorted);
}

#[test]
fn render_accepts_explicit_root_and_namespace() {
    let root = parse_xml("<doc><p>1</p></doc>").unwrap();
    let schema = build_schema(&root).unwrap();
    let xsd = render_xsd(&schema, "doc", Some("urn:docs")).unwrap();
    assert!(xsd.contains(r#"targetNamespace="urn:docs""#));
    assert!(xsd.contains(r#"<xs:element name="doc" type="tns:docType"/>"#));
}

#[test]
fn realistic_document_is_structurally_sound() {
    let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<!-- inventory export -->
<inventory xmlns="http://example.com/inventory" generated="2024-05-01T12:00:00Z">
  <warehouse code="W1" active="true">
    <product sku="A-1">
      <name>Widget</name>
      <price currency="EUR">9.99</price>
      <stock>120</stock>
      <added>2023-11-02</added>
      <tag>blue</tag>
      <tag>small</tag>
    </product>
    <product sku="B-2">
      <name>Gadget</name>
      <price currency="USD">1.5e2</price>
      <stock>0</stock>
      <description>Works <em>really</em> well</description>
    </product>
  </warehouse>
</inventory>"#;
    let xsd = convert_xml_to_xsd(xml).unwrap();
    assert_no_dangling_references(&xsd);
    assert!(check_schema(&xsd).is_valid());

    assert!(xsd.contains(r#"<xs:attribute name="generated" type="xs:dateTime" use="optional"/>"#));
    assert!(xsd.contains(r#"<xs:attribute name="active" type="xs:boolean" use="optional"/>"#));
    assert!(xsd.contains(r#"<xs:element name="added" type="xs:date" minOccurs="0" maxOccurs="1"/>"#));
    assert!(xsd.contains(r#"<xs:element name="tag" type="xs:string" minOccurs="0" maxOccurs="unbounded"/>"#));
    assert!(xsd.contains(r#"<xs:complexType name="descriptionType" mixed="true">"#));
    // 9.99 and 1.5e2 disagree, so the text falls back to string
    assert!(xsd.contains(r#"<xs:extension base="xs:string">"#));
}

#[test]
fn model_records_cardinality() {
    let root = parse_xml("<l><i/><i/><j/></l>").unwrap();
    let schema = build_schema(&root).unwrap();
    let list = schema.root_type();
    assert_eq!(list.children["i"].max_occurs, MaxOccurs::Unbounded);
    assert_eq!(list.children["j"].max_occurs, MaxOccurs::Bounded(1));
    assert!(list.children.values().all(|c| c.min_occurs == 0));
}

fn arb_tag() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["a", "b", "item", "name", "node"]).prop_map(str::to_string)
}

fn arb_text() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        "[a-z]{1,8}",
        "-?[0-9]{1,6}",
        "[0-9]{1,3}\\.[0-9]{1,3}",
        Just("true".to_string()),
        Just("2024-02-29".to_string()),
    ]
}

fn arb_xml() -> impl Strategy<Value = String> {
    let leaf = (arb_tag(), arb_text()).prop_map(|(tag, text)| format!("<{0}>{1}</{0}>", tag, text));
    leaf.prop_recursive(4, 32, 4, |inner| {
        (arb_tag(), prop::collection::vec(inner, 0..4), prop::option::of(arb_text()))
            .prop_map(|(tag, children, attr)| {
                let attr = attr.map(|v| format!(r#" k="{}""#, v)).unwrap_or_default();
                format!("<{0}{1}>{2}</{0}>", tag, attr, children.concat())
            })
    })
}

proptest! {
    #[test]
    fn conversion_is_deterministic(xml in arb_xml()) {
        let first = convert_xml_to_xsd(&xml).unwrap();
        let second = convert_xml_to_xsd(&xml).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn generated_schemas_have_no_dangling_references(xml in arb_xml()) {
        let xsd = convert_xml_to_xsd(&xml).unwrap();
        assert_no_dangling_references(&xsd);
        assert_sequences_declare_each_name_once(&xsd);
        prop_assert!(xsd.ends_with("</xs:schema>\n"));
        prop_assert!(xsd.lines().all(|line| line == line.trim_end()));
    }

    #[test]
    fn integers_are_always_integer(value in "[+-]?[0-9]{1,18}") {
        prop_assert_eq!(infer_primitive(&value), PrimitiveType::Integer);
    }

    #[test]
    fn decimals_are_always_decimal(value in "[+-]?[0-9]{0,6}\\.[0-9]{1,6}") {
        prop_assert_eq!(infer_primitive(&value), PrimitiveType::Decimal);
    }

    #[test]
    fn dates_are_always_date(value in "[0-9]{4}-[0-9]{2}-[0-9]{2}") {
        prop_assert_eq!(infer_primitive(&value), PrimitiveType::Date);
    }

    #[test]
    fn booleans_win_over_everything(value in "(?i:true|false)") {
        prop_assert_eq!(infer_primitive(&value), PrimitiveType::Boolean);
    }
}
