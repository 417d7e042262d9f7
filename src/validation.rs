//! Structural checks for generated schemas
//!
//! These are sanity checks, not XML Schema validation: a schema passes when
//! it is well-formed, rooted at `xs:schema`, defines each complex type once
//! and every `type`/`base` reference resolves. An instance passes when it is
//! well-formed and its root element is declared at the top level.

use crate::documents::parse;
use crate::inference::PrimitiveType;
use crate::names::split_qname;
use crate::namespaces::XSD_NAMESPACE;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Built-in XSD types beyond the ones inference produces
const OTHER_BUILTINS: &[&str] = &[
    "anyType",
    "anySimpleType",
    "anyURI",
    "byte",
    "duration",
    "float",
    "gDay",
    "gMonth",
    "gMonthDay",
    "gYear",
    "gYearMonth",
    "hexBinary",
    "ID",
    "IDREF",
    "int",
    "language",
    "long",
    "Name",
    "NCName",
    "negativeInteger",
    "NMTOKEN",
    "nonNegativeInteger",
    "nonPositiveInteger",
    "normalizedString",
    "positiveInteger",
    "QName",
    "short",
    "token",
    "unsignedByte",
    "unsignedInt",
    "unsignedLong",
    "unsignedShort",
];

fn is_builtin(local: &str) -> bool {
    PrimitiveType::from_xsd_name(local).is_some() || OTHER_BUILTINS.contains(&local)
}

/// Outcome of a structural check
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// Problems that make the input unusable
    pub errors: Vec<String>,
    /// Oddities that do not
    pub warnings: Vec<String>,
}

impl ValidationReport {
    /// True when no errors were found
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    fn warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }
}

/// Top-level declarations collected from a schema
#[derive(Debug, Default)]
struct SchemaOutline {
    elements: HashSet<String>,
}

/// Check that a schema is well-formed and has no dangling type references
pub fn check_schema(xsd: &str) -> ValidationReport {
    let mut report = ValidationReport::default();
    outline_schema(xsd, &mut report);
    report
}

/// Check an instance document against the top-level declarations of a schema
pub fn check_instance(xml: &str, xsd: &str) -> ValidationReport {
    let mut report = ValidationReport::default();

    let root = match parse(xml) {
        Ok(root) => Some(root),
        Err(err) => {
            report.error(format!("Invalid XML format: {}", err));
            None
        }
    };
    let outline = outline_schema(xsd, &mut report);

    if let (Some(root), Some(outline)) = (root, outline) {
        if !outline.elements.contains(root.local_name()) {
            report.error(format!(
                "root element '{}' is not declared in the schema",
                root.local_name()
            ));
        }
    }
    report
}

fn outline_schema(xsd: &str, report: &mut ValidationReport) -> Option<SchemaOutline> {
    let doc = match roxmltree::Document::parse(xsd) {
        Ok(doc) => doc,
        Err(err) => {
            report.error(format!("Invalid XSD format: {}", err));
            return None;
        }
    };

    let schema = doc.root_element();
    if schema.tag_name().name() != "schema" || schema.tag_name().namespace() != Some(XSD_NAMESPACE) {
        report.error(format!(
            "root element is '{}', expected xs:schema",
            schema.tag_name().name()
        ));
        return None;
    }
    let target_namespace = schema.attribute("targetNamespace");

    let mut outline = SchemaOutline::default();
    let mut complex_types: HashMap<&str, usize> = HashMap::new();
    let mut defined_order = Vec::new();

    for child in schema.children().filter(|n| n.is_element()) {
        if child.tag_name().namespace() != Some(XSD_NAMESPACE) {
            continue;
        }
        let Some(name) = child.attribute("name") else {
            continue;
        };
        match child.tag_name().name() {
            "element" => {
                outline.elements.insert(name.to_string());
            }
            "complexType" => {
                let count = complex_types.entry(name).or_insert(0);
                *count += 1;
                if *count == 1 {
                    defined_order.push(name);
                } else if *count == 2 {
                    report.error(format!("complex type '{}' is defined more than once", name));
                }
            }
            _ => {}
        }
    }

    let mut referenced = HashSet::new();
    for node in schema.descendants().filter(|n| n.is_element()) {
        for attr in ["type", "base"] {
            let Some(value) = node.attribute(attr) else {
                continue;
            };
            let (prefix, local) = split_qname(value);
            let Some(namespace) = node.lookup_namespace_uri(prefix) else {
                match prefix {
                    Some(prefix) => report.error(format!(
                        "reference '{}' uses undeclared prefix '{}'",
                        value, prefix
                    )),
                    None if complex_types.contains_key(local) && target_namespace.is_none() => {
                        referenced.insert(local);
                    }
                    None => report.error(format!("reference '{}' does not resolve", value)),
                }
                continue;
            };

            if namespace == XSD_NAMESPACE {
                if !is_builtin(local) {
                    report.error(format!("'{}' is not a built-in XSD type", value));
                }
            } else if Some(namespace) == target_namespace && complex_types.contains_key(local) {
                referenced.insert(local);
            } else {
                report.error(format!("reference '{}' does not resolve", value));
            }
        }
    }

    for name in defined_order {
        if !referenced.contains(name) {
            report.warning(format!("complex type '{}' is never referenced", name));
        }
    }

    Some(outline)
}
