//! XML document parsing
//!
//! Turns raw XML text into an owned element tree. Attribute and child order
//! follow the source exactly, since they decide the order of the generated
//! sequences and attribute lists.

use crate::error::{Error, ParseError, Result};
use crate::limits::Limits;
use crate::names::{is_valid_qname, split_qname};
use crate::namespaces::NamespaceContext;
use indexmap::IndexMap;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// XML Element in the document tree
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    /// Tag name as written, including any prefix
    pub name: String,
    /// Attributes in source order, without namespace declarations
    /// and `xsi:*` instance attributes
    pub attributes: IndexMap<String, String>,
    /// Direct text content, trimmed; `None` when there is none
    pub text: Option<String>,
    /// Child elements in source order
    pub children: Vec<Element>,
    /// Namespace declarations made on this element
    pub namespaces: NamespaceContext,
}

impl Element {
    /// Create a new element
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: IndexMap::new(),
            text: None,
            children: Vec::new(),
            namespaces: NamespaceContext::new(),
        }
    }

    /// Add an attribute
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Add a child element
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Set text content
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Get the local name of the element
    pub fn local_name(&self) -> &str {
        split_qname(&self.name).1
    }

    /// Get the prefix of the element name, if any
    pub fn prefix(&self) -> Option<&str> {
        split_qname(&self.name).0
    }

    /// Namespace this element's name resolves to, using its own declarations
    pub fn namespace(&self) -> Option<&str> {
        self.namespaces.element_namespace(self.prefix())
    }

    /// Get an attribute value by name
    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(|s| s.as_str())
    }

    /// Find child elements by tag name
    pub fn find_children(&self, name: &str) -> Vec<&Element> {
        self.children.iter().filter(|e| e.name == name).collect()
    }

    /// True when the element has non-empty direct text
    pub fn has_text(&self) -> bool {
        self.text.is_some()
    }

    fn append_text(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        match self.text {
            Some(ref mut existing) => {
                existing.push(' ');
                existing.push_str(text);
            }
            None => self.text = Some(text.to_string()),
        }
    }
}

// Children are detached before they drop, so deep trees are freed without
// recursion.
impl Drop for Element {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut child) = pending.pop() {
            pending.append(&mut child.children);
        }
    }
}

/// Parse an XML document with default limits, returning its root element
pub fn parse(xml: &str) -> Result<Element> {
    parse_with_limits(xml, &Limits::default())
}

/// Parse an XML document, returning its root element
pub fn parse_with_limits(xml: &str, limits: &Limits) -> Result<Element> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| error_at(xml, reader.buffer_position(), e.to_string()))?;
        let position = reader.buffer_position();

        match event {
            Event::Start(e) => {
                if stack.is_empty() && root.is_some() {
                    return Err(error_at(xml, position, "multiple root elements"));
                }
                let element = open_element(&e, &stack, limits)
                    .map_err(|err| locate(err, xml, position))?;
                stack.push(element);
                limits.check_xml_depth(stack.len())?;
            }
            Event::Empty(e) => {
                let element = open_element(&e, &stack, limits)
                    .map_err(|err| locate(err, xml, position))?;
                limits.check_xml_depth(stack.len() + 1)?;
                close_element(element, &mut stack, &mut root)
                    .map_err(|err| locate(err, xml, position))?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| error_at(xml, position, "end tag without start tag"))?;
                close_element(element, &mut stack, &mut root)
                    .map_err(|err| locate(err, xml, position))?;
            }
            Event::Text(e) => {
                let text = e
                    .unescape()
                    .map_err(|e| error_at(xml, position, format!("invalid text: {}", e)))?;
                append_text(&mut stack, &text).map_err(|err| locate(err, xml, position))?;
            }
            Event::CData(e) => {
                let bytes = e.into_inner();
                let text = std::str::from_utf8(&bytes)
                    .map_err(|e| error_at(xml, position, format!("invalid CDATA: {}", e)))?;
                append_text(&mut stack, text).map_err(|err| locate(err, xml, position))?;
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions and DOCTYPE carry no structure
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(error_at(
            xml,
            xml.len(),
            format!("unexpected end of document: element <{}> is not closed", open.name),
        ));
    }

    root.ok_or_else(|| ParseError::new("document contains no root element").into())
}

/// Build an element from a start tag
fn open_element(start: &BytesStart, stack: &[Element], limits: &Limits) -> Result<Element> {
    let name = std::str::from_utf8(start.name().as_ref())
        .map_err(|e| ParseError::new(format!("invalid element name: {}", e)))?
        .to_string();
    if !is_valid_qname(&name) {
        return Err(ParseError::new(format!("invalid element name '{}'", name)).into());
    }

    let mut element = Element::new(name);
    let mut regular = Vec::new();

    for attr_result in start.attributes() {
        let attr = attr_result.map_err(|e| ParseError::new(format!("invalid attribute: {}", e)))?;

        let attr_name = std::str::from_utf8(attr.key.as_ref())
            .map_err(|e| ParseError::new(format!("invalid attribute name: {}", e)))?
            .to_string();
        let attr_value = attr
            .unescape_value()
            .map_err(|e| {
                ParseError::new(format!("invalid value for attribute '{}': {}", attr_name, e))
            })?
            .to_string();

        // Namespace declarations are collected first so that prefixes declared
        // on this tag resolve for its own attributes.
        if attr_name == "xmlns" {
            element.namespaces.set_default_namespace(attr_value);
        } else if let Some(prefix) = attr_name.strip_prefix("xmlns:") {
            element.namespaces.add_prefix(prefix, attr_value);
        } else if is_valid_qname(&attr_name) {
            regular.push((attr_name, attr_value));
        } else {
            return Err(ParseError::new(format!("invalid attribute name '{}'", attr_name)).into());
        }
    }

    limits.check_namespaces(element.namespaces.len())?;
    limits.check_attributes(regular.len())?;

    for (attr_name, attr_value) in regular {
        if let (Some(prefix), _) = split_qname(&attr_name) {
            if is_instance_attribute(prefix, &element, stack) {
                continue;
            }
        }
        element.attributes.insert(attr_name, attr_value);
    }

    Ok(element)
}

/// True if the nearest declaration of `prefix` (this element first, then its
/// ancestors) binds it to the XML Schema instance namespace
fn is_instance_attribute(prefix: &str, element: &Element, stack: &[Element]) -> bool {
    std::iter::once(element)
        .chain(stack.iter().rev())
        .map(|e| &e.namespaces)
        .find(|ctx| ctx.get_namespace(prefix).is_some())
        .is_some_and(|ctx| ctx.is_instance_prefix(prefix))
}

fn close_element(
    element: Element,
    stack: &mut [Element],
    root: &mut Option<Element>,
) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
    } else if root.is_some() {
        return Err(ParseError::new("multiple root elements").into());
    } else {
        *root = Some(element);
    }
    Ok(())
}

fn append_text(stack: &mut [Element], text: &str) -> Result<()> {
    match stack.last_mut() {
        Some(current) => {
            current.append_text(text);
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(ParseError::new("text outside of the root element").into()),
    }
}

/// Attach a location to parse errors that do not have one yet
fn locate(err: Error, xml: &str, position: usize) -> Error {
    match err {
        Error::Parse(parse) if parse.location.is_none() => {
            Error::Parse(parse.with_location(line_column(xml, position)))
        }
        other => other,
    }
}

fn error_at(xml: &str, position: usize, message: impl Into<String>) -> Error {
    ParseError::new(message)
        .with_location(line_column(xml, position))
        .into()
}

/// Convert a byte offset into a 1-based `line:column` string
pub fn line_column(text: &str, position: usize) -> String {
    let bytes = &text.as_bytes()[..position.min(text.len())];
    let line = bytes.iter().filter(|&&b| b == b'\n').count() + 1;
    let column = match bytes.iter().rposition(|&b| b == b'\n') {
        Some(newline) => bytes.len() - newline,
        None => bytes.len() + 1,
    };
    format!("{}:{}", line, column)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_err(xml: &str) -> ParseError {
        match parse(xml) {
            Err(Error::Parse(err)) => err,
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_simple_xml() {
        let root = parse(r#"<root><child>text</child></root>"#).unwrap();

        assert_eq!(root.local_name(), "root");
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].name, "child");
        assert_eq!(root.children[0].text.as_deref(), Some("text"));
        assert!(root.text.is_none());
    }

    #[test]
    fn test_attribute_order_is_preserved() {
        let root = parse(r#"<root zeta="1" alpha="2" mid="3"/>"#).unwrap();
        let names: Vec<&str> = root.attributes.keys().map(|k| k.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
        assert_eq!(root.get_attribute("alpha"), Some("2"));
    }

    #[test]
    fn test_child_order_is_preserved() {
        let root = parse("<r><b/><a/><b/><c/></r>").unwrap();
        let names: Vec<&str> = root.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a", "b", "c"]);
        assert_eq!(root.find_children("b").len(), 2);
    }

    #[test]
    fn test_parse_with_namespaces() {
        let xml = r#"<root xmlns="http://example.com" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:noNamespaceSchemaLocation="r.xsd" id="7"/>"#;
        let root = parse(xml).unwrap();

        assert_eq!(root.namespaces.get_default_namespace(), Some("http://example.com"));
        assert_eq!(root.namespace(), Some("http://example.com"));
        assert_eq!(root.attributes.len(), 1);
        assert_eq!(root.get_attribute("id"), Some("7"));
    }

    #[test]
    fn test_rebound_instance_prefix_is_kept() {
        let xml = r#"<r xmlns:i="http://www.w3.org/2001/XMLSchema-instance"><b xmlns:i="urn:other" i:nil="true"/></r>"#;
        let root = parse(xml).unwrap();
        assert_eq!(root.children[0].get_attribute("i:nil"), Some("true"));
    }

    #[test]
    fn test_prefixed_root_namespace() {
        let root = parse(r#"<p:root xmlns:p="urn:p"><p:a/></p:root>"#).unwrap();
        assert_eq!(root.prefix(), Some("p"));
        assert_eq!(root.namespace(), Some("urn:p"));
    }

    #[test]
    fn test_instance_attributes_declared_on_ancestor_are_dropped() {
        let xml = r#"<r xmlns:i="http://www.w3.org/2001/XMLSchema-instance"><v i:nil="true" x="1"/></r>"#;
        let root = parse(xml).unwrap();
        let child = &root.children[0];
        assert_eq!(child.attributes.len(), 1);
        assert_eq!(child.get_attribute("x"), Some("1"));
    }

    #[test]
    fn test_mixed_text_is_joined() {
        let root = parse("<p>Hello <b>big</b> world</p>").unwrap();
        assert_eq!(root.text.as_deref(), Some("Hello world"));
        assert_eq!(root.children[0].text.as_deref(), Some("big"));
    }

    #[test]
    fn test_entities_and_cdata() {
        let root = parse("<r><a>x &amp; y</a><b><![CDATA[<raw>]]></b></r>").unwrap();
        assert_eq!(root.children[0].text.as_deref(), Some("x & y"));
        assert_eq!(root.children[1].text.as_deref(), Some("<raw>"));
    }

    #[test]
    fn test_prolog_comments_and_pis_are_ignored() {
        let xml = "<?xml version=\"1.0\"?>\n<!-- c -->\n<?pi data?>\n<r><!-- inner --><a>1</a></r>\n<!-- trailing -->\n";
        let root = parse(xml).unwrap();
        assert_eq!(root.name, "r");
        assert_eq!(root.children.len(), 1);
        assert!(root.text.is_none());
    }

    #[test]
    fn test_mismatched_end_tag() {
        let err = parse_err("<a><b></a>");
        assert!(err.location.is_some());
    }

    #[test]
    fn test_unclosed_element() {
        parse_err("<a><b></b>");
        parse_err("<a>");
    }

    #[test]
    fn test_no_root_element() {
        let err = parse_err("   ");
        assert!(err.message.contains("no root element"));
        parse_err("<!-- only a comment -->");
    }

    #[test]
    fn test_multiple_roots() {
        let err = parse_err("<a/><b/>");
        assert!(err.message.contains("multiple root"));
    }

    #[test]
    fn test_text_outside_root() {
        parse_err("hello <a/>");
        parse_err("<a/> trailing");
    }

    #[test]
    fn test_invalid_names_and_escapes() {
        parse_err("<1a/>");
        parse_err("<a>&bogus;</a>");
        parse_err(r#"<a x="1" x="2"/>"#);
    }

    #[test]
    fn test_depth_limit() {
        let limits = Limits {
            max_xml_depth: 3,
            ..Limits::default()
        };
        assert!(parse_with_limits("<a><b><c/></b></a>", &limits).is_ok());
        let err = parse_with_limits("<a><b><c><d/></c></b></a>", &limits).unwrap_err();
        assert!(matches!(err, Error::LimitExceeded(_)));
    }

    #[test]
    fn test_line_column() {
        assert_eq!(line_column("abc", 0), "1:1");
        assert_eq!(line_column("abc", 2), "1:3");
        assert_eq!(line_column("ab\ncd", 4), "2:2");
        assert_eq!(line_column("ab", 99), "1:3");
    }
}
