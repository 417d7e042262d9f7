//! XML namespace handling
//!
//! Namespace declarations are only tracked as far as the schema needs them:
//! the declarations made on an element, and the URI its own name resolves to.

use std::collections::HashMap;

/// XML Schema namespace, bound to the `xs` prefix in generated schemas
pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

/// XML Schema instance namespace (`xsi:type`, `xsi:schemaLocation`, ...)
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// XML namespace, implicitly bound to the `xml` prefix
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// Prefix bound to the target namespace in generated schemas
pub const TNS_PREFIX: &str = "tns";

/// XML Namespace URI
pub type NamespaceUri = String;

/// Namespace prefix
pub type Prefix = String;

/// Namespace declarations made on one element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceContext {
    /// Mapping from prefix to namespace URI
    prefixes: HashMap<Prefix, NamespaceUri>,
    /// Default namespace (no prefix)
    default_namespace: Option<NamespaceUri>,
}

impl NamespaceContext {
    /// Create a new empty namespace context
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a namespace prefix mapping
    pub fn add_prefix(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        self.prefixes.insert(prefix.into(), namespace.into());
    }

    /// Set the default namespace
    pub fn set_default_namespace(&mut self, namespace: impl Into<String>) {
        self.default_namespace = Some(namespace.into());
    }

    /// Get the namespace for a prefix
    pub fn get_namespace(&self, prefix: &str) -> Option<&str> {
        match prefix {
            "xml" => Some(XML_NAMESPACE),
            _ => self.prefixes.get(prefix).map(|s| s.as_str()),
        }
    }

    /// Get the default namespace
    pub fn get_default_namespace(&self) -> Option<&str> {
        self.default_namespace.as_deref()
    }

    /// Number of declarations in this context
    pub fn len(&self) -> usize {
        self.prefixes.len() + usize::from(self.default_namespace.is_some())
    }

    /// True when nothing is declared
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Namespace URI a (possibly prefixed) element name belongs to
    ///
    /// An empty default namespace (`xmlns=""`) means no namespace.
    pub fn element_namespace(&self, prefix: Option<&str>) -> Option<&str> {
        let uri = match prefix {
            Some(prefix) => self.get_namespace(prefix),
            None => self.get_default_namespace(),
        };
        uri.filter(|uri| !uri.is_empty())
    }

    /// True if `prefix` is bound to the XML Schema instance namespace
    pub fn is_instance_prefix(&self, prefix: &str) -> bool {
        self.get_namespace(prefix) == Some(XSI_NAMESPACE)
    }
}
