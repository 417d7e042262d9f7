//! The XML-to-XSD conversion pipeline
//!
//! Parse, build and render run back to back on one input. Nothing is cached
//! between calls, so a converter can be shared freely across threads.

use crate::builder::{build_schema_with_options, InferenceOptions, TypeScope};
use crate::documents::parse_with_limits;
use crate::error::Result;
use crate::limits::Limits;
use crate::model::Schema;
use tracing::debug;

/// A one-shot text-to-text format converter
pub trait Converter {
    /// Convert the input text, failing without partial output
    fn convert(&self, input: &str) -> Result<String>;

    /// Short name of the conversion, e.g. `xml-to-xsd`
    fn name(&self) -> &'static str;
}

/// Infers an XSD document from a sample XML document
#[derive(Debug, Clone, Default)]
pub struct XsdConverter {
    options: InferenceOptions,
}

impl XsdConverter {
    /// Create a converter with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a converter with the given options
    pub fn with_options(options: InferenceOptions) -> Self {
        Self { options }
    }

    /// Set the limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.options.limits = limits;
        self
    }

    /// Set the type scope
    pub fn with_type_scope(mut self, type_scope: TypeScope) -> Self {
        self.options.type_scope = type_scope;
        self
    }

    /// Parse and infer, stopping before rendering
    pub fn infer(&self, xml: &str) -> Result<Schema> {
        self.options.limits.check_xml_size(xml.len())?;
        debug!(bytes = xml.len(), scope = ?self.options.type_scope, "inferring schema");

        let root = parse_with_limits(xml, &self.options.limits)?;
        build_schema_with_options(&root, &self.options)
    }
}

impl Converter for XsdConverter {
    fn convert(&self, input: &str) -> Result<String> {
        self.infer(input)?.to_xsd()
    }

    fn name(&self) -> &'static str {
        "xml-to-xsd"
    }
}

/// Convert an XML document to an XSD document with default options
pub fn convert_xml_to_xsd(xml: &str) -> Result<String> {
    XsdConverter::new().convert(xml)
}
