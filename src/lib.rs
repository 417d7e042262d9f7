//! # xml2xsd
//!
//! Infer an XML Schema (XSD) from a sample XML document.
//!
//! The pipeline is a pure function of its input text:
//!
//! 1. [`documents`] parses the XML into an element tree
//! 2. [`builder`] merges every occurrence of each element into one
//!    [`model::SchemaType`], inferring primitive types ([`inference`]),
//!    cardinalities and mixed content
//! 3. [`writer`] renders the model as an indented XSD document
//!
//! ## Example
//!
//! ```rust
//! use xml2xsd::convert_xml_to_xsd;
//!
//! let xsd = convert_xml_to_xsd("<cart><item>A</item><item>B</item></cart>")?;
//! assert!(xsd.contains(r#"maxOccurs="unbounded""#));
//! # Ok::<(), xml2xsd::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Foundation
pub mod error;
pub mod limits;

// Utilities
pub mod names;
pub mod namespaces;

// Inference pipeline
pub mod builder;
pub mod convert;
pub mod documents;
pub mod inference;
pub mod model;
pub mod writer;

// Surrounding helpers
pub mod formats;
pub mod validation;

// Re-exports for convenience
pub use builder::{build_schema, build_schema_with_options, InferenceOptions, SchemaBuilder, TypeScope};
pub use convert::{convert_xml_to_xsd, Converter, XsdConverter};
pub use documents::{parse as parse_xml, Element};
pub use error::{ConversionError, Error, ParseError, Result};
pub use formats::{detect_format, Format};
pub use inference::{infer_primitive, PrimitiveType};
pub use limits::Limits;
pub use model::{ChildRef, MaxOccurs, Schema, SchemaType, TypeId, TypeKind};
pub use validation::{check_instance, check_schema, ValidationReport};
pub use writer::render_xsd;

/// Version of the xml2xsd library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// XSD 1.0 namespace
pub const XSD_NAMESPACE: &str = namespaces::XSD_NAMESPACE;
