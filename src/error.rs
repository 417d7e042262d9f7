//! Error types for xml2xsd
//!
//! Every conversion call either returns a complete XSD document or one of
//! these errors; there are no partial results.

use std::fmt;
use thiserror::Error;

/// Result type alias using the xml2xsd Error
pub type Result<T> = std::result::Result<T, Error>;

/// Error returned by the `convert` contract
pub type ConversionError = Error;

/// Main error type for xml2xsd operations
#[derive(Error, Debug)]
pub enum Error {
    /// The input is not a well-formed, single-rooted XML document
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// A structure the inference engine chooses not to model
    #[error("unsupported structure: {0}")]
    UnsupportedStructure(String),

    /// Limit exceeded error
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    /// XML writing error, or a generated schema that cannot be re-read
    #[error("XML error: {0}")]
    Xml(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Xml(err.to_string())
    }
}

/// Malformed XML input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// Error message
    pub message: String,
    /// Location in the input, as `line:column`
    pub location: Option<String>,
}

impl ParseError {
    /// Create a new parse error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            location: None,
        }
    }

    /// Set the location
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(ref loc) = self.location {
            write!(f, " (at {})", loc)?;
        }

        Ok(())
    }
}

impl std::error::Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = ParseError::new("mismatched end tag").with_location("3:7");

        let msg = format!("{}", err);
        assert!(msg.contains("mismatched end tag"));
        assert!(msg.contains("3:7"));
    }

    #[test]
    fn test_parse_error_without_location() {
        let err = ParseError::new("no root element");
        assert_eq!(err.to_string(), "no root element");
    }

    #[test]
    fn test_error_conversion() {
        let err: Error = ParseError::new("test").into();
        assert!(matches!(err, Error::Parse(_)));
        assert!(err.to_string().starts_with("parse error: "));
    }
}
