//! Primitive type inference for scalar values
//!
//! Text content and attribute values are mapped to the narrowest XSD
//! built-in type that accepts them. Rules are tried in a fixed order and the
//! first match wins, so `"true"` is a boolean and `"2024-01-01"` a date.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;

static BOOLEAN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?i:true|false)$").unwrap());

// ASCII digits only; XSD lexical forms reject other Unicode digits.
static INTEGER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[+-]?[0-9]+$").unwrap());

static DECIMAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?([0-9]*\.[0-9]+|[0-9]+\.[0-9]*)$").unwrap());

static SCIENTIFIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?[0-9]*\.?[0-9]+[eE][+-]?[0-9]+$").unwrap());

static DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").unwrap());

static DATE_TIME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}T[0-9]{2}:[0-9]{2}:[0-9]{2}").unwrap());

static TIME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{2}:[0-9]{2}:[0-9]{2}").unwrap());

/// XSD built-in types the inferencer can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PrimitiveType {
    /// xs:string
    String,
    /// xs:integer
    Integer,
    /// xs:decimal
    Decimal,
    /// xs:double, for values in scientific notation
    Double,
    /// xs:boolean
    Boolean,
    /// xs:date
    Date,
    /// xs:dateTime
    DateTime,
    /// xs:time
    Time,
    /// xs:base64Binary; never inferred from text, available to callers
    Base64Binary,
}

impl PrimitiveType {
    /// All primitive types
    pub const ALL: [PrimitiveType; 9] = [
        PrimitiveType::String,
        PrimitiveType::Integer,
        PrimitiveType::Decimal,
        PrimitiveType::Double,
        PrimitiveType::Boolean,
        PrimitiveType::Date,
        PrimitiveType::DateTime,
        PrimitiveType::Time,
        PrimitiveType::Base64Binary,
    ];

    /// Local XSD name, e.g. `integer`
    pub fn xsd_name(self) -> &'static str {
        match self {
            PrimitiveType::String => "string",
            PrimitiveType::Integer => "integer",
            PrimitiveType::Decimal => "decimal",
            PrimitiveType::Double => "double",
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Date => "date",
            PrimitiveType::DateTime => "dateTime",
            PrimitiveType::Time => "time",
            PrimitiveType::Base64Binary => "base64Binary",
        }
    }

    /// Look up a type by its local XSD name
    pub fn from_xsd_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.xsd_name() == name)
    }

    /// Common type of two observations; any disagreement widens to string
    pub fn unify(self, other: PrimitiveType) -> PrimitiveType {
        if self == other {
            self
        } else {
            PrimitiveType::String
        }
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "xs:{}", self.xsd_name())
    }
}

/// Infer the primitive type of a scalar value
pub fn infer_primitive(value: &str) -> PrimitiveType {
    let value = value.trim();

    if value.is_empty() {
        PrimitiveType::String
    } else if BOOLEAN.is_match(value) {
        PrimitiveType::Boolean
    } else if INTEGER.is_match(value) {
        PrimitiveType::Integer
    } else if DECIMAL.is_match(value) {
        PrimitiveType::Decimal
    } else if SCIENTIFIC.is_match(value) {
        PrimitiveType::Double
    } else if DATE.is_match(value) {
        PrimitiveType::Date
    } else if DATE_TIME.is_match(value) {
        PrimitiveType::DateTime
    } else if TIME.is_match(value) {
        PrimitiveType::Time
    } else {
        PrimitiveType::String
    }
}
