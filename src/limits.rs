//! Limits and constraints for schema inference
//!
//! This module defines limits that bound the work a single conversion may do,
//! so that oversized or pathologically nested input fails fast instead of
//! exhausting memory.

use crate::error::{Error, Result};

/// Resource limits applied to one conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Maximum element nesting depth
    pub max_xml_depth: usize,

    /// Maximum XML input size in bytes
    pub max_xml_size: usize,

    /// Maximum number of attributes per element
    pub max_attributes: usize,

    /// Maximum number of namespace declarations per element
    pub max_namespaces: usize,

    /// Maximum number of distinct schema types
    pub max_schema_components: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_xml_depth: 1000,
            max_xml_size: 5 * 1024 * 1024, // 5 MB
            max_attributes: 1000,
            max_namespaces: 1000,
            max_schema_components: 100000,
        }
    }
}

impl Limits {
    /// Create a new Limits with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create strict limits (more restrictive)
    pub fn strict() -> Self {
        Self {
            max_xml_depth: 100,
            max_xml_size: 1024 * 1024, // 1 MB
            max_attributes: 100,
            max_namespaces: 100,
            max_schema_components: 10000,
        }
    }

    /// Create permissive limits (less restrictive, use with caution)
    pub fn permissive() -> Self {
        Self {
            max_xml_depth: 100000,
            max_xml_size: 1024 * 1024 * 1024, // 1 GB
            max_attributes: 10000,
            max_namespaces: 10000,
            max_schema_components: 1000000,
        }
    }

    /// Check if XML depth is within limits
    pub fn check_xml_depth(&self, depth: usize) -> Result<()> {
        if depth > self.max_xml_depth {
            Err(Error::LimitExceeded(format!(
                "XML depth {} exceeds maximum {}",
                depth, self.max_xml_depth
            )))
        } else {
            Ok(())
        }
    }

    /// Check if XML size is within limits
    pub fn check_xml_size(&self, size: usize) -> Result<()> {
        if size > self.max_xml_size {
            Err(Error::LimitExceeded(format!(
                "XML size {} bytes exceeds maximum {} bytes",
                size, self.max_xml_size
            )))
        } else {
            Ok(())
        }
    }

    /// Check if number of attributes is within limits
    pub fn check_attributes(&self, count: usize) -> Result<()> {
        if count > self.max_attributes {
            Err(Error::LimitExceeded(format!(
                "Attribute count {} exceeds maximum {}",
                count, self.max_attributes
            )))
        } else {
            Ok(())
        }
    }

    /// Check if number of namespace declarations is within limits
    pub fn check_namespaces(&self, count: usize) -> Result<()> {
        if count > self.max_namespaces {
            Err(Error::LimitExceeded(format!(
                "Namespace count {} exceeds maximum {}",
                count, self.max_namespaces
            )))
        } else {
            Ok(())
        }
    }

    /// Check if number of schema types is within limits
    pub fn check_schema_components(&self, count: usize) -> Result<()> {
        if count > self.max_schema_components {
            Err(Error::LimitExceeded(format!(
                "Schema type count {} exceeds maximum {}",
                count, self.max_schema_components
            )))
        } else {
            Ok(())
        }
    }
}
