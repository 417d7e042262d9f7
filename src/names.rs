//! XML name checks and schema type naming
//!
//! Element names are checked while parsing; type names are derived from
//! element names (`person` -> `personType`) and kept unique per schema.

use std::collections::HashSet;

/// Suffix appended to element names to form complex type names
pub const TYPE_SUFFIX: &str = "Type";

fn is_name_start_char(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-' || c == '.' || c == '\u{B7}'
}

/// Check if a string is a valid NCName (non-colonized name)
pub fn is_valid_ncname(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if is_name_start_char(first) => chars.all(is_name_char),
        _ => false,
    }
}

/// Check if a string is a valid QName (qualified name)
pub fn is_valid_qname(name: &str) -> bool {
    match name.split_once(':') {
        Some((prefix, local)) => is_valid_ncname(prefix) && is_valid_ncname(local),
        None => is_valid_ncname(name),
    }
}

/// Split a QName into prefix and local name
pub fn split_qname(qname: &str) -> (Option<&str>, &str) {
    if let Some((prefix, local)) = qname.split_once(':') {
        (Some(prefix), local)
    } else {
        (None, qname)
    }
}

/// Local part of a possibly prefixed name
pub fn local_name(qname: &str) -> &str {
    split_qname(qname).1
}

/// Base type name for an element: `item` -> `itemType`
pub fn type_name_for(tag: &str) -> String {
    format!("{}{}", local_name(tag), TYPE_SUFFIX)
}

/// Base type name scoped by the parent element: (`order`, `address`) -> `orderAddressType`
pub fn scoped_type_name_for(parent: &str, tag: &str) -> String {
    let mut name = local_name(parent).to_string();
    let mut chars = local_name(tag).chars();
    if let Some(first) = chars.next() {
        name.extend(first.to_uppercase());
        name.push_str(chars.as_str());
    }
    name.push_str(TYPE_SUFFIX);
    name
}

/// Hands out type names that are unique within one schema
///
/// A clash (e.g. parent-scoped `aB`/`c` and `a`/`bC` both want `aBCType`) is
/// resolved by a numeric suffix: `aBCType`, `aBCType2`, `aBCType3`.
#[derive(Debug, Default)]
pub struct TypeNamer {
    used: HashSet<String>,
}

impl TypeNamer {
    /// Create an empty namer
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a unique name derived from `base`
    pub fn assign(&mut self, base: &str) -> String {
        if self.used.insert(base.to_string()) {
            return base.to_string();
        }
        let mut n = 2;
        loop {
            let candidate = format!("{}{}", base, n);
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}
