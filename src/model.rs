//! Inferred schema model
//!
//! A [`Schema`] owns every inferred type in an arena; children refer to their
//! types by [`TypeId`], so a type referenced from many places exists once and
//! is written once.

use crate::error::Result;
use crate::inference::PrimitiveType;
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

/// Index of a type inside its [`Schema`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TypeId(pub(crate) usize);

/// Simple types are bare scalars; complex types have attributes or children
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TypeKind {
    /// No attributes and no child elements
    Simple,
    /// Attributes and/or child elements
    Complex,
}

/// Upper bound of a child's occurrences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MaxOccurs {
    /// At most this many
    Bounded(u32),
    /// Any number
    Unbounded,
}

impl fmt::Display for MaxOccurs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaxOccurs::Bounded(n) => write!(f, "{}", n),
            MaxOccurs::Unbounded => write!(f, "unbounded"),
        }
    }
}

/// A child element slot inside a complex type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildRef {
    /// Type of the child element
    #[serde(rename = "type")]
    pub type_id: TypeId,
    /// Minimum occurrences; always 0, since absence is never disproved
    pub min_occurs: u32,
    /// Maximum occurrences
    pub max_occurs: MaxOccurs,
}

/// How the content of a complex type is modelled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentModel {
    /// Attributes only
    Empty,
    /// Attributes around a text value (`xs:simpleContent`)
    SimpleContent(PrimitiveType),
    /// A sequence of child elements
    ElementOnly,
    /// A sequence of child elements interleaved with text
    Mixed,
}

/// One inferred type, shared by every occurrence of its element
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaType {
    /// Element tag name
    pub name: String,
    /// Name of the complex type definition (`<tag>Type`)
    pub type_name: String,
    /// Simple or complex
    pub kind: TypeKind,
    /// Type of the element's text; set for simple types and for complex
    /// types with attributes and text but no children
    pub primitive_type: Option<PrimitiveType>,
    /// Attributes in first-seen order
    pub attributes: IndexMap<String, PrimitiveType>,
    /// Child elements in first-seen order, keyed by tag name
    pub children: IndexMap<String, ChildRef>,
    /// Text and child elements both occur directly under the element
    pub is_mixed: bool,
}

impl SchemaType {
    /// True for complex types
    pub fn is_complex(&self) -> bool {
        self.kind == TypeKind::Complex
    }

    /// True for simple types
    pub fn is_simple(&self) -> bool {
        self.kind == TypeKind::Simple
    }

    /// Content model of a complex type, `None` for simple types
    pub fn content_model(&self) -> Option<ContentModel> {
        if self.is_simple() {
            return None;
        }
        Some(if !self.children.is_empty() {
            if self.is_mixed {
                ContentModel::Mixed
            } else {
                ContentModel::ElementOnly
            }
        } else {
            match self.primitive_type {
                Some(primitive) => ContentModel::SimpleContent(primitive),
                None => ContentModel::Empty,
            }
        })
    }
}

/// An inferred schema: the root element plus every type reachable from it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    /// Tag name of the document root
    pub root_name: String,
    /// Namespace of the document root, emitted as `targetNamespace`
    pub target_namespace: Option<String>,
    /// Type of the document root
    pub root: TypeId,
    /// All types, in first-seen document order
    pub(crate) types: Vec<SchemaType>,
}

/// Counts describing an inferred schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaSummary {
    /// Root element name
    pub root_element: String,
    /// Target namespace, if any
    pub target_namespace: Option<String>,
    /// Number of distinct element types
    pub element_types: usize,
    /// Number of complex type definitions
    pub complex_types: usize,
    /// Number of complex types with mixed content
    pub mixed_types: usize,
    /// Number of repeating child slots
    pub repeated_children: usize,
}

impl Schema {
    /// Look up a type by id
    pub fn get(&self, id: TypeId) -> &SchemaType {
        &self.types[id.0]
    }

    /// The root element's type
    pub fn root_type(&self) -> &SchemaType {
        self.get(self.root)
    }

    /// All types in first-seen order
    pub fn types(&self) -> impl Iterator<Item = (TypeId, &SchemaType)> {
        self.types.iter().enumerate().map(|(i, t)| (TypeId(i), t))
    }

    /// Complex types in first-seen order
    pub fn complex_types(&self) -> impl Iterator<Item = &SchemaType> {
        self.types.iter().filter(|t| t.is_complex())
    }

    /// Number of types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// True when the schema holds no types
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Find the type declared for an element tag
    ///
    /// With parent-scoped type names several types can share a tag; the
    /// first one seen is returned.
    pub fn find_by_element(&self, name: &str) -> Option<&SchemaType> {
        self.types.iter().find(|t| t.name == name)
    }

    /// Summary counts
    pub fn summary(&self) -> SchemaSummary {
        SchemaSummary {
            root_element: self.root_name.clone(),
            target_namespace: self.target_namespace.clone(),
            element_types: self.types.len(),
            complex_types: self.complex_types().count(),
            mixed_types: self.types.iter().filter(|t| t.is_mixed).count(),
            repeated_children: self
                .types
                .iter()
                .flat_map(|t| t.children.values())
                .filter(|c| c.max_occurs == MaxOccurs::Unbounded)
                .count(),
        }
    }

    /// Render the schema as XSD text
    pub fn to_xsd(&self) -> Result<String> {
        crate::writer::render_xsd(self, &self.root_name, self.target_namespace.as_deref())
    }

    /// Serialize the model as pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
