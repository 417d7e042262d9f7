//! Schema inference from an element tree
//!
//! The builder walks the tree once with an explicit work stack, so document
//! depth never turns into native recursion. Every occurrence of an element
//! is merged into the single type registered for its key:
//!
//! - attributes are the union of all observed attributes; an attribute seen
//!   with different inferred types becomes `xs:string`
//! - children are the union of all observed child names, in first-seen order
//! - a child repeats (`maxOccurs="unbounded"`) if any one parent occurrence
//!   holds more than one of it
//!
//! Types are keyed by local tag name ([`TypeScope::Global`]) or by parent and tag
//! name ([`TypeScope::Parent`]). With global keying two differently shaped
//! elements that share a tag name under different parents end up as one
//! merged type.

use crate::documents::Element;
use crate::error::Result;
use crate::inference::{infer_primitive, PrimitiveType};
use crate::limits::Limits;
use crate::model::{ChildRef, MaxOccurs, Schema, SchemaType, TypeId, TypeKind};
use crate::names::{local_name, scoped_type_name_for, type_name_for, TypeNamer};
use indexmap::IndexMap;
use std::collections::HashMap;
use tracing::{debug, trace};

/// How type definitions are keyed and named
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeScope {
    /// One type per tag name, named `<tag>Type`
    #[default]
    Global,
    /// One type per (parent tag, tag) pair, named `<parent><Tag>Type`
    Parent,
}

impl std::str::FromStr for TypeScope {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "global" => Ok(TypeScope::Global),
            "parent" => Ok(TypeScope::Parent),
            other => Err(format!("unknown type scope '{}', use: global, parent", other)),
        }
    }
}

/// Options for one inference run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InferenceOptions {
    /// Resource limits
    pub limits: Limits,
    /// Type keying and naming
    pub type_scope: TypeScope,
}

impl InferenceOptions {
    /// Create options with default limits and global type names
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Set the type scope
    pub fn with_type_scope(mut self, type_scope: TypeScope) -> Self {
        self.type_scope = type_scope;
        self
    }
}

/// Build a schema with default options
pub fn build_schema(root: &Element) -> Result<Schema> {
    SchemaBuilder::new(InferenceOptions::default()).build(root)
}

/// Build a schema with the given options
pub fn build_schema_with_options(root: &Element, options: &InferenceOptions) -> Result<Schema> {
    SchemaBuilder::new(options.clone()).build(root)
}

type TypeKey = (Option<String>, String);

#[derive(Debug)]
struct ChildSlot {
    type_id: TypeId,
    repeated: bool,
}

/// Everything observed so far about one type key
#[derive(Debug)]
struct TypeAccumulator {
    tag: String,
    type_name: String,
    attributes: IndexMap<String, PrimitiveType>,
    children: IndexMap<String, ChildSlot>,
    text_type: Option<PrimitiveType>,
    saw_text: bool,
    occurrences: usize,
}

impl TypeAccumulator {
    fn new(tag: &str, type_name: String) -> Self {
        Self {
            tag: tag.to_string(),
            type_name,
            attributes: IndexMap::new(),
            children: IndexMap::new(),
            text_type: None,
            saw_text: false,
            occurrences: 0,
        }
    }

    fn finish(self) -> SchemaType {
        let kind = if self.attributes.is_empty() && self.children.is_empty() {
            TypeKind::Simple
        } else {
            TypeKind::Complex
        };

        let primitive_type = match kind {
            TypeKind::Simple => Some(self.text_type.unwrap_or(PrimitiveType::String)),
            TypeKind::Complex if self.children.is_empty() && self.saw_text => self.text_type,
            TypeKind::Complex => None,
        };

        let is_mixed = kind == TypeKind::Complex && self.saw_text && !self.children.is_empty();

        let children = self
            .children
            .into_iter()
            .map(|(name, slot)| {
                let max_occurs = if slot.repeated {
                    MaxOccurs::Unbounded
                } else {
                    MaxOccurs::Bounded(1)
                };
                (
                    name,
                    ChildRef {
                        type_id: slot.type_id,
                        min_occurs: 0,
                        max_occurs,
                    },
                )
            })
            .collect();

        SchemaType {
            name: self.tag,
            type_name: self.type_name,
            kind,
            primitive_type,
            attributes: self.attributes,
            children,
            is_mixed,
        }
    }
}

/// Infers a [`Schema`] from one element tree
///
/// The memo table lives in the builder, so each build is independent.
#[derive(Debug)]
pub struct SchemaBuilder {
    options: InferenceOptions,
    memo: HashMap<TypeKey, TypeId>,
    namer: TypeNamer,
    types: Vec<TypeAccumulator>,
}

impl SchemaBuilder {
    /// Create a builder
    pub fn new(options: InferenceOptions) -> Self {
        Self {
            options,
            memo: HashMap::new(),
            namer: TypeNamer::new(),
            types: Vec::new(),
        }
    }

    /// Walk the tree and produce the schema
    pub fn build(mut self, root: &Element) -> Result<Schema> {
        let root_id = self.type_for(None, local_name(&root.name))?;

        let mut work: Vec<(&Element, TypeId)> = vec![(root, root_id)];
        while let Some((element, id)) = work.pop() {
            let child_ids = self.record(element, id)?;
            for child in element.children.iter().rev() {
                work.push((child, child_ids[local_name(&child.name)]));
            }
        }

        let types: Vec<SchemaType> = self.types.into_iter().map(TypeAccumulator::finish).collect();
        let schema = Schema {
            root_name: root.name.clone(),
            target_namespace: root.namespace().map(str::to_string),
            root: root_id,
            types,
        };

        debug!(
            root = %schema.root_name,
            types = schema.len(),
            complex_types = schema.complex_types().count(),
            "built schema"
        );
        Ok(schema)
    }

    /// Merge one occurrence into its type; returns the type of each child name
    fn record<'e>(&mut self, element: &'e Element, id: TypeId) -> Result<HashMap<&'e str, TypeId>> {
        let mut counts: IndexMap<&str, usize> = IndexMap::new();
        for child in &element.children {
            *counts.entry(local_name(&child.name)).or_insert(0) += 1;
        }

        let mut child_ids = HashMap::with_capacity(counts.len());
        for (&name, &count) in &counts {
            let child_id = self.type_for(Some(local_name(&element.name)), name)?;
            child_ids.insert(name, child_id);

            let slot = self.types[id.0]
                .children
                .entry(name.to_string())
                .or_insert(ChildSlot {
                    type_id: child_id,
                    repeated: false,
                });
            slot.repeated |= count > 1;
        }

        let acc = &mut self.types[id.0];
        acc.occurrences += 1;

        for (name, value) in &element.attributes {
            let observed = infer_primitive(value);
            acc.attributes
                .entry(local_name(name).to_string())
                .and_modify(|t| *t = t.unify(observed))
                .or_insert(observed);
        }

        let observed = infer_primitive(element.text.as_deref().unwrap_or(""));
        acc.text_type = Some(match acc.text_type {
            Some(t) => t.unify(observed),
            None => observed,
        });
        acc.saw_text |= element.has_text();

        trace!(
            element = %element.name,
            type_name = %acc.type_name,
            occurrence = acc.occurrences,
            "merged occurrence"
        );
        Ok(child_ids)
    }

    /// Memoized type lookup; registers a new type on first reference
    fn type_for(&mut self, parent: Option<&str>, tag: &str) -> Result<TypeId> {
        let key: TypeKey = match self.options.type_scope {
            TypeScope::Global => (None, tag.to_string()),
            TypeScope::Parent => (parent.map(str::to_string), tag.to_string()),
        };
        if let Some(&id) = self.memo.get(&key) {
            return Ok(id);
        }

        let base = match key.0 {
            Some(ref parent) => scoped_type_name_for(parent, tag),
            None => type_name_for(tag),
        };
        let id = TypeId(self.types.len());
        self.options.limits.check_schema_components(id.0 + 1)?;

        let type_name = self.namer.assign(&base);
        self.types.push(TypeAccumulator::new(tag, type_name));
        self.memo.insert(key, id);
        Ok(id)
    }
}
