//! XSD serialization
//!
//! Writes a [`Schema`] as an XSD document. Indentation comes from the element
//! nesting (two spaces per level) via quick-xml's indenting writer, never from
//! re-reading the produced text.

use crate::error::Result;
use crate::inference::PrimitiveType;
use crate::model::{ContentModel, Schema, SchemaType};
use crate::names::local_name;
use crate::namespaces::{TNS_PREFIX, XSD_NAMESPACE};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use tracing::debug;

/// Render a schema as XSD text
///
/// `root_name` is the element declared at the top level; complex type
/// references are `tns:`-qualified when `target_namespace` is given.
pub fn render_xsd(schema: &Schema, root_name: &str, target_namespace: Option<&str>) -> Result<String> {
    let mut xsd = XsdWriter::new(schema, target_namespace);
    xsd.write(root_name)?;
    let text = xsd.finish()?;
    debug!(bytes = text.len(), "rendered XSD");
    Ok(text)
}

struct XsdWriter<'s> {
    schema: &'s Schema,
    target_namespace: Option<&'s str>,
    writer: Writer<Vec<u8>>,
}

impl<'s> XsdWriter<'s> {
    fn new(schema: &'s Schema, target_namespace: Option<&'s str>) -> Self {
        Self {
            schema,
            target_namespace,
            writer: Writer::new_with_indent(Vec::new(), b' ', 2),
        }
    }

    fn write(&mut self, root_name: &str) -> Result<()> {
        self.writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        let mut schema_tag = BytesStart::new("xs:schema");
        schema_tag.push_attribute(("xmlns:xs", XSD_NAMESPACE));
        if let Some(ns) = self.target_namespace {
            schema_tag.push_attribute(("targetNamespace", ns));
            schema_tag.push_attribute(("xmlns:tns", ns));
            schema_tag.push_attribute(("elementFormDefault", "qualified"));
        }
        self.writer.write_event(Event::Start(schema_tag))?;

        let root_type = self.type_ref(self.schema.root_type());
        let mut root = BytesStart::new("xs:element");
        root.push_attribute(("name", local_name(root_name)));
        root.push_attribute(("type", root_type.as_str()));
        self.writer.write_event(Event::Empty(root))?;

        let schema = self.schema;
        for schema_type in schema.complex_types() {
            self.write_complex_type(schema_type)?;
        }

        self.writer.write_event(Event::End(BytesEnd::new("xs:schema")))?;
        Ok(())
    }

    fn write_complex_type(&mut self, schema_type: &SchemaType) -> Result<()> {
        let mut tag = BytesStart::new("xs:complexType");
        tag.push_attribute(("name", schema_type.type_name.as_str()));
        if schema_type.is_mixed {
            tag.push_attribute(("mixed", "true"));
        }
        self.writer.write_event(Event::Start(tag))?;

        match schema_type.content_model() {
            Some(ContentModel::SimpleContent(base)) => {
                self.start("xs:simpleContent")?;
                let mut extension = BytesStart::new("xs:extension");
                extension.push_attribute(("base", base.to_string().as_str()));
                self.writer.write_event(Event::Start(extension))?;
                self.write_attributes(schema_type)?;
                self.end("xs:extension")?;
                self.end("xs:simpleContent")?;
            }
            Some(ContentModel::ElementOnly) | Some(ContentModel::Mixed) => {
                self.write_sequence(schema_type)?;
                self.write_attributes(schema_type)?;
            }
            Some(ContentModel::Empty) | None => self.write_attributes(schema_type)?,
        }

        self.end("xs:complexType")
    }

    fn write_sequence(&mut self, schema_type: &SchemaType) -> Result<()> {
        self.start("xs:sequence")?;
        for (name, child) in &schema_type.children {
            let type_ref = self.type_ref(self.schema.get(child.type_id));
            let min_occurs = child.min_occurs.to_string();
            let max_occurs = child.max_occurs.to_string();

            let mut element = BytesStart::new("xs:element");
            element.push_attribute(("name", local_name(name)));
            element.push_attribute(("type", type_ref.as_str()));
            element.push_attribute(("minOccurs", min_occurs.as_str()));
            element.push_attribute(("maxOccurs", max_occurs.as_str()));
            self.writer.write_event(Event::Empty(element))?;
        }
        self.end("xs:sequence")
    }

    fn write_attributes(&mut self, schema_type: &SchemaType) -> Result<()> {
        for (name, primitive) in &schema_type.attributes {
            let type_ref = primitive.to_string();
            let mut attribute = BytesStart::new("xs:attribute");
            attribute.push_attribute(("name", name.as_str()));
            attribute.push_attribute(("type", type_ref.as_str()));
            attribute.push_attribute(("use", "optional"));
            self.writer.write_event(Event::Empty(attribute))?;
        }
        Ok(())
    }

    /// `xs:<primitive>` for simple types, the (qualified) type name otherwise
    fn type_ref(&self, schema_type: &SchemaType) -> String {
        if schema_type.is_simple() {
            return schema_type
                .primitive_type
                .unwrap_or(PrimitiveType::String)
                .to_string();
        }
        match self.target_namespace {
            Some(_) => format!("{}:{}", TNS_PREFIX, schema_type.type_name),
            None => schema_type.type_name.clone(),
        }
    }

    fn start(&mut self, name: &str) -> Result<()> {
        self.writer.write_event(Event::Start(BytesStart::new(name)))?;
        Ok(())
    }

    fn end(&mut self, name: &str) -> Result<()> {
        self.writer.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    fn finish(self) -> Result<String> {
        let mut text = String::from_utf8(self.writer.into_inner())
            .map_err(|e| crate::error::Error::Xml(e.to_string()))?;
        text.push('\n');
        Ok(text)
    }
}
