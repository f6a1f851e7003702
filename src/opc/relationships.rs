//! Relationship parts (`_rels/*.rels`)

use std::fmt::Write as _;

use quick_xml::Reader;
use quick_xml::escape::{escape, unescape};
use quick_xml::events::Event;

use super::validation::{parent_dir, resolve_target};
use crate::error::{Error, Result};

/// 3D model relationship type
pub const MODEL_REL_TYPE: &str = "http://schemas.microsoft.com/3dmanufacturing/2013/01/3dmodel";

/// Thumbnail relationship type (OPC standard)
pub const THUMBNAIL_REL_TYPE: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships/metadata/thumbnail";

const RELATIONSHIPS_NAMESPACE: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

/// One `<Relationship>` entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// Relationship id, unique within its part
    pub id: String,
    /// Target as written in the relationship part
    pub target: String,
    /// Relationship type URI
    pub rel_type: String,
}

impl Relationship {
    /// Absolute part name of the target, resolved against the source part
    pub fn resolved_target(&self, source: &str) -> String {
        resolve_target(parent_dir(source), &self.target)
    }
}

/// Name of the relationship part describing `source`
///
/// The package itself is the source `/`.
pub fn rels_part_name(source: &str) -> String {
    if source == "/" {
        return "/_rels/.rels".to_string();
    }
    let dir = parent_dir(source);
    let file = &source[dir.len()..];
    format!("{}_rels/{}.rels", dir, file)
}

/// Parse the content of a relationship part
pub(crate) fn parse_relationships(content: &str) -> Result<Vec<Relationship>> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut relationships = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Empty(ref e) | Event::Start(ref e) if e.local_name().as_ref() == b"Relationship" => {
                let mut id = String::new();
                let mut target = None;
                let mut rel_type = String::new();
                for attr in e.attributes() {
                    let attr = attr?;
                    let value = std::str::from_utf8(&attr.value)?;
                    let value = unescape(value)
                        .map_err(|e| Error::InvalidXml(e.to_string()))?
                        .into_owned();
                    match attr.key.as_ref() {
                        b"Id" => id = value,
                        b"Target" => target = Some(value),
                        b"Type" => rel_type = value,
                        _ => {}
                    }
                }
                match target {
                    Some(target) => relationships.push(Relationship { id, target, rel_type }),
                    None => {
                        return Err(Error::invalid_format_context(
                            "OPC relationships",
                            &format!("relationship '{}' has no Target", id),
                        ));
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(relationships)
}

/// Serialize a relationship part
pub(crate) fn relationships_xml(relationships: &[Relationship]) -> String {
    let mut xml = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<Relationships xmlns=\"{}\">\n",
        RELATIONSHIPS_NAMESPACE
    );
    for rel in relationships {
        let _ = writeln!(
            xml,
            "  <Relationship Target=\"{}\" Id=\"{}\" Type=\"{}\"/>",
            escape(rel.target.as_str()),
            escape(rel.id.as_str()),
            escape(rel.rel_type.as_str())
        );
    }
    xml.push_str("</Relationships>");
    xml
}
