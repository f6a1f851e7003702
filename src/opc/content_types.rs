//! `[Content_Types].xml` parsing and writing

use std::fmt::Write as _;

use quick_xml::Reader;
use quick_xml::escape::escape;
use quick_xml::events::Event;

use crate::error::Result;

/// Content type of 3D model parts
pub const MODEL_CONTENT_TYPE: &str = "application/vnd.ms-package.3dmanufacturing-3dmodel+xml";

/// Content type of relationship parts
pub const RELATIONSHIPS_CONTENT_TYPE: &str = "application/vnd.openxmlformats-package.relationships+xml";

const CONTENT_TYPES_NAMESPACE: &str = "http://schemas.openxmlformats.org/package/2006/content-types";

/// Default (by extension) and override (by part name) content types
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentTypes {
    defaults: Vec<(String, String)>,
    overrides: Vec<(String, String)>,
}

impl ContentTypes {
    /// Content types of a package holding only model and relationship parts
    pub fn for_models() -> Self {
        Self {
            defaults: vec![
                ("rels".to_string(), RELATIONSHIPS_CONTENT_TYPE.to_string()),
                ("model".to_string(), MODEL_CONTENT_TYPE.to_string()),
            ],
            overrides: Vec::new(),
        }
    }

    /// Add a default mapping unless the extension already has one
    pub fn add_default(&mut self, extension: &str, content_type: &str) {
        if !self.defaults.iter().any(|(ext, _)| ext.eq_ignore_ascii_case(extension)) {
            self.defaults.push((extension.to_string(), content_type.to_string()));
        }
    }

    /// Add an override for one part
    pub fn add_override(&mut self, part_name: &str, content_type: &str) {
        self.overrides.push((part_name.to_string(), content_type.to_string()));
    }

    /// Content type of a part: its override, else the default of its extension
    ///
    /// Part names and extensions compare ASCII case-insensitively.
    pub fn content_type(&self, part_name: &str) -> Option<&str> {
        if let Some((_, ct)) = self
            .overrides
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(part_name))
        {
            return Some(ct);
        }
        let file = part_name.rsplit('/').next().unwrap_or(part_name);
        let extension = file.rsplit_once('.').map(|(_, ext)| ext)?;
        self.defaults
            .iter()
            .find(|(ext, _)| ext.eq_ignore_ascii_case(extension))
            .map(|(_, ct)| ct.as_str())
    }

    /// Parse `[Content_Types].xml`
    pub(crate) fn parse(content: &str) -> Result<Self> {
        let mut reader = Reader::from_str(content);
        reader.config_mut().trim_text(true);
        let mut buf = Vec::new();
        let mut types = ContentTypes::default();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Empty(ref e) | Event::Start(ref e) => {
                    let mut key = None;
                    let mut content_type = None;
                    for attr in e.attributes() {
                        let attr = attr?;
                        let value = std::str::from_utf8(&attr.value)?.to_string();
                        match attr.key.as_ref() {
                            b"Extension" | b"PartName" => key = Some(value),
                            b"ContentType" => content_type = Some(value),
                            _ => {}
                        }
                    }
                    if let (Some(key), Some(ct)) = (key, content_type) {
                        match e.local_name().as_ref() {
                            b"Default" => types.defaults.push((key, ct)),
                            b"Override" => types.overrides.push((key, ct)),
                            _ => {}
                        }
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }
        Ok(types)
    }

    /// Serialize as `[Content_Types].xml`
    pub(crate) fn to_xml(&self) -> String {
        let mut xml = format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<Types xmlns=\"{}\">\n",
            CONTENT_TYPES_NAMESPACE
        );
        for (extension, ct) in &self.defaults {
            let _ = writeln!(
                xml,
                "  <Default Extension=\"{}\" ContentType=\"{}\"/>",
                escape(extension.as_str()),
                escape(ct.as_str())
            );
        }
        for (part, ct) in &self.overrides {
            let _ = writeln!(
                xml,
                "  <Override PartName=\"{}\" ContentType=\"{}\"/>",
                escape(part.as_str()),
                escape(ct.as_str())
            );
        }
        xml.push_str("</Types>");
        xml
    }
}
