//! Package reading: archive access and model part discovery

use std::collections::BTreeSet;
use std::io::{BufReader, Read, Seek};

use tracing::{debug, warn};
use zip::ZipArchive;

use super::content_types::{ContentTypes, MODEL_CONTENT_TYPE};
use super::relationships::{MODEL_REL_TYPE, Relationship, parse_relationships, rels_part_name};
use super::validation::{entry_name, validate_part_name};
use super::{CONTENT_TYPES_PATH, RELS_PATH};
use crate::diagnostic::{Diagnostic, DiagnosticKind, DiagnosticPath};
use crate::error::{Error, Result};
use crate::model::{ChildModel, Model, ParserConfig};
use crate::parser::{ParseOutcome, decode_part_collecting, finish_decode};

/// An open OPC package (3MF file)
pub struct Package<R: Read> {
    archive: ZipArchive<R>,
    content_types: ContentTypes,
    diagnostics: Vec<Diagnostic>,
}

impl<R: Read + Seek> Package<R> {
    /// Open a package and read its content types
    ///
    /// Fails if `[Content_Types].xml` or `_rels/.rels` is missing.
    pub fn open(reader: R) -> Result<Self> {
        let archive = ZipArchive::new(reader)?;
        let mut package = Self {
            archive,
            content_types: ContentTypes::default(),
            diagnostics: Vec::new(),
        };

        for required in [CONTENT_TYPES_PATH, RELS_PATH] {
            if !package.has_part(required) {
                return Err(Error::invalid_format_context(
                    "OPC package structure",
                    &format!("missing required part '{}'", required),
                ));
            }
        }
        let content = package.read_part_string(CONTENT_TYPES_PATH)?;
        package.content_types = ContentTypes::parse(&content)?;
        Ok(package)
    }

    /// Part name of the root model, from the package relationships
    ///
    /// The first relationship of the 3D model type wins.
    pub fn root_model_path(&mut self) -> Result<String> {
        let relationships = self.relationships("/")?;
        let root = relationships
            .iter()
            .find(|rel| rel.rel_type == MODEL_REL_TYPE)
            .map(|rel| rel.resolved_target("/"))
            .ok_or_else(|| Error::MissingFile("3D model relationship".to_string()))?;
        if let Err(kind) = validate_part_name(&root) {
            self.report(RELS_PATH, kind);
        }
        if !self.has_part(&root) {
            return Err(Error::MissingFile(root));
        }
        self.check_model_part(&root, RELS_PATH);
        Ok(root)
    }

    /// Part names of the child models referenced by the root model part
    ///
    /// Targets that break the part name rules or that are missing from the
    /// archive are reported as diagnostics and skipped.
    pub fn child_model_paths(&mut self, root: &str) -> Result<Vec<String>> {
        let rels_part = rels_part_name(root);
        if !self.has_part(&rels_part) {
            return Ok(Vec::new());
        }
        let mut seen = BTreeSet::new();
        let mut children = Vec::new();
        for rel in self.relationships(root)? {
            if rel.rel_type != MODEL_REL_TYPE {
                continue;
            }
            let target = rel.resolved_target(root);
            if target == root || !seen.insert(target.clone()) {
                continue;
            }
            if let Err(kind) = validate_part_name(&target) {
                self.report(&rels_part, kind);
                continue;
            }
            if !self.has_part(&target) {
                self.report(&rels_part, DiagnosticKind::OpcRelTarget { target });
                continue;
            }
            self.check_model_part(&target, &rels_part);
            children.push(target);
        }
        Ok(children)
    }

    /// Relationships whose source is `source` (`/` for the package)
    pub fn relationships(&mut self, source: &str) -> Result<Vec<Relationship>> {
        let content = self.read_part_string(&rels_part_name(source))?;
        parse_relationships(&content)
    }

    /// Content type of a part
    pub fn content_type(&self, part_name: &str) -> Option<&str> {
        self.content_types.content_type(part_name)
    }

    /// OPC findings recorded so far
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Check if a part exists; leading slashes and percent escapes are ignored
    pub fn has_part(&self, part_name: &str) -> bool {
        self.entry_for(part_name).is_some()
    }

    /// Read a part as bytes
    pub fn read_part(&mut self, part_name: &str) -> Result<Vec<u8>> {
        let entry = self
            .entry_for(part_name)
            .ok_or_else(|| Error::MissingFile(part_name.to_string()))?;
        let mut file = self.archive.by_name(&entry)?;
        let mut content = Vec::new();
        file.read_to_end(&mut content)?;
        Ok(content)
    }

    /// Read a part as UTF-8 text
    pub fn read_part_string(&mut self, part_name: &str) -> Result<String> {
        let bytes = self.read_part(part_name)?;
        String::from_utf8(bytes).map_err(|e| Error::InvalidXml(format!("{}: {}", part_name, e)))
    }

    /// Decode one model part
    pub(crate) fn decode_model_part(
        &mut self,
        part_name: &str,
        config: &ParserConfig,
    ) -> Result<(Model, Vec<Diagnostic>)> {
        let entry = self
            .entry_for(part_name)
            .ok_or_else(|| Error::MissingFile(part_name.to_string()))?;
        let file = self.archive.by_name(&entry)?;
        decode_part_collecting(BufReader::new(file), part_name, config)
    }

    /// Number of entries in the archive
    pub fn len(&self) -> usize {
        self.archive.len()
    }

    /// Check if the archive is empty
    pub fn is_empty(&self) -> bool {
        self.archive.is_empty()
    }

    /// Zip entry names in archive order
    pub fn entry_names(&self) -> Vec<String> {
        self.archive.file_names().map(str::to_string).collect()
    }

    fn entry_for(&self, part_name: &str) -> Option<String> {
        let plain = entry_name(part_name);
        if self.archive.index_for_name(plain).is_some() {
            return Some(plain.to_string());
        }
        let decoded = urlencoding::decode(plain).ok()?;
        self.archive
            .index_for_name(&decoded)
            .map(|_| decoded.into_owned())
    }

    fn check_model_part(&mut self, part_name: &str, rels_part: &str) {
        if self.content_type(part_name) != Some(MODEL_CONTENT_TYPE) {
            self.report(
                rels_part,
                DiagnosticKind::OpcContentType {
                    part: part_name.to_string(),
                },
            );
        }
    }

    fn report(&mut self, part: &str, kind: DiagnosticKind) {
        let path = DiagnosticPath::new(part);
        warn!(part, "{}", kind);
        self.diagnostics.push(Diagnostic::new(&path, kind));
    }
}

/// Decode a whole package: the root model part and every child model part
///
/// Diagnostics of all parts and of the package structure are collected
/// before strict mode is applied.
pub(crate) fn read_package<R: Read + Seek>(reader: R, config: &ParserConfig) -> Result<ParseOutcome> {
    let mut package = Package::open(reader)?;
    let root = package.root_model_path()?;
    let (mut model, mut diagnostics) = package.decode_model_part(&root, config)?;

    for child_path in package.child_model_paths(&root)? {
        let (child, child_diagnostics) = package.decode_model_part(&child_path, config)?;
        diagnostics.extend(child_diagnostics);
        model.children.insert(
            child_path,
            ChildModel {
                resources: child.resources,
                any_attr: child.any_attr,
                any: child.any,
            },
        );
    }
    diagnostics.extend(package.diagnostics().iter().cloned());

    debug!(
        root = root.as_str(),
        children = model.children.len(),
        diagnostics = diagnostics.len(),
        "decoded package"
    );
    finish_decode(model, diagnostics, &root, config)
}
