//! Package writing: model parts, content types and relationships

use std::io::{Seek, Write};

use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::content_types::{ContentTypes, MODEL_CONTENT_TYPE};
use super::relationships::{MODEL_REL_TYPE, Relationship, relationships_xml, rels_part_name};
use super::validation::entry_name;
use super::{CONTENT_TYPES_PATH, RELS_PATH};
use crate::error::{Error, Result};
use crate::model::{Model, WriterConfig};
use crate::writer::{write_child_xml, write_model_xml_with_config};

/// Write a complete 3MF package
///
/// The package holds:
/// - `[Content_Types].xml`
/// - `_rels/.rels` pointing at the root model part
/// - the root model part
/// - one part per child model, referenced from the root part's relationships
///
/// Returns the writer after finishing the ZIP archive.
pub fn write_package<W: Write + Seek>(model: &Model, writer: W, config: &WriterConfig) -> Result<W> {
    let root = model.root_path();
    let mut zip = ZipWriter::new(writer);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut content_types = ContentTypes::for_models();
    for part in std::iter::once(root).chain(model.children.keys().map(String::as_str)) {
        if content_types.content_type(part) != Some(MODEL_CONTENT_TYPE) {
            content_types.add_override(part, MODEL_CONTENT_TYPE);
        }
    }
    write_entry(&mut zip, CONTENT_TYPES_PATH, content_types.to_xml().as_bytes(), options)?;

    let package_rels = [Relationship {
        id: "rel0".to_string(),
        target: root.to_string(),
        rel_type: MODEL_REL_TYPE.to_string(),
    }];
    write_entry(&mut zip, RELS_PATH, relationships_xml(&package_rels).as_bytes(), options)?;

    let mut xml = Vec::new();
    write_model_xml_with_config(model, &mut xml, config)?;
    write_entry(&mut zip, root, &xml, options)?;

    if !model.children.is_empty() {
        let child_rels: Vec<Relationship> = model
            .children
            .keys()
            .enumerate()
            .map(|(i, path)| Relationship {
                id: format!("rel{}", i),
                target: path.clone(),
                rel_type: MODEL_REL_TYPE.to_string(),
            })
            .collect();
        write_entry(
            &mut zip,
            &rels_part_name(root),
            relationships_xml(&child_rels).as_bytes(),
            options,
        )?;
    }

    for path in model.children.keys() {
        xml.clear();
        write_child_xml(model, path, &mut xml, config)?;
        write_entry(&mut zip, path, &xml, options)?;
    }

    let writer = zip
        .finish()
        .map_err(|e| Error::xml_write(format!("Failed to finalize ZIP archive: {}", e)))?;
    debug!(root, children = model.children.len(), "wrote package");
    Ok(writer)
}

fn write_entry<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    part_name: &str,
    content: &[u8],
    options: SimpleFileOptions,
) -> Result<()> {
    zip.start_file(entry_name(part_name), options)
        .map_err(|e| Error::xml_write(format!("Failed to create part {}: {}", part_name, e)))?;
    zip.write_all(content)
        .map_err(|e| Error::xml_write(format!("Failed to write part {}: {}", part_name, e)))?;
    Ok(())
}
