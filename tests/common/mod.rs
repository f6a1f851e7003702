//! Shared fixtures for the integration tests
//!
//! Not every test binary uses every helper.
#![allow(dead_code)]

use std::io::{Cursor, Write};

use threemf::geometry::Point3D;
use threemf::model::{Item, Mesh, MeshBuilder, Model, Object};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

pub const CORE_NS: &str = "http://schemas.microsoft.com/3dmanufacturing/core/2015/02";

pub const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="model" ContentType="application/vnd.ms-package.3dmanufacturing-3dmodel+xml"/>
</Types>"#;

pub const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Target="/3D/3dmodel.model" Id="rel0" Type="http://schemas.microsoft.com/3dmanufacturing/2013/01/3dmodel"/>
</Relationships>"#;

/// The classic 10 mm cube: 8 vertices, 12 outward-facing triangles
pub fn cube_mesh() -> Mesh {
    let mut builder = MeshBuilder::new();
    for (x, y, z) in [
        (0.0, 0.0, 0.0),
        (10.0, 0.0, 0.0),
        (10.0, 10.0, 0.0),
        (0.0, 10.0, 0.0),
        (0.0, 0.0, 10.0),
        (10.0, 0.0, 10.0),
        (10.0, 10.0, 10.0),
        (0.0, 10.0, 10.0),
    ] {
        builder.add_vertex(Point3D::new(x, y, z));
    }
    for [a, b, c] in [
        [3, 2, 1],
        [1, 0, 3],
        [4, 5, 6],
        [6, 7, 4],
        [0, 1, 5],
        [5, 4, 0],
        [1, 2, 6],
        [6, 5, 1],
        [2, 3, 7],
        [7, 6, 2],
        [3, 0, 4],
        [4, 7, 3],
    ] {
        builder.add_triangle(a, b, c);
    }
    builder.finish()
}

/// A root model holding one cube object and one build item for it
pub fn cube_model() -> Model {
    let mut model = Model::new();
    model.resources.objects.push(Object::with_mesh(1, cube_mesh()));
    model.build.items.push(Item::new(1));
    model
}

/// Wrap a `<resources>` and `<build>` body into a root model document
pub fn model_xml(namespaces: &str, body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<model xmlns="{}" {}>{}</model>"#,
        CORE_NS, namespaces, body
    )
}

/// Build a ZIP archive from `(entry name, content)` pairs
pub fn zip_entries(entries: &[(&str, &str)]) -> Cursor<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    for (name, content) in entries {
        zip.start_file(*name, options).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    let mut cursor = zip.finish().unwrap();
    cursor.set_position(0);
    cursor
}

/// A minimal package holding `root_xml` as its only model part
pub fn package_with_root(root_xml: &str) -> Cursor<Vec<u8>> {
    zip_entries(&[
        ("[Content_Types].xml", CONTENT_TYPES),
        ("_rels/.rels", ROOT_RELS),
        ("3D/3dmodel.model", root_xml),
    ])
}

/// Encode `model` as a package into memory
pub fn package_bytes(model: &Model) -> Cursor<Vec<u8>> {
    let mut cursor = model.to_writer(Cursor::new(Vec::new())).unwrap();
    cursor.set_position(0);
    cursor
}
