//! OPC (Open Packaging Conventions) handling for 3MF files
//!
//! 3MF files are ZIP archives following the OPC standard. The root model part
//! is found through the package relationships in `_rels/.rels`; child model
//! parts are the 3D model relationships of the root part. Structural problems
//! that do not prevent reading (bad part names, dangling relationship targets,
//! wrong content types) are reported as diagnostics.

mod content_types;
mod reader;
mod relationships;
mod validation;
mod writer;

pub use content_types::{ContentTypes, MODEL_CONTENT_TYPE, RELATIONSHIPS_CONTENT_TYPE};
pub use reader::Package;
pub use relationships::{MODEL_REL_TYPE, Relationship, THUMBNAIL_REL_TYPE, rels_part_name};
pub use writer::write_package;

pub(crate) use reader::read_package;

/// Content types part name
pub const CONTENT_TYPES_PATH: &str = "/[Content_Types].xml";

/// Package relationships part name
pub const RELS_PATH: &str = "/_rels/.rels";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::DiagnosticKind;
    use crate::error::Error;
    use crate::model::{ChildModel, Item, Model, Object, ParserConfig, WriterConfig};
    use std::io::{Cursor, Write};
    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    const TRIANGLE_MODEL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<model unit="millimeter" xml:lang="en-US" xmlns="http://schemas.microsoft.com/3dmanufacturing/core/2015/02">
  <resources>
    <object id="1" type="surface">
      <mesh>
        <vertices>
          <vertex x="0" y="0" z="0"/>
          <vertex x="100" y="0" z="0"/>
          <vertex x="0" y="100" z="0"/>
        </vertices>
        <triangles>
          <triangle v1="0" v2="1" v3="2"/>
        </triangles>
      </mesh>
    </object>
  </resources>
  <build>
    <item objectid="1"/>
  </build>
</model>"#;

    const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="model" ContentType="application/vnd.ms-package.3dmanufacturing-3dmodel+xml"/>
</Types>"#;

    fn package(entries: &[(&str, &str)]) -> Cursor<Vec<u8>> {
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

    fn root_rels(target: &str) -> String {
        format!(
            r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Target="{}" Id="rel0" Type="{}"/>
</Relationships>"#,
            target, MODEL_REL_TYPE
        )
    }

    #[test]
    fn test_empty_zip_is_rejected() {
        let result = Package::open(package(&[]));
        assert!(matches!(result, Err(Error::InvalidFormat(_))));
    }

    #[test]
    fn test_percent_encoded_part_names() {
        let rels = root_rels("/2D/test%C3%86file.model");
        let cursor = package(&[
            ("[Content_Types].xml", CONTENT_TYPES),
            ("_rels/.rels", rels.as_str()),
            ("2D/testÆfile.model", TRIANGLE_MODEL),
        ]);
        let outcome = read_package(cursor, &ParserConfig::new()).unwrap();
        assert_eq!(outcome.model.root_path(), "/2D/testÆfile.model");
        assert_eq!(outcome.model.resources.objects.len(), 1);
    }

    #[test]
    fn test_missing_model_relationship() {
        let rels = r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"/>"#;
        let cursor = package(&[("[Content_Types].xml", CONTENT_TYPES), ("_rels/.rels", rels)]);
        let result = read_package(cursor, &ParserConfig::new());
        assert!(matches!(result, Err(Error::MissingFile(_))));
    }

    #[test]
    fn test_dangling_child_relationship_is_a_diagnostic() {
        let rels = root_rels("/3D/3dmodel.model");
        let model_rels = root_rels("/3D/missing.model");
        let cursor = package(&[
            ("[Content_Types].xml", CONTENT_TYPES),
            ("_rels/.rels", rels.as_str()),
            ("3D/3dmodel.model", TRIANGLE_MODEL),
            ("3D/_rels/3dmodel.model.rels", model_rels.as_str()),
        ]);
        let outcome = read_package(cursor.clone(), &ParserConfig::new().strict(false)).unwrap();
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(
            outcome.warnings[0].kind,
            DiagnosticKind::OpcRelTarget {
                target: "/3D/missing.model".to_string()
            }
        );
        assert_eq!(
            outcome.warnings[0].to_string(),
            "/3D/_rels/3dmodel.model.rels: relationship target '/3D/missing.model' does not exist"
        );

        assert!(matches!(
            read_package(cursor, &ParserConfig::new()),
            Err(Error::Diagnostics(_))
        ));
    }

    #[test]
    fn test_wrong_content_type_is_a_diagnostic() {
        let rels = root_rels("/3D/model.xml");
        let cursor = package(&[
            ("[Content_Types].xml", CONTENT_TYPES),
            ("_rels/.rels", rels.as_str()),
            ("3D/model.xml", TRIANGLE_MODEL),
        ]);
        let outcome = read_package(cursor, &ParserConfig::new().strict(false)).unwrap();
        assert_eq!(
            outcome.warnings[0].kind,
            DiagnosticKind::OpcContentType {
                part: "/3D/model.xml".to_string()
            }
        );
    }

    #[test]
    fn test_write_then_read_with_child_part() {
        let mut model = Model::new();
        let mut child = ChildModel::default();
        child.resources.objects.push(Object::new(5));
        model.children.insert("/3D/part.model".to_string(), child);
        model.build.items.push(Item::new(1));

        let cursor = write_package(&model, Cursor::new(Vec::new()), &WriterConfig::new()).unwrap();
        let mut package = Package::open(Cursor::new(cursor.into_inner())).unwrap();
        assert!(package.has_part("/3D/3dmodel.model"));
        assert!(package.has_part("/3D/_rels/3dmodel.model.rels"));
        let root = package.root_model_path().unwrap();
        assert_eq!(package.child_model_paths(&root).unwrap(), ["/3D/part.model"]);
        assert!(package.diagnostics().is_empty());
    }
}
