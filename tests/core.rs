//! Core model decoding, encoding and package round trips

mod common;

use std::fs::File;

use common::{cube_model, model_xml, package_bytes, package_with_root};
use tempfile::NamedTempFile;
use threemf::model::{Metadata, ObjectType, Units};
use threemf::parser::{parse_model_xml, parse_model_xml_with_config};
use threemf::writer::write_model_xml;
use threemf::{DiagnosticKind, Model, ParserConfig};

fn encode(model: &Model) -> Vec<u8> {
    let mut out = Vec::new();
    write_model_xml(model, &mut out).unwrap();
    out
}

#[test]
fn test_cube_validates_clean() {
    let model = cube_model();
    let diagnostics = model.validate();
    assert!(diagnostics.is_empty(), "unexpected diagnostics: {:?}", diagnostics);
}

#[test]
fn test_cube_round_trip_is_byte_equal() {
    let model = cube_model();
    let first = encode(&model);
    let decoded = parse_model_xml(std::str::from_utf8(&first).unwrap()).unwrap();
    assert_eq!(decoded, model);
    assert_eq!(encode(&decoded), first);
}

#[test]
fn test_model_attributes_round_trip() {
    let mut model = cube_model();
    model.units = Units::Centimeter;
    model.language = Some("de-DE".to_string());
    model.metadata.push(Metadata::new("Title", "Würfel <1>"));
    model.metadata.push(Metadata::new("Designer", "Q&A"));
    model.resources.objects[0].name = Some("cube".to_string());
    model.resources.objects[0].object_type = ObjectType::SolidSupport;
    model.build.items[0].part_number = Some("PN-1".to_string());

    let first = encode(&model);
    let decoded = parse_model_xml(std::str::from_utf8(&first).unwrap()).unwrap();
    assert_eq!(decoded, model);
    assert_eq!(encode(&decoded), first);
}

#[test]
fn test_unknown_namespace_content_is_preserved() {
    let xml = model_xml(
        r#"xmlns:v="urn:vendor""#,
        r#"<resources>
             <object id="1" type="surface" v:flag="on" legacy="yes">
               <mesh>
                 <vertices><vertex x="0" y="0" z="0"/><vertex x="1" y="0" z="0"/><vertex x="0" y="1" z="0"/></vertices>
                 <triangles><triangle v1="0" v2="1" v3="2"/></triangles>
               </mesh>
               <v:note a="1"/>
             </object>
             <object id="2">
               <components><component objectid="1" v:slot="3"/><v:compnote a="1"/></components>
             </object>
           </resources>
           <build><item objectid="2" v:tag="x"><v:itemnote b="2"/></item></build>"#,
    );
    let model = parse_model_xml(&xml).unwrap();
    let object = &model.resources.objects[0];
    assert_eq!(object.any_attr.len(), 2);
    assert_eq!(object.any.len(), 1);
    let components = model.resources.objects[1].components.as_ref().unwrap();
    assert_eq!(components.any.len(), 1);
    assert_eq!(components.components[0].any_attr.len(), 1);
    assert_eq!(model.build.items[0].any.len(), 1);

    let out = String::from_utf8(encode(&model)).unwrap();
    assert!(out.contains(r#"xmlns:v="urn:vendor""#));
    assert!(out.contains(r#"v:flag="on""#));
    assert!(out.contains(r#"legacy="yes""#));
    assert!(out.contains(r#"<v:note a="1""#));
    assert!(out.contains(r#"<v:compnote a="1""#));
    assert!(out.contains(r#"v:tag="x""#));
    assert!(out.contains(r#"<v:itemnote b="2""#));

    let again = parse_model_xml(&out).unwrap();
    assert_eq!(again.resources, model.resources);
    assert_eq!(again.build, model.build);
}

#[test]
fn test_undefined_vertex_attribute_is_reported() {
    let xml = model_xml(
        "",
        r#"<resources>
             <object id="1" type="surface">
               <mesh>
                 <vertices><vertex x="0" y="0" z="0" w="1"/><vertex x="1" y="0" z="0"/><vertex x="0" y="1" z="0"/></vertices>
                 <triangles><triangle v1="0" v2="1" v3="2"/></triangles>
               </mesh>
             </object>
           </resources>
           <build><item objectid="1"/></build>"#,
    );
    assert!(parse_model_xml(&xml).is_err());

    let outcome = parse_model_xml_with_config(&xml, &ParserConfig::new().strict(false)).unwrap();
    assert_eq!(outcome.warnings.len(), 1);
    assert_eq!(
        outcome.warnings[0].kind,
        DiagnosticKind::UnknownAttribute {
            name: "w".to_string()
        }
    );
    assert!(outcome.warnings[0].path_ends_with("Mesh@Vertex#0"));
}

#[test]
fn test_package_round_trip_through_file() {
    let model = cube_model();
    let file = NamedTempFile::new().unwrap();
    model.write_to_file(file.path()).unwrap();

    let decoded = Model::from_reader(File::open(file.path()).unwrap()).unwrap();
    assert_eq!(decoded, model);
    assert!(decoded.validate().is_empty());
}

#[test]
fn test_package_round_trip_in_memory() {
    let mut model = cube_model();
    model.units = Units::Inch;
    let decoded = Model::from_reader(package_bytes(&model)).unwrap();
    assert_eq!(decoded.units, Units::Inch);
    assert_eq!(decoded.resources.objects.len(), 1);
    assert_eq!(decoded.build.items.len(), 1);
}

#[test]
fn test_strict_decode_fails_on_bad_attribute() {
    let xml = model_xml(
        "",
        r#"<resources><object id="1"><mesh>
             <vertices><vertex x="0" y="zero" z="0"/></vertices><triangles/>
           </mesh></object></resources><build/>"#,
    );
    let err = Model::from_reader(package_with_root(&xml)).unwrap_err();
    let diagnostics = err.diagnostics().expect("strict decode reports diagnostics");
    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics[0].path_ends_with("Resources@Object#0@Mesh@Vertex#0"));

    let outcome =
        Model::from_reader_with_config(package_with_root(&xml), &ParserConfig::new().strict(false)).unwrap();
    assert_eq!(outcome.warnings.len(), 1);
    assert_eq!(outcome.model.resources.objects.len(), 1);
}

#[test]
fn test_not_a_model_document() {
    let result = parse_model_xml("<root/>");
    assert!(result.is_err());
}
