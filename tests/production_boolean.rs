//! Production and Boolean Operations extensions

mod common;

use common::{cube_mesh, model_xml};
use threemf::diagnostic::DiagnosticKind;
use threemf::extension::Extension;
use threemf::model::{BooleanOpType, BooleanOperationAttr, ExtensionAttr, ProductionAttr};
use threemf::parser::{parse_model_xml, parse_model_xml_with_config};
use threemf::writer::write_model_xml;
use threemf::{Component, Item, Model, Object, ParserConfig};

const BUILD_UUID: &str = "0b0c3a9e-8f2a-4b7e-9a51-6f0d2d1c0001";
const ITEM_UUID: &str = "0b0c3a9e-8f2a-4b7e-9a51-6f0d2d1c0002";
const OBJECT_UUID: &str = "0b0c3a9e-8f2a-4b7e-9a51-6f0d2d1c0003";

fn production_document(build: &str, item: &str, object: &str) -> String {
    model_xml(
        &format!(r#"xmlns:p="{}""#, Extension::Production.namespace()),
        &format!(
            r#"<resources>
                 <object id="1" type="surface" {}>
                   <mesh>
                     <vertices><vertex x="0" y="0" z="0"/><vertex x="1" y="0" z="0"/><vertex x="0" y="1" z="0"/></vertices>
                     <triangles><triangle v1="0" v2="1" v3="2"/></triangles>
                   </mesh>
                 </object>
               </resources>
               <build {}><item objectid="1" {}/></build>"#,
            object, build, item
        ),
    )
}

fn uuid(value: &str) -> String {
    format!(r#"p:UUID="{}""#, value)
}

#[test]
fn test_production_uuids_decode_and_validate() {
    let xml = production_document(&uuid(BUILD_UUID), &uuid(ITEM_UUID), &uuid(OBJECT_UUID));
    let model = parse_model_xml(&xml).unwrap();
    let item_uuid = model.build.items[0]
        .ext_attrs
        .get::<ProductionAttr>()
        .and_then(|p| p.uuid.as_deref());
    assert_eq!(item_uuid, Some(ITEM_UUID));
    assert!(model.validate().is_empty());

    let mut out = Vec::new();
    write_model_xml(&model, &mut out).unwrap();
    let encoded = String::from_utf8(out).unwrap();
    assert!(encoded.contains(&format!(r#"<build p:UUID="{}">"#, BUILD_UUID)));
    assert_eq!(parse_model_xml(&encoded).unwrap().resources, model.resources);
}

#[test]
fn test_duplicated_and_missing_uuids() {
    let xml = production_document("", &uuid(ITEM_UUID), &uuid(ITEM_UUID));
    let diagnostics = parse_model_xml(&xml).unwrap().validate();
    assert_eq!(diagnostics.len(), 2);
    assert_eq!(diagnostics[0].kind, DiagnosticKind::missing_field("UUID"));
    assert_eq!(diagnostics[0].path.to_string(), "/3D/3dmodel.model@Build");
    assert_eq!(diagnostics[1].kind, DiagnosticKind::DuplicatedUuid);
    assert!(diagnostics[1].path_ends_with("Resources@Object#0"));
}

#[test]
fn test_relative_item_path() {
    let item = format!(r#"{} p:path="3D/other.model""#, uuid(ITEM_UUID));
    let xml = production_document(&uuid(BUILD_UUID), &item, &uuid(OBJECT_UUID));
    let kinds: Vec<DiagnosticKind> = parse_model_xml(&xml)
        .unwrap()
        .validate()
        .into_iter()
        .map(|d| d.kind)
        .collect();
    assert!(kinds.contains(&DiagnosticKind::PathNotAbsolute));
    assert!(kinds.contains(&DiagnosticKind::MissingResource { id: 1 }));
}

#[test]
fn test_malformed_uuid_is_a_diagnostic() {
    let xml = production_document(&uuid(BUILD_UUID), &uuid("not-a-uuid"), &uuid(OBJECT_UUID));
    assert!(parse_model_xml(&xml).is_err());

    let outcome = parse_model_xml_with_config(&xml, &ParserConfig::new().strict(false)).unwrap();
    assert_eq!(outcome.warnings.len(), 1);
    assert_eq!(outcome.warnings[0].kind, DiagnosticKind::parse_attr("UUID", false));
    assert!(outcome.warnings[0].path_ends_with("Build@Item#0"));
}

fn boolean_model(operation: BooleanOpType) -> Model {
    let mut model = Model::new();
    model.resources.objects.push(Object::with_mesh(1, cube_mesh()));
    model.resources.objects.push(Object::with_mesh(2, cube_mesh()));
    let mut group = Object::with_components(3, vec![Component::new(1), Component::new(2)]);
    if let Some(components) = group.components.as_mut() {
        components.ext_attrs.insert(ExtensionAttr::BooleanOperation(BooleanOperationAttr {
            operation,
            ..Default::default()
        }));
    }
    model.resources.objects.push(group);
    model.build.items.push(Item::new(3));
    model
}

#[test]
fn test_boolean_group_round_trip() {
    let model = boolean_model(BooleanOpType::Difference);
    assert!(model.validate().is_empty());

    let mut out = Vec::new();
    write_model_xml(&model, &mut out).unwrap();
    let xml = String::from_utf8(out).unwrap();
    assert!(xml.contains(r#"requiredextensions="bo""#));
    assert!(xml.contains(r#"bo:association="physical" bo:operation="difference""#));

    let decoded = parse_model_xml(&xml).unwrap();
    assert_eq!(decoded.resources, model.resources);
}

#[test]
fn test_boolean_operand_must_be_a_mesh() {
    let mut model = boolean_model(BooleanOpType::Union);
    model.resources.objects.push(Object::with_components(4, vec![Component::new(1)]));
    if let Some(components) = model.resources.objects[2].components.as_mut() {
        components.components.push(Component::new(4));
    }
    let diagnostics = model.validate();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].kind, DiagnosticKind::BooleanNonMeshOperand);
    assert!(diagnostics[0].path_ends_with("Object#2@Components@Component#2"));
}

#[test]
fn test_boolean_needs_two_operands() {
    let mut model = boolean_model(BooleanOpType::Intersection);
    if let Some(components) = model.resources.objects[2].components.as_mut() {
        components.components.truncate(1);
    }
    let diagnostics = model.validate();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].kind, DiagnosticKind::BooleanInsufficientComponents);
}
