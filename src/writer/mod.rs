//! XML writing for 3MF model parts
//!
//! This module serializes a [`Model`] back into 3MF-compliant XML. Core
//! elements are written here; extension assets, mesh payloads and side-car
//! attributes are written by the handler registered for their namespace, and
//! preserved unknown subtrees are replayed token by token.
//!
//! Elements are written in stored order and attributes holding their default
//! value are omitted, so a decoded model encodes back to the same bytes.

mod beam_lattice;
mod boolean_ops;
mod core;
mod material;
mod production;
mod slice;

use std::io::Write;

use tracing::debug;

use crate::codec::{CORE_NAMESPACE, XMLNS_NAMESPACE, XmlAttr, XmlEncoder, XmlName};
use crate::error::{Error, Result};
use crate::extension::ExtensionRegistry;
use crate::model::{ExtensionDecl, Model, Units, WriterConfig};

pub(crate) use self::beam_lattice::write_beam_lattice;
pub(crate) use self::boolean_ops::boolean_operation_attrs;
pub(crate) use self::production::production_attrs;
pub(crate) use self::slice::{slice_stack_info_attrs, write_slice_stack};

use self::core::{WriteContext, write_build, write_metadata, write_resources};

/// Write the root model part with the default configuration
///
/// ```
/// use threemf::model::Model;
/// use threemf::writer::write_model_xml;
///
/// let mut out = Vec::new();
/// write_model_xml(&Model::new(), &mut out).unwrap();
/// let xml = String::from_utf8(out).unwrap();
/// assert!(xml.contains("<resources/>"));
/// ```
pub fn write_model_xml<W: Write>(model: &Model, writer: W) -> Result<()> {
    write_model_xml_with_config(model, writer, &WriterConfig::default())
}

/// Write the root model part
pub fn write_model_xml_with_config<W: Write>(
    model: &Model,
    mut writer: W,
    config: &WriterConfig,
) -> Result<()> {
    let extensions = effective_extensions(model, config.registry());
    let ctx = WriteContext {
        registry: config.registry(),
        extensions: &extensions,
    };

    let mut attrs = namespace_attrs(&extensions);
    if model.units != Units::Millimeter {
        attrs.push(XmlAttr::new("unit", model.units.as_str()));
    }
    if let Some(language) = &model.language {
        attrs.push(XmlAttr::namespaced(crate::codec::XML_NAMESPACE, "lang", language.as_str()));
    }
    if let Some(thumbnail) = &model.thumbnail {
        attrs.push(XmlAttr::new("thumbnail", thumbnail.as_str()));
    }
    attrs.extend(required_extensions_attr(&extensions));
    attrs.extend(model.any_attr.iter().cloned());

    let mut enc = XmlEncoder::new(&mut writer, config.precision(), config.is_indented());
    enc.write_declaration()?;
    enc.write_start(&XmlName::core("model"), &attrs)?;
    for metadata in &model.metadata {
        write_metadata(&mut enc, &ctx, metadata)?;
    }
    write_resources(&mut enc, &ctx, &model.resources)?;
    write_build(&mut enc, &ctx, &model.build)?;
    for tokens in &model.any {
        enc.write_tokens(tokens)?;
    }
    enc.write_end()?;
    enc.finish()?;

    debug!(
        part = model.root_path(),
        objects = model.resources.objects.len(),
        assets = model.resources.assets.len(),
        items = model.build.items.len(),
        "encoded model part"
    );
    Ok(())
}

/// Write the child part stored under `path`
///
/// Child parts carry the namespace declarations of the root model, their own
/// resources and an empty build list.
pub fn write_child_xml<W: Write>(
    model: &Model,
    path: &str,
    mut writer: W,
    config: &WriterConfig,
) -> Result<()> {
    let child = model
        .children
        .get(path)
        .ok_or_else(|| Error::MissingFile(path.to_string()))?;
    let extensions = effective_extensions(model, config.registry());
    let ctx = WriteContext {
        registry: config.registry(),
        extensions: &extensions,
    };

    let mut attrs = namespace_attrs(&extensions);
    if model.units != Units::Millimeter {
        attrs.push(XmlAttr::new("unit", model.units.as_str()));
    }
    attrs.extend(child.any_attr.iter().cloned());

    let mut enc = XmlEncoder::new(&mut writer, config.precision(), config.is_indented());
    enc.write_declaration()?;
    enc.write_start(&XmlName::core("model"), &attrs)?;
    write_resources(&mut enc, &ctx, &child.resources)?;
    enc.write_element(&XmlName::core("build"), &[])?;
    for tokens in &child.any {
        enc.write_tokens(tokens)?;
    }
    enc.write_end()?;
    enc.finish()?;

    debug!(
        part = path,
        objects = child.resources.objects.len(),
        assets = child.resources.assets.len(),
        "encoded child model part"
    );
    Ok(())
}

/// Declared namespaces plus those of every handler whose content the model uses
pub(crate) fn effective_extensions(model: &Model, registry: &ExtensionRegistry) -> Vec<ExtensionDecl> {
    let mut decls = model.extensions.clone();
    for handler in registry.handlers() {
        if decls.iter().any(|d| d.namespace == handler.namespace()) || !handler.is_used_in_model(model) {
            continue;
        }
        let prefix = unique_prefix(&decls, handler.default_prefix());
        decls.push(ExtensionDecl::new(
            handler.namespace(),
            prefix,
            handler.required_when_used(),
        ));
    }
    decls
}

fn unique_prefix(decls: &[ExtensionDecl], preferred: &str) -> String {
    let taken = |p: &str| decls.iter().any(|d| d.local_name == p);
    if !taken(preferred) {
        return preferred.to_string();
    }
    (1..)
        .map(|n| format!("{}{}", preferred, n))
        .find(|p| !taken(p))
        .unwrap_or_else(|| preferred.to_string())
}

fn namespace_attrs(extensions: &[ExtensionDecl]) -> Vec<XmlAttr> {
    let mut attrs = vec![XmlAttr::new("xmlns", CORE_NAMESPACE)];
    attrs.extend(
        extensions
            .iter()
            .filter(|decl| !decl.local_name.is_empty())
            .map(|decl| XmlAttr::namespaced(XMLNS_NAMESPACE, &decl.local_name, decl.namespace.as_str())),
    );
    attrs
}

fn required_extensions_attr(extensions: &[ExtensionDecl]) -> Option<XmlAttr> {
    let required: Vec<&str> = extensions
        .iter()
        .filter(|decl| decl.is_required && !decl.local_name.is_empty())
        .map(|decl| decl.local_name.as_str())
        .collect();
    (!required.is_empty()).then(|| XmlAttr::new("requiredextensions", required.join(" ")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extension::Extension;
    use crate::geometry::Point3D;
    use crate::model::{Item, Metadata, MeshBuilder, Object, ObjectType};
    use crate::parser::parse_model_xml;

    fn triangle_model() -> Model {
        let mut builder = MeshBuilder::new();
        let a = builder.add_vertex(Point3D::new(0.0, 0.0, 0.0));
        let b = builder.add_vertex(Point3D::new(1.5, 0.0, 0.0));
        let c = builder.add_vertex(Point3D::new(0.0, 2.25, 0.0));
        builder.add_triangle(a, b, c);
        let mut model = Model::new();
        let mut object = Object::with_mesh(1, builder.finish());
        object.object_type = ObjectType::Surface;
        model.resources.objects.push(object);
        model.build.items.push(Item::new(1));
        model
    }

    fn to_string(model: &Model, config: &WriterConfig) -> String {
        let mut out = Vec::new();
        write_model_xml_with_config(model, &mut out, config).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_defaults_are_omitted() {
        let xml = to_string(&triangle_model(), &WriterConfig::new().indent(false));
        assert!(!xml.contains("unit="));
        assert!(xml.contains(r#"<object id="1" type="surface">"#));
        assert!(xml.contains(r#"<vertex x="1.5" y="0" z="0"/>"#));
        assert!(xml.contains(r#"<item objectid="1"/>"#));
    }

    #[test]
    fn test_float_precision() {
        let xml = to_string(&triangle_model(), &WriterConfig::new().float_precision(Some(2)).indent(false));
        assert!(xml.contains(r#"<vertex x="0.00" y="2.25" z="0.00"/>"#));
    }

    #[test]
    fn test_round_trip_is_stable() {
        let mut model = triangle_model();
        model.units = Units::Inch;
        model.language = Some("en-US".to_string());
        model.metadata.push(Metadata::new("Title", "Tri & co"));
        let first = to_string(&model, &WriterConfig::new());
        let decoded = parse_model_xml(&first).unwrap();
        assert_eq!(decoded, model);
        assert_eq!(to_string(&decoded, &WriterConfig::new()), first);
    }

    #[test]
    fn test_used_extension_is_declared() {
        let mut model = triangle_model();
        model.resources.objects[0]
            .components = None;
        model.resources.objects[0]
            .ext_attrs
            .insert(crate::model::ExtensionAttr::Production(crate::model::ProductionAttr::with_uuid(
                "3e93ab1c-1a6c-4d8f-9f5a-0f0b2c6b6d11",
            )));
        let xml = to_string(&model, &WriterConfig::new().indent(false));
        assert!(xml.contains(&format!(r#"xmlns:p="{}""#, Extension::Production.namespace())));
        assert!(xml.contains(r#"p:UUID="3e93ab1c-1a6c-4d8f-9f5a-0f0b2c6b6d11""#));
    }

    #[test]
    fn test_unique_prefix() {
        let decls = vec![ExtensionDecl::new("urn:a", "p", false)];
        assert_eq!(unique_prefix(&decls, "p"), "p1");
        assert_eq!(unique_prefix(&decls, "s"), "s");
    }

    #[test]
    fn test_missing_child_part() {
        let result = write_child_xml(&Model::new(), "/3D/none.model", Vec::new(), &WriterConfig::new());
        assert!(matches!(result, Err(Error::MissingFile(_))));
    }
}
