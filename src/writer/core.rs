//! Core element writers

use tracing::warn;

use super::material::write_base_materials;
use crate::codec::{XmlAttr, XmlEncoder, XmlName};
use crate::error::Result;
use crate::extension::ExtensionRegistry;
use crate::geometry::Matrix;
use crate::model::{
    Asset, Build, Components, ExtensionAttr, ExtensionAttrs, ExtensionDecl, Item, Mesh,
    MeshExtension, Metadata, Object, ObjectType, Resources,
};

/// State shared by every writer of one part
pub(crate) struct WriteContext<'a> {
    pub registry: &'a ExtensionRegistry,
    pub extensions: &'a [ExtensionDecl],
}

impl WriteContext<'_> {
    /// `prefix:local` form of a metadata name
    fn qualified(&self, name: &XmlName) -> String {
        if name.space.is_empty() {
            return name.local.clone();
        }
        let prefix = self
            .extensions
            .iter()
            .find(|decl| decl.namespace == name.space && !decl.local_name.is_empty())
            .map_or(name.space.as_str(), |decl| decl.local_name.as_str());
        format!("{}:{}", prefix, name.local)
    }

    /// Append the attributes of every side-car, then the unknown attributes
    fn push_ext_attrs(&self, ext_attrs: &ExtensionAttrs, any_attr: &[XmlAttr], out: &mut Vec<XmlAttr>) {
        for side_car in ext_attrs.iter() {
            match (self.registry.get(side_car.namespace()), side_car) {
                (Some(handler), _) => handler.encode_attribute(side_car, out),
                (None, ExtensionAttr::Other { attrs, .. }) => out.extend(attrs.iter().cloned()),
                (None, _) => warn!(
                    namespace = side_car.namespace(),
                    "no handler registered, extension attributes dropped"
                ),
            }
        }
        out.extend(any_attr.iter().cloned());
    }
}

pub(crate) fn format_matrix(enc: &XmlEncoder<'_>, matrix: &Matrix) -> String {
    matrix
        .values()
        .iter()
        .map(|v| enc.format_f32(*v))
        .collect::<Vec<_>>()
        .join(" ")
}

pub(crate) fn write_metadata(enc: &mut XmlEncoder<'_>, ctx: &WriteContext<'_>, metadata: &Metadata) -> Result<()> {
    let mut attrs = vec![XmlAttr::new("name", ctx.qualified(&metadata.name))];
    if metadata.preserve {
        attrs.push(XmlAttr::new("preserve", "1"));
    }
    if let Some(value_type) = &metadata.value_type {
        attrs.push(XmlAttr::new("type", value_type.as_str()));
    }
    attrs.extend(metadata.any_attr.iter().cloned());
    enc.write_start(&XmlName::core("metadata"), &attrs)?;
    if !metadata.value.is_empty() {
        enc.write_text(&metadata.value)?;
    }
    for tokens in &metadata.any {
        enc.write_tokens(tokens)?;
    }
    enc.write_end()
}

fn write_metadata_group(enc: &mut XmlEncoder<'_>, ctx: &WriteContext<'_>, metadata: &[Metadata]) -> Result<()> {
    if metadata.is_empty() {
        return Ok(());
    }
    enc.write_start(&XmlName::core("metadatagroup"), &[])?;
    for entry in metadata {
        write_metadata(enc, ctx, entry)?;
    }
    enc.write_end()
}

pub(crate) fn write_resources(enc: &mut XmlEncoder<'_>, ctx: &WriteContext<'_>, resources: &Resources) -> Result<()> {
    enc.write_start(&XmlName::core("resources"), &[])?;
    for asset in &resources.assets {
        write_asset(enc, ctx, asset)?;
    }
    for object in &resources.objects {
        write_object(enc, ctx, object)?;
    }
    enc.write_end()
}

fn write_asset(enc: &mut XmlEncoder<'_>, ctx: &WriteContext<'_>, asset: &Asset) -> Result<()> {
    match asset {
        Asset::BaseMaterials(group) => write_base_materials(enc, group),
        Asset::Unknown(tokens) => enc.write_tokens(tokens),
        other => {
            let written = match ctx.registry.get(other.namespace()) {
                Some(handler) => handler.encode_asset(other, enc)?,
                None => false,
            };
            if !written {
                warn!(namespace = other.namespace(), id = ?other.id(), "no marshaller for asset, skipped");
            }
            Ok(())
        }
    }
}

fn write_object(enc: &mut XmlEncoder<'_>, ctx: &WriteContext<'_>, object: &Object) -> Result<()> {
    let mut attrs = vec![XmlAttr::new("id", object.id.to_string())];
    if let Some(name) = &object.name {
        attrs.push(XmlAttr::new("name", name.as_str()));
    }
    if object.object_type != ObjectType::Model {
        attrs.push(XmlAttr::new("type", object.object_type.as_str()));
    }
    if let Some(pid) = object.pid {
        attrs.push(XmlAttr::new("pid", pid.to_string()));
    }
    if let Some(pindex) = object.pindex {
        attrs.push(XmlAttr::new("pindex", pindex.to_string()));
    }
    if let Some(thumbnail) = &object.thumbnail {
        attrs.push(XmlAttr::new("thumbnail", thumbnail.as_str()));
    }
    if let Some(part_number) = &object.part_number {
        attrs.push(XmlAttr::new("partnumber", part_number.as_str()));
    }
    ctx.push_ext_attrs(&object.ext_attrs, &object.any_attr, &mut attrs);

    enc.write_start(&XmlName::core("object"), &attrs)?;
    write_metadata_group(enc, ctx, &object.metadata)?;
    if let Some(mesh) = &object.mesh {
        write_mesh(enc, ctx, mesh)?;
    }
    if let Some(components) = &object.components {
        write_components(enc, ctx, components)?;
    }
    for tokens in &object.any {
        enc.write_tokens(tokens)?;
    }
    enc.write_end()
}

fn write_mesh(enc: &mut XmlEncoder<'_>, ctx: &WriteContext<'_>, mesh: &Mesh) -> Result<()> {
    enc.write_start(&XmlName::core("mesh"), &mesh.any_attr)?;

    enc.write_start(&XmlName::core("vertices"), &[])?;
    let vertex = XmlName::core("vertex");
    enc.set_auto_close(true);
    for v in &mesh.vertices {
        let attrs = [
            XmlAttr::new("x", enc.format_f32(v.x)),
            XmlAttr::new("y", enc.format_f32(v.y)),
            XmlAttr::new("z", enc.format_f32(v.z)),
        ];
        enc.write_start(&vertex, &attrs)?;
    }
    enc.set_auto_close(false);
    enc.write_end()?;

    enc.write_start(&XmlName::core("triangles"), &[])?;
    let triangle = XmlName::core("triangle");
    let mut attrs = Vec::with_capacity(7);
    enc.set_auto_close(true);
    for t in &mesh.triangles {
        attrs.clear();
        attrs.push(XmlAttr::new("v1", t.v1.to_string()));
        attrs.push(XmlAttr::new("v2", t.v2.to_string()));
        attrs.push(XmlAttr::new("v3", t.v3.to_string()));
        for (name, value) in [("p1", t.p1), ("p2", t.p2), ("p3", t.p3), ("pid", t.pid)] {
            if let Some(value) = value {
                attrs.push(XmlAttr::new(name, value.to_string()));
            }
        }
        enc.write_start(&triangle, &attrs)?;
    }
    enc.set_auto_close(false);
    enc.write_end()?;

    for extension in &mesh.extensions {
        match extension {
            MeshExtension::Unknown(tokens) => enc.write_tokens(tokens)?,
            other => {
                let written = match ctx.registry.get(other.namespace()) {
                    Some(handler) => handler.encode_mesh_extension(other, enc)?,
                    None => false,
                };
                if !written {
                    warn!(namespace = other.namespace(), "no marshaller for mesh extension, skipped");
                }
            }
        }
    }
    enc.write_end()
}

fn write_components(enc: &mut XmlEncoder<'_>, ctx: &WriteContext<'_>, components: &Components) -> Result<()> {
    let mut attrs = Vec::new();
    ctx.push_ext_attrs(&components.ext_attrs, &components.any_attr, &mut attrs);
    enc.write_start(&XmlName::core("components"), &attrs)?;
    let name = XmlName::core("component");
    for component in &components.components {
        let mut attrs = vec![XmlAttr::new("objectid", component.object_id.to_string())];
        if let Some(transform) = &component.transform {
            attrs.push(XmlAttr::new("transform", format_matrix(enc, transform)));
        }
        ctx.push_ext_attrs(&component.ext_attrs, &component.any_attr, &mut attrs);
        enc.write_element(&name, &attrs)?;
    }
    for tokens in &components.any {
        enc.write_tokens(tokens)?;
    }
    enc.write_end()
}

pub(crate) fn write_build(enc: &mut XmlEncoder<'_>, ctx: &WriteContext<'_>, build: &Build) -> Result<()> {
    let mut attrs = Vec::new();
    ctx.push_ext_attrs(&build.ext_attrs, &build.any_attr, &mut attrs);
    enc.write_start(&XmlName::core("build"), &attrs)?;
    for item in &build.items {
        write_item(enc, ctx, item)?;
    }
    for tokens in &build.any {
        enc.write_tokens(tokens)?;
    }
    enc.write_end()
}

fn write_item(enc: &mut XmlEncoder<'_>, ctx: &WriteContext<'_>, item: &Item) -> Result<()> {
    let mut attrs = vec![XmlAttr::new("objectid", item.object_id.to_string())];
    if let Some(transform) = &item.transform {
        attrs.push(XmlAttr::new("transform", format_matrix(enc, transform)));
    }
    if let Some(part_number) = &item.part_number {
        attrs.push(XmlAttr::new("partnumber", part_number.as_str()));
    }
    ctx.push_ext_attrs(&item.ext_attrs, &item.any_attr, &mut attrs);
    enc.write_start(&XmlName::core("item"), &attrs)?;
    write_metadata_group(enc, ctx, &item.metadata)?;
    for tokens in &item.any {
        enc.write_tokens(tokens)?;
    }
    enc.write_end()
}
