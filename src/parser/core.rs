//! Core 3MF element decoders
//!
//! One decoder per structural element (`model`, `resources`, `object`,
//! `mesh`, `components`, `build`, `item`, `metadata`). Leaf elements such as
//! `vertex`, `triangle` and `component` are decoded inline by their
//! container so no decoder is allocated per leaf.

use crate::codec::{
    CORE_NAMESPACE, Child, DecodeContext, ElementDecoder, Node, StartElement, XML_NAMESPACE,
    XMLNS_NAMESPACE, XmlAttr, XmlName,
};
use crate::diagnostic::{DiagnosticKind, PathSegment};
use crate::extension::AttrOwner;
use crate::geometry::{Matrix, Point3D};
use crate::model::{
    Asset, Build, Component, Components, ExtensionDecl, Item, Mesh, MeshExtension, Metadata,
    Model, Object, ObjectType, Resources, Triangle, Units,
};

use super::material::BaseMaterialsDecoder;
use super::{decode_foreign_attr, keep_unknown_attr, parse_bool};

fn is_core(name: &XmlName, local: &str) -> bool {
    name.is(CORE_NAMESPACE, local)
}

/// Vertices and triangles have no room for raw attributes
fn report_unknown_attr(attr: &XmlAttr, ctx: &mut DecodeContext<'_>) {
    if !attr.name.is_namespace_declaration() {
        ctx.report(DiagnosticKind::UnknownAttribute {
            name: attr.name.local.clone(),
        });
    }
}

/// Root of a model part; accepts a single core `<model>` element
#[derive(Default)]
pub(crate) struct DocumentDecoder {
    model: Option<Model>,
}

impl ElementDecoder for DocumentDecoder {
    fn child(&mut self, name: &XmlName, _ctx: &mut DecodeContext<'_>) -> Child {
        if self.model.is_none() && is_core(name, "model") {
            Child::Decoder(Box::new(ModelDecoder::default()))
        } else {
            Child::Unknown
        }
    }

    fn attach(&mut self, node: Node, _ctx: &mut DecodeContext<'_>) {
        if let Node::Model(model) = node {
            self.model = Some(*model);
        }
    }

    fn end(self: Box<Self>, _ctx: &mut DecodeContext<'_>) -> Option<Node> {
        self.model.map(|model| Node::Model(Box::new(model)))
    }
}

#[derive(Default)]
struct ModelDecoder {
    model: Model,
}

impl ModelDecoder {
    fn required_extensions(&mut self, value: &str, ctx: &mut DecodeContext<'_>) {
        for prefix in value.split_whitespace() {
            let namespace = match ctx.resolve_prefix(prefix) {
                Some(namespace) => namespace.to_string(),
                None => {
                    ctx.report(DiagnosticKind::UnsupportedExtension {
                        namespace: prefix.to_string(),
                    });
                    continue;
                }
            };
            if let Some(decl) = self
                .model
                .extensions
                .iter_mut()
                .find(|decl| decl.namespace == namespace)
            {
                decl.is_required = true;
            }
            if namespace != CORE_NAMESPACE && !ctx.registry().contains(&namespace) {
                ctx.report(DiagnosticKind::UnsupportedExtension { namespace });
            }
        }
    }
}

impl ElementDecoder for ModelDecoder {
    fn start(&mut self, start: &StartElement, ctx: &mut DecodeContext<'_>) {
        for attr in &start.attrs {
            if attr.name.space == XMLNS_NAMESPACE
                && attr.value != CORE_NAMESPACE
                && attr.value != XML_NAMESPACE
            {
                self.model
                    .extensions
                    .push(ExtensionDecl::new(attr.value.clone(), attr.name.local.clone(), false));
            }
        }

        let model = &mut self.model;
        let mut required = None;
        for attr in &start.attrs {
            match (attr.name.space.as_str(), attr.name.local.as_str()) {
                ("", "unit") => {
                    if let Some(units) = ctx.parse_attr::<Units>(attr, false) {
                        model.units = units;
                    }
                }
                ("", "thumbnail") => model.thumbnail = Some(attr.value.clone()),
                ("", "requiredextensions") => required = Some(attr.value.clone()),
                (XML_NAMESPACE, "lang") => model.language = Some(attr.value.clone()),
                (XMLNS_NAMESPACE, _) => {}
                _ => keep_unknown_attr(attr, &mut model.any_attr),
            }
        }
        if let Some(value) = required {
            self.required_extensions(&value, ctx);
        }
    }

    fn child(&mut self, name: &XmlName, _ctx: &mut DecodeContext<'_>) -> Child {
        if name.space != CORE_NAMESPACE {
            return Child::Unknown;
        }
        match name.local.as_str() {
            "metadata" => Child::Decoder(Box::new(MetadataDecoder::new(self.model.metadata.len()))),
            "resources" => Child::Decoder(Box::new(ResourcesDecoder::default())),
            "build" => Child::Decoder(Box::new(BuildDecoder::default())),
            _ => Child::Unknown,
        }
    }

    fn attach(&mut self, node: Node, _ctx: &mut DecodeContext<'_>) {
        match node {
            Node::Metadata(metadata) => self.model.metadata.push(metadata),
            Node::Resources(resources) => self.model.resources = resources,
            Node::Build(build) => self.model.build = build,
            Node::Unknown(tokens) => self.model.any.push(tokens),
            _ => {}
        }
    }

    fn end(self: Box<Self>, _ctx: &mut DecodeContext<'_>) -> Option<Node> {
        Some(Node::Model(Box::new(self.model)))
    }
}

struct MetadataDecoder {
    index: usize,
    metadata: Metadata,
}

impl MetadataDecoder {
    fn new(index: usize) -> Self {
        Self {
            index,
            metadata: Metadata::default(),
        }
    }
}

impl ElementDecoder for MetadataDecoder {
    fn segment(&self) -> Option<PathSegment> {
        Some(PathSegment::indexed("Metadata", self.index))
    }

    fn start(&mut self, start: &StartElement, ctx: &mut DecodeContext<'_>) {
        for attr in &start.attrs {
            if !attr.name.space.is_empty() {
                keep_unknown_attr(attr, &mut self.metadata.any_attr);
                continue;
            }
            match attr.name.local.as_str() {
                "name" => self.metadata.name = ctx.resolve_qualified(&attr.value),
                "preserve" => self.metadata.preserve = parse_bool(&attr.value),
                "type" => self.metadata.value_type = Some(attr.value.clone()),
                _ => keep_unknown_attr(attr, &mut self.metadata.any_attr),
            }
        }
    }

    fn wants_char_data(&self) -> bool {
        true
    }

    fn char_data(&mut self, text: &str, _ctx: &mut DecodeContext<'_>) {
        self.metadata.value.push_str(text);
    }

    fn attach(&mut self, node: Node, _ctx: &mut DecodeContext<'_>) {
        if let Node::Unknown(tokens) = node {
            self.metadata.any.push(tokens);
        }
    }

    fn end(self: Box<Self>, _ctx: &mut DecodeContext<'_>) -> Option<Node> {
        Some(Node::Metadata(self.metadata))
    }
}

#[derive(Default)]
struct ResourcesDecoder {
    resources: Resources,
}

impl ElementDecoder for ResourcesDecoder {
    fn segment(&self) -> Option<PathSegment> {
        Some(PathSegment::new("Resources"))
    }

    fn child(&mut self, name: &XmlName, ctx: &mut DecodeContext<'_>) -> Child {
        let asset_index = self.resources.assets.len();
        if name.space == CORE_NAMESPACE {
            return match name.local.as_str() {
                "object" => Child::Decoder(Box::new(ObjectDecoder::new(self.resources.objects.len()))),
                "basematerials" => Child::Decoder(Box::new(BaseMaterialsDecoder::new(asset_index))),
                _ => Child::Unknown,
            };
        }
        ctx.registry()
            .get(&name.space)
            .and_then(|handler| handler.new_resources_decoder(&name.local, asset_index))
            .map_or(Child::Unknown, Child::Decoder)
    }

    fn attach(&mut self, node: Node, _ctx: &mut DecodeContext<'_>) {
        match node {
            Node::Object(object) => self.resources.objects.push(object),
            Node::Asset(asset) => self.resources.assets.push(asset),
            Node::Unknown(tokens) => self.resources.assets.push(Asset::Unknown(tokens)),
            _ => {}
        }
    }

    fn end(self: Box<Self>, _ctx: &mut DecodeContext<'_>) -> Option<Node> {
        Some(Node::Resources(self.resources))
    }
}

/// Collects `<metadata>` children of a `<metadatagroup>` owned by an object or item
#[derive(Default)]
struct MetadataGroup {
    open: bool,
}

impl MetadataGroup {
    fn child(&self, name: &XmlName, metadata: &[Metadata]) -> Option<Child> {
        if is_core(name, "metadatagroup") && !self.open {
            return Some(Child::Inline);
        }
        if is_core(name, "metadata") && self.open {
            return Some(Child::Decoder(Box::new(MetadataDecoder::new(metadata.len()))));
        }
        None
    }
}

struct ObjectDecoder {
    index: usize,
    object: Object,
    group: MetadataGroup,
}

impl ObjectDecoder {
    fn new(index: usize) -> Self {
        Self {
            index,
            object: Object::default(),
            group: MetadataGroup::default(),
        }
    }
}

impl ElementDecoder for ObjectDecoder {
    fn segment(&self) -> Option<PathSegment> {
        Some(PathSegment::indexed("Object", self.index))
    }

    fn start(&mut self, start: &StartElement, ctx: &mut DecodeContext<'_>) {
        let object = &mut self.object;
        for attr in &start.attrs {
            if !attr.name.space.is_empty() {
                decode_foreign_attr(ctx, AttrOwner::Object, attr, &mut object.ext_attrs, &mut object.any_attr);
                continue;
            }
            match attr.name.local.as_str() {
                "id" => object.id = ctx.parse_attr(attr, true).unwrap_or_default(),
                "name" => object.name = Some(attr.value.clone()),
                "type" => {
                    object.object_type = ctx.parse_attr::<ObjectType>(attr, false).unwrap_or_default()
                }
                "pid" => object.pid = ctx.parse_attr(attr, false),
                "pindex" => object.pindex = ctx.parse_attr(attr, false),
                "thumbnail" => object.thumbnail = Some(attr.value.clone()),
                "partnumber" => object.part_number = Some(attr.value.clone()),
                _ => keep_unknown_attr(attr, &mut object.any_attr),
            }
        }
    }

    fn child(&mut self, name: &XmlName, _ctx: &mut DecodeContext<'_>) -> Child {
        if let Some(child) = self.group.child(name, &self.object.metadata) {
            return child;
        }
        if is_core(name, "mesh") && self.object.mesh.is_none() {
            return Child::Decoder(Box::new(MeshDecoder::default()));
        }
        if is_core(name, "components") && self.object.components.is_none() {
            return Child::Decoder(Box::new(ComponentsDecoder::default()));
        }
        Child::Unknown
    }

    fn inline_start(&mut self, _start: &StartElement, _ctx: &mut DecodeContext<'_>) {
        self.group.open = true;
    }

    fn inline_end(&mut self, _name: &XmlName, _ctx: &mut DecodeContext<'_>) {
        self.group.open = false;
    }

    fn attach(&mut self, node: Node, _ctx: &mut DecodeContext<'_>) {
        match node {
            Node::Mesh(mesh) => self.object.mesh = Some(mesh),
            Node::Components(components) => self.object.components = Some(components),
            Node::Metadata(metadata) => self.object.metadata.push(metadata),
            Node::Unknown(tokens) => self.object.any.push(tokens),
            _ => {}
        }
    }

    fn end(self: Box<Self>, _ctx: &mut DecodeContext<'_>) -> Option<Node> {
        Some(Node::Object(self.object))
    }
}

#[derive(Default)]
struct MeshDecoder {
    mesh: Mesh,
}

impl MeshDecoder {
    fn vertex(&mut self, start: &StartElement, ctx: &mut DecodeContext<'_>) {
        ctx.push_segment(PathSegment::indexed("Vertex", self.mesh.vertices.len()));
        let mut vertex = Point3D::default();
        for attr in start.attrs.iter().filter(|a| a.name.space.is_empty()) {
            let slot = match attr.name.local.as_str() {
                "x" => &mut vertex.x,
                "y" => &mut vertex.y,
                "z" => &mut vertex.z,
                _ => {
                    report_unknown_attr(attr, ctx);
                    continue;
                }
            };
            *slot = ctx.parse_attr(attr, true).unwrap_or_default();
        }
        ctx.pop_segment();
        self.mesh.vertices.push(vertex);
    }

    fn triangle(&mut self, start: &StartElement, ctx: &mut DecodeContext<'_>) {
        ctx.push_segment(PathSegment::indexed("Triangle", self.mesh.triangles.len()));
        let mut triangle = Triangle::default();
        for attr in start.attrs.iter().filter(|a| a.name.space.is_empty()) {
            match attr.name.local.as_str() {
                "v1" => triangle.v1 = ctx.parse_attr(attr, true).unwrap_or_default(),
                "v2" => triangle.v2 = ctx.parse_attr(attr, true).unwrap_or_default(),
                "v3" => triangle.v3 = ctx.parse_attr(attr, true).unwrap_or_default(),
                "p1" => triangle.p1 = ctx.parse_attr(attr, false),
                "p2" => triangle.p2 = ctx.parse_attr(attr, false),
                "p3" => triangle.p3 = ctx.parse_attr(attr, false),
                "pid" => triangle.pid = ctx.parse_attr(attr, false),
                _ => report_unknown_attr(attr, ctx),
            }
        }
        ctx.pop_segment();
        self.mesh.triangles.push(triangle);
    }
}

impl ElementDecoder for MeshDecoder {
    fn segment(&self) -> Option<PathSegment> {
        Some(PathSegment::new("Mesh"))
    }

    fn start(&mut self, start: &StartElement, _ctx: &mut DecodeContext<'_>) {
        self.mesh.any_attr.extend(
            start
                .attrs
                .iter()
                .filter(|a| !a.name.is_namespace_declaration())
                .cloned(),
        );
    }

    fn child(&mut self, name: &XmlName, ctx: &mut DecodeContext<'_>) -> Child {
        if name.space == CORE_NAMESPACE {
            return match name.local.as_str() {
                "vertices" | "vertex" | "triangles" | "triangle" => Child::Inline,
                _ => Child::Unknown,
            };
        }
        ctx.registry()
            .get(&name.space)
            .and_then(|handler| handler.new_mesh_decoder(&name.local))
            .map_or(Child::Unknown, Child::Decoder)
    }

    fn inline_start(&mut self, start: &StartElement, ctx: &mut DecodeContext<'_>) {
        match start.name.local.as_str() {
            "vertex" => self.vertex(start, ctx),
            "triangle" => self.triangle(start, ctx),
            _ => {}
        }
    }

    fn attach(&mut self, node: Node, _ctx: &mut DecodeContext<'_>) {
        match node {
            Node::MeshExtension(extension) => self.mesh.extensions.push(extension),
            Node::Unknown(tokens) => self.mesh.extensions.push(MeshExtension::Unknown(tokens)),
            _ => {}
        }
    }

    fn end(self: Box<Self>, _ctx: &mut DecodeContext<'_>) -> Option<Node> {
        Some(Node::Mesh(self.mesh))
    }
}

#[derive(Default)]
struct ComponentsDecoder {
    components: Components,
}

impl ElementDecoder for ComponentsDecoder {
    fn segment(&self) -> Option<PathSegment> {
        Some(PathSegment::new("Components"))
    }

    fn start(&mut self, start: &StartElement, ctx: &mut DecodeContext<'_>) {
        let components = &mut self.components;
        for attr in &start.attrs {
            decode_foreign_attr(
                ctx,
                AttrOwner::Components,
                attr,
                &mut components.ext_attrs,
                &mut components.any_attr,
            );
        }
    }

    fn child(&mut self, name: &XmlName, _ctx: &mut DecodeContext<'_>) -> Child {
        if is_core(name, "component") {
            Child::Inline
        } else {
            Child::Unknown
        }
    }

    fn inline_start(&mut self, start: &StartElement, ctx: &mut DecodeContext<'_>) {
        ctx.push_segment(PathSegment::indexed("Component", self.components.components.len()));
        let mut component = Component::default();
        for attr in &start.attrs {
            if !attr.name.space.is_empty() {
                decode_foreign_attr(
                    ctx,
                    AttrOwner::Component,
                    attr,
                    &mut component.ext_attrs,
                    &mut component.any_attr,
                );
                continue;
            }
            match attr.name.local.as_str() {
                "objectid" => component.object_id = ctx.parse_attr(attr, true).unwrap_or_default(),
                "transform" => component.transform = ctx.parse_attr::<Matrix>(attr, false),
                _ => keep_unknown_attr(attr, &mut component.any_attr),
            }
        }
        ctx.pop_segment();
        self.components.components.push(component);
    }

    fn attach(&mut self, node: Node, _ctx: &mut DecodeContext<'_>) {
        if let Node::Unknown(tokens) = node {
            self.components.any.push(tokens);
        }
    }

    fn end(self: Box<Self>, _ctx: &mut DecodeContext<'_>) -> Option<Node> {
        Some(Node::Components(self.components))
    }
}

#[derive(Default)]
struct BuildDecoder {
    build: Build,
}

impl ElementDecoder for BuildDecoder {
    fn segment(&self) -> Option<PathSegment> {
        Some(PathSegment::new("Build"))
    }

    fn start(&mut self, start: &StartElement, ctx: &mut DecodeContext<'_>) {
        let build = &mut self.build;
        for attr in &start.attrs {
            decode_foreign_attr(ctx, AttrOwner::Build, attr, &mut build.ext_attrs, &mut build.any_attr);
        }
    }

    fn child(&mut self, name: &XmlName, _ctx: &mut DecodeContext<'_>) -> Child {
        if is_core(name, "item") {
            Child::Decoder(Box::new(ItemDecoder::new(self.build.items.len())))
        } else {
            Child::Unknown
        }
    }

    fn attach(&mut self, node: Node, _ctx: &mut DecodeContext<'_>) {
        match node {
            Node::Item(item) => self.build.items.push(item),
            Node::Unknown(tokens) => self.build.any.push(tokens),
            _ => {}
        }
    }

    fn end(self: Box<Self>, _ctx: &mut DecodeContext<'_>) -> Option<Node> {
        Some(Node::Build(self.build))
    }
}

struct ItemDecoder {
    index: usize,
    item: Item,
    group: MetadataGroup,
}

impl ItemDecoder {
    fn new(index: usize) -> Self {
        Self {
            index,
            item: Item::default(),
            group: MetadataGroup::default(),
        }
    }
}

impl ElementDecoder for ItemDecoder {
    fn segment(&self) -> Option<PathSegment> {
        Some(PathSegment::indexed("Item", self.index))
    }

    fn start(&mut self, start: &StartElement, ctx: &mut DecodeContext<'_>) {
        let item = &mut self.item;
        for attr in &start.attrs {
            if !attr.name.space.is_empty() {
                decode_foreign_attr(ctx, AttrOwner::Item, attr, &mut item.ext_attrs, &mut item.any_attr);
                continue;
            }
            match attr.name.local.as_str() {
                "objectid" => item.object_id = ctx.parse_attr(attr, true).unwrap_or_default(),
                "transform" => item.transform = ctx.parse_attr::<Matrix>(attr, false),
                "partnumber" => item.part_number = Some(attr.value.clone()),
                _ => keep_unknown_attr(attr, &mut item.any_attr),
            }
        }
    }

    fn child(&mut self, name: &XmlName, _ctx: &mut DecodeContext<'_>) -> Child {
        self.group
            .child(name, &self.item.metadata)
            .unwrap_or(Child::Unknown)
    }

    fn inline_start(&mut self, _start: &StartElement, _ctx: &mut DecodeContext<'_>) {
        self.group.open = true;
    }

    fn inline_end(&mut self, _name: &XmlName, _ctx: &mut DecodeContext<'_>) {
        self.group.open = false;
    }

    fn attach(&mut self, node: Node, _ctx: &mut DecodeContext<'_>) {
        match node {
            Node::Metadata(metadata) => self.item.metadata.push(metadata),
            Node::Unknown(tokens) => self.item.any.push(tokens),
            _ => {}
        }
    }

    fn end(self: Box<Self>, _ctx: &mut DecodeContext<'_>) -> Option<Node> {
        Some(Node::Item(self.item))
    }
}

#[cfg(test)]
mod tests {
    use crate::model::ParserConfig;
    use crate::parser::{parse_model_xml, parse_model_xml_with_config};

    const HEAD: &str =
        r#"<model xmlns="http://schemas.microsoft.com/3dmanufacturing/core/2015/02" xmlns:x="urn:x">"#;

    #[test]
    fn test_object_metadata_group() {
        let xml = format!(
            r#"{}<resources><object id="3">
              <metadatagroup><metadata name="x:Color" preserve="1">red</metadata></metadatagroup>
              <components><component objectid="1"/><component objectid="2" transform="2 0 0 0 2 0 0 0 2 0 0 0"/></components>
            </object></resources><build/></model>"#,
            HEAD
        );
        let model = parse_model_xml(&xml).unwrap();
        let object = &model.resources.objects[0];
        assert_eq!(object.metadata.len(), 1);
        assert_eq!(object.metadata[0].name.space, "urn:x");
        assert_eq!(object.metadata[0].name.local, "Color");
        assert!(object.metadata[0].preserve);
        let components = object.components.as_ref().unwrap();
        assert_eq!(components.components.len(), 2);
        assert!(components.components[0].transform.is_none());
        assert_eq!(components.components[1].transform.unwrap().at(1, 1), 2.0);
    }

    #[test]
    fn test_component_parse_error_path() {
        let xml = format!(
            r#"{}<resources><object id="3"><components>
              <component objectid="1"/><component objectid="-2"/>
            </components></object></resources><build/></model>"#,
            HEAD
        );
        let outcome = parse_model_xml_with_config(&xml, &ParserConfig::new().strict(false)).unwrap();
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(
            outcome.warnings[0].path.to_string(),
            "/3D/3dmodel.model@Resources@Object#0@Components@Component#1"
        );
    }

    #[test]
    fn test_unknown_attributes_are_kept() {
        let xml = format!(
            r#"{}<resources><object id="1" x:flag="on"><mesh x:m="2"><vertices/><triangles/></mesh></object></resources>
            <build x:b="1"><item objectid="1" x:i="3"/></build></model>"#,
            HEAD
        );
        let model = parse_model_xml(&xml).unwrap();
        let object = &model.resources.objects[0];
        assert_eq!(object.any_attr[0].value, "on");
        assert_eq!(object.mesh.as_ref().unwrap().any_attr.len(), 1);
        assert_eq!(model.build.any_attr.len(), 1);
        assert_eq!(model.build.items[0].any_attr[0].name.space, "urn:x");
    }

    #[test]
    fn test_invalid_unit_is_reported() {
        let xml = format!(r#"{}<resources/><build/></model>"#, HEAD.replace('>', r#" unit="parsec">"#));
        let outcome = parse_model_xml_with_config(&xml, &ParserConfig::new().strict(false)).unwrap();
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(outcome.model.units.as_str(), "millimeter");
    }
}
