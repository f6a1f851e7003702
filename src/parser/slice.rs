//! Slice extension decoding
//!
//! A `<s:slicestack>` holds either `<s:slice>` children or `<s:sliceref>`
//! children. The stack decoder tracks which kind it has accepted first and
//! reports [`DiagnosticKind::SlicesAndRefs`] for any sibling of the other kind,
//! which is then dropped.

use crate::codec::{Child, DecodeContext, ElementDecoder, Node, StartElement, XmlAttr, XmlName};
use crate::diagnostic::{DiagnosticKind, PathSegment};
use crate::extension::{AttrOwner, Extension};
use crate::geometry::Point2D;
use crate::model::{
    Asset, ExtensionAttrs, MeshResolution, Polygon, Segment, Slice, SliceRef, SliceStack,
    SliceStackInfo,
};

use super::keep_unknown_attr;

fn is_slice(name: &XmlName, local: &str) -> bool {
    name.is(Extension::Slice.namespace(), local)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StackContent {
    Empty,
    Slices,
    Refs,
}

/// Decoder for `<s:slicestack>`
pub(crate) struct SliceStackDecoder {
    index: usize,
    stack: SliceStack,
    content: StackContent,
    rejected: bool,
}

impl SliceStackDecoder {
    pub(crate) fn new(index: usize) -> Self {
        Self {
            index,
            stack: SliceStack::default(),
            content: StackContent::Empty,
            rejected: false,
        }
    }

    /// Move to `content`, reporting a mixed stack
    fn accept(&mut self, content: StackContent, ctx: &mut DecodeContext<'_>) -> bool {
        match self.content {
            StackContent::Empty => {
                self.content = content;
                true
            }
            current if current == content => true,
            _ => {
                ctx.report(DiagnosticKind::SlicesAndRefs);
                self.rejected = true;
                false
            }
        }
    }

    fn slice_ref(&mut self, start: &StartElement, ctx: &mut DecodeContext<'_>) {
        ctx.push_segment(PathSegment::indexed("SliceRef", self.stack.refs.len()));
        let mut slice_ref = SliceRef::default();
        for attr in start.attrs.iter().filter(|a| a.name.space.is_empty()) {
            match attr.name.local.as_str() {
                "slicestackid" => slice_ref.slice_stack_id = ctx.parse_attr(attr, true).unwrap_or_default(),
                "slicepath" => slice_ref.path = attr.value.clone(),
                _ => {}
            }
        }
        ctx.pop_segment();
        self.stack.refs.push(slice_ref);
    }
}

impl ElementDecoder for SliceStackDecoder {
    fn segment(&self) -> Option<PathSegment> {
        Some(PathSegment::indexed("SliceStack", self.index))
    }

    fn start(&mut self, start: &StartElement, ctx: &mut DecodeContext<'_>) {
        for attr in &start.attrs {
            if !attr.name.space.is_empty() {
                keep_unknown_attr(attr, &mut self.stack.any_attr);
                continue;
            }
            match attr.name.local.as_str() {
                "id" => self.stack.id = ctx.parse_attr(attr, true).unwrap_or_default(),
                "zbottom" => self.stack.bottom_z = ctx.parse_attr(attr, false).unwrap_or_default(),
                _ => keep_unknown_attr(attr, &mut self.stack.any_attr),
            }
        }
    }

    fn child(&mut self, name: &XmlName, ctx: &mut DecodeContext<'_>) -> Child {
        if is_slice(name, "slice") && self.accept(StackContent::Slices, ctx) {
            return Child::Decoder(Box::new(SliceDecoder::new(self.stack.slices.len())));
        }
        if is_slice(name, "sliceref") && self.accept(StackContent::Refs, ctx) {
            return Child::Inline;
        }
        Child::Unknown
    }

    fn inline_start(&mut self, start: &StartElement, ctx: &mut DecodeContext<'_>) {
        self.slice_ref(start, ctx);
    }

    fn attach(&mut self, node: Node, _ctx: &mut DecodeContext<'_>) {
        match node {
            Node::Extension(any) => {
                if let Ok(slice) = any.downcast::<Slice>() {
                    self.stack.slices.push(*slice);
                }
            }
            // the child refused by `accept` comes back recorded; it is not kept
            Node::Unknown(_) if self.rejected => self.rejected = false,
            Node::Unknown(tokens) => self.stack.any.push(tokens),
            _ => {}
        }
    }

    fn end(self: Box<Self>, _ctx: &mut DecodeContext<'_>) -> Option<Node> {
        Some(Node::Asset(Asset::SliceStack(self.stack)))
    }
}

/// Decoder for one `<s:slice>`; vertices, polygons and segments are inline
struct SliceDecoder {
    index: usize,
    slice: Slice,
    polygon: Option<Polygon>,
}

impl SliceDecoder {
    fn new(index: usize) -> Self {
        Self {
            index,
            slice: Slice::default(),
            polygon: None,
        }
    }

    fn vertex(&mut self, start: &StartElement, ctx: &mut DecodeContext<'_>) {
        ctx.push_segment(PathSegment::indexed("Vertex", self.slice.vertices.len()));
        let mut vertex = Point2D::default();
        for attr in start.attrs.iter().filter(|a| a.name.space.is_empty()) {
            match attr.name.local.as_str() {
                "x" => vertex.x = ctx.parse_attr(attr, true).unwrap_or_default(),
                "y" => vertex.y = ctx.parse_attr(attr, true).unwrap_or_default(),
                _ => {}
            }
        }
        ctx.pop_segment();
        self.slice.vertices.push(vertex);
    }

    fn open_polygon(&mut self, start: &StartElement, ctx: &mut DecodeContext<'_>) {
        ctx.push_segment(PathSegment::indexed("Polygon", self.slice.polygons.len()));
        let mut polygon = Polygon::default();
        if let Some(attr) = start.attrs.iter().find(|a| a.name.is("", "startv")) {
            polygon.start_v = ctx.parse_attr(attr, true).unwrap_or_default();
        }
        self.polygon = Some(polygon);
    }

    fn add_segment(&mut self, start: &StartElement, ctx: &mut DecodeContext<'_>) {
        let Some(polygon) = self.polygon.as_mut() else {
            return;
        };
        ctx.push_segment(PathSegment::indexed("Segment", polygon.segments.len()));
        let mut segment = Segment::default();
        for attr in start.attrs.iter().filter(|a| a.name.space.is_empty()) {
            match attr.name.local.as_str() {
                "v2" => segment.v2 = ctx.parse_attr(attr, true).unwrap_or_default(),
                "p1" => segment.p1 = ctx.parse_attr(attr, false),
                "p2" => segment.p2 = ctx.parse_attr(attr, false),
                "pid" => segment.pid = ctx.parse_attr(attr, false),
                _ => {}
            }
        }
        ctx.pop_segment();
        polygon.segments.push(segment);
    }
}

impl ElementDecoder for SliceDecoder {
    fn segment(&self) -> Option<PathSegment> {
        Some(PathSegment::indexed("Slice", self.index))
    }

    fn start(&mut self, start: &StartElement, ctx: &mut DecodeContext<'_>) {
        if let Some(attr) = start.attrs.iter().find(|a| a.name.is("", "ztop")) {
            self.slice.top_z = ctx.parse_attr(attr, true).unwrap_or_default();
        }
    }

    fn child(&mut self, name: &XmlName, _ctx: &mut DecodeContext<'_>) -> Child {
        if name.space != Extension::Slice.namespace() {
            return Child::Unknown;
        }
        match name.local.as_str() {
            "vertices" | "vertex" | "polygon" | "segment" => Child::Inline,
            _ => Child::Unknown,
        }
    }

    fn inline_start(&mut self, start: &StartElement, ctx: &mut DecodeContext<'_>) {
        match start.name.local.as_str() {
            "vertex" => self.vertex(start, ctx),
            "polygon" => self.open_polygon(start, ctx),
            "segment" => self.add_segment(start, ctx),
            _ => {}
        }
    }

    fn inline_end(&mut self, name: &XmlName, ctx: &mut DecodeContext<'_>) {
        if name.local == "polygon" {
            if let Some(polygon) = self.polygon.take() {
                self.slice.polygons.push(polygon);
            }
            ctx.pop_segment();
        }
    }

    fn attach(&mut self, node: Node, _ctx: &mut DecodeContext<'_>) {
        if let Node::Unknown(tokens) = node {
            self.slice.any.push(tokens);
        }
    }

    fn end(self: Box<Self>, _ctx: &mut DecodeContext<'_>) -> Option<Node> {
        Some(Node::Extension(Box::new(self.slice)))
    }
}

/// Decode `s:slicestackid` and `s:meshresolution` on an object
pub(crate) fn decode_slice_attribute(
    owner: AttrOwner,
    attrs: &mut ExtensionAttrs,
    attr: &XmlAttr,
) -> Result<(), DiagnosticKind> {
    if owner != AttrOwner::Object {
        attrs.push_other(attr.clone());
        return Ok(());
    }
    match attr.name.local.as_str() {
        "slicestackid" => {
            let id = attr
                .value
                .trim()
                .parse::<u32>()
                .map_err(|_| DiagnosticKind::parse_attr("slicestackid", true))?;
            attrs.update::<SliceStackInfo>(|info| info.slice_stack_id = id);
        }
        "meshresolution" => {
            let resolution = attr
                .value
                .trim()
                .parse::<MeshResolution>()
                .map_err(|_| DiagnosticKind::parse_attr("meshresolution", false))?;
            attrs.update::<SliceStackInfo>(|info| info.mesh_resolution = resolution);
        }
        _ => {}
    }
    Ok(())
}
