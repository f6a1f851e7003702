//! Base material group decoding

use crate::codec::{CORE_NAMESPACE, Child, DecodeContext, ElementDecoder, Node, StartElement, XmlName};
use crate::diagnostic::{DiagnosticKind, PathSegment};
use crate::model::{Asset, Base, BaseMaterials, Rgba};

/// Decoder for `<basematerials>` and its `<base>` children
pub(crate) struct BaseMaterialsDecoder {
    index: usize,
    group: BaseMaterials,
}

impl BaseMaterialsDecoder {
    pub(crate) fn new(index: usize) -> Self {
        Self {
            index,
            group: BaseMaterials::default(),
        }
    }
}

impl ElementDecoder for BaseMaterialsDecoder {
    fn segment(&self) -> Option<PathSegment> {
        Some(PathSegment::indexed("BaseMaterials", self.index))
    }

    fn start(&mut self, start: &StartElement, ctx: &mut DecodeContext<'_>) {
        if let Some(attr) = start.attrs.iter().find(|a| a.name.is("", "id")) {
            self.group.id = ctx.parse_attr(attr, true).unwrap_or_default();
        }
    }

    fn child(&mut self, name: &XmlName, _ctx: &mut DecodeContext<'_>) -> Child {
        if name.is(CORE_NAMESPACE, "base") {
            Child::Inline
        } else {
            Child::Unknown
        }
    }

    fn inline_start(&mut self, start: &StartElement, ctx: &mut DecodeContext<'_>) {
        let index = self.group.bases.len();
        let mut base = Base::default();
        for attr in start.attrs.iter().filter(|a| a.name.space.is_empty()) {
            match attr.name.local.as_str() {
                "name" => base.name = attr.value.clone(),
                "displaycolor" => match attr.value.trim().parse::<Rgba>() {
                    Ok(color) => base.color = color,
                    Err(_) => ctx.report_at(PathSegment::indexed("Base", index), DiagnosticKind::InvalidColor),
                },
                _ => {}
            }
        }
        self.group.bases.push(base);
    }

    fn end(self: Box<Self>, _ctx: &mut DecodeContext<'_>) -> Option<Node> {
        Some(Node::Asset(Asset::BaseMaterials(self.group)))
    }
}
