//! Beam Lattice extension decoding
//!
//! `<b:beamlattice>` lives inside `<mesh>`; its `beams`, `beam`, `beamsets`,
//! `beamset` and `ref` children are all handled inline by one decoder.

use crate::codec::{Child, DecodeContext, ElementDecoder, Node, StartElement, XmlName};
use crate::diagnostic::PathSegment;
use crate::extension::Extension;
use crate::model::{Beam, BeamLattice, BeamSet, CapMode, ClipMode, MeshExtension};

use super::keep_unknown_attr;

/// Decoder for `<b:beamlattice>`
#[derive(Default)]
pub(crate) struct BeamLatticeDecoder {
    lattice: BeamLattice,
    beam_set: Option<BeamSet>,
}

impl BeamLatticeDecoder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn beam(&mut self, start: &StartElement, ctx: &mut DecodeContext<'_>) {
        ctx.push_segment(PathSegment::indexed("Beam", self.lattice.beams.len()));
        let mut beam = Beam::default();
        for attr in start.attrs.iter().filter(|a| a.name.space.is_empty()) {
            match attr.name.local.as_str() {
                "v1" => beam.v1 = ctx.parse_attr(attr, true).unwrap_or_default(),
                "v2" => beam.v2 = ctx.parse_attr(attr, true).unwrap_or_default(),
                "r1" => beam.r1 = ctx.parse_attr(attr, false).unwrap_or_default(),
                "r2" => beam.r2 = ctx.parse_attr(attr, false).unwrap_or_default(),
                "cap1" => beam.cap1 = ctx.parse_attr::<CapMode>(attr, false),
                "cap2" => beam.cap2 = ctx.parse_attr::<CapMode>(attr, false),
                "pid" => beam.pid = ctx.parse_attr(attr, false),
                "p1" => beam.p1 = ctx.parse_attr(attr, false),
                "p2" => beam.p2 = ctx.parse_attr(attr, false),
                _ => {}
            }
        }
        ctx.pop_segment();
        self.lattice.beams.push(beam);
    }

    fn open_beam_set(&mut self, start: &StartElement, ctx: &mut DecodeContext<'_>) {
        ctx.push_segment(PathSegment::indexed("BeamSet", self.lattice.beam_sets.len()));
        let mut set = BeamSet::default();
        for attr in start.attrs.iter().filter(|a| a.name.space.is_empty()) {
            match attr.name.local.as_str() {
                "name" => set.name = Some(attr.value.clone()),
                "identifier" => set.identifier = Some(attr.value.clone()),
                _ => {}
            }
        }
        self.beam_set = Some(set);
    }

    fn beam_ref(&mut self, start: &StartElement, ctx: &mut DecodeContext<'_>) {
        let Some(set) = self.beam_set.as_mut() else {
            return;
        };
        if let Some(attr) = start.attrs.iter().find(|a| a.name.is("", "index")) {
            let index = ctx.parse_attr(attr, true).unwrap_or_default();
            set.refs.push(index);
        }
    }
}

impl ElementDecoder for BeamLatticeDecoder {
    fn segment(&self) -> Option<PathSegment> {
        Some(PathSegment::new("BeamLattice"))
    }

    fn start(&mut self, start: &StartElement, ctx: &mut DecodeContext<'_>) {
        let lattice = &mut self.lattice;
        for attr in &start.attrs {
            if !attr.name.space.is_empty() {
                keep_unknown_attr(attr, &mut lattice.any_attr);
                continue;
            }
            match attr.name.local.as_str() {
                "radius" => lattice.radius = ctx.parse_attr(attr, true).unwrap_or_default(),
                "minlength" => lattice.min_length = ctx.parse_attr(attr, true).unwrap_or_default(),
                "cap" => lattice.cap_mode = ctx.parse_attr::<CapMode>(attr, false).unwrap_or_default(),
                "clippingmode" | "clipping" => {
                    lattice.clip_mode = ctx.parse_attr::<ClipMode>(attr, false).unwrap_or_default()
                }
                "clippingmesh" => lattice.clipping_mesh = ctx.parse_attr(attr, false),
                "representationmesh" => lattice.representation_mesh = ctx.parse_attr(attr, false),
                "pid" => lattice.pid = ctx.parse_attr(attr, false),
                "pindex" => lattice.pindex = ctx.parse_attr(attr, false),
                _ => keep_unknown_attr(attr, &mut lattice.any_attr),
            }
        }
    }

    fn child(&mut self, name: &XmlName, _ctx: &mut DecodeContext<'_>) -> Child {
        if name.space != Extension::BeamLattice.namespace() {
            return Child::Unknown;
        }
        match name.local.as_str() {
            "beams" | "beam" | "beamsets" | "beamset" | "ref" => Child::Inline,
            _ => Child::Unknown,
        }
    }

    fn inline_start(&mut self, start: &StartElement, ctx: &mut DecodeContext<'_>) {
        match start.name.local.as_str() {
            "beam" => self.beam(start, ctx),
            "beamset" => self.open_beam_set(start, ctx),
            "ref" => self.beam_ref(start, ctx),
            _ => {}
        }
    }

    fn inline_end(&mut self, name: &XmlName, ctx: &mut DecodeContext<'_>) {
        if name.local == "beamset" {
            if let Some(set) = self.beam_set.take() {
                self.lattice.beam_sets.push(set);
            }
            ctx.pop_segment();
        }
    }

    fn attach(&mut self, node: Node, _ctx: &mut DecodeContext<'_>) {
        if let Node::Unknown(tokens) = node {
            self.lattice.any.push(tokens);
        }
    }

    fn end(self: Box<Self>, _ctx: &mut DecodeContext<'_>) -> Option<Node> {
        Some(Node::MeshExtension(MeshExtension::BeamLattice(self.lattice)))
    }
}
