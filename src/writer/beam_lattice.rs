//! Beam Lattice extension writing
//!
//! Attributes of lattice elements are unqualified; only the element names
//! carry the beam lattice namespace.

use crate::codec::{XmlAttr, XmlEncoder, XmlName};
use crate::error::Result;
use crate::extension::Extension;
use crate::model::{BeamLattice, CapMode, ClipMode};

fn name(local: &str) -> XmlName {
    XmlName::new(Extension::BeamLattice.namespace(), local)
}

/// Write a `<b:beamlattice>` element
pub(crate) fn write_beam_lattice(enc: &mut XmlEncoder<'_>, lattice: &BeamLattice) -> Result<()> {
    let mut attrs = vec![
        XmlAttr::new("radius", enc.format_f64(lattice.radius)),
        XmlAttr::new("minlength", enc.format_f64(lattice.min_length)),
    ];
    if lattice.cap_mode != CapMode::Sphere {
        attrs.push(XmlAttr::new("cap", lattice.cap_mode.as_str()));
    }
    if lattice.clip_mode != ClipMode::None {
        attrs.push(XmlAttr::new("clippingmode", lattice.clip_mode.as_str()));
    }
    for (key, value) in [
        ("clippingmesh", lattice.clipping_mesh),
        ("representationmesh", lattice.representation_mesh),
        ("pid", lattice.pid),
        ("pindex", lattice.pindex),
    ] {
        if let Some(value) = value {
            attrs.push(XmlAttr::new(key, value.to_string()));
        }
    }
    attrs.extend(lattice.any_attr.iter().cloned());
    enc.write_start(&name("beamlattice"), &attrs)?;

    enc.write_start(&name("beams"), &[])?;
    let beam_name = name("beam");
    let mut attrs = Vec::with_capacity(9);
    enc.set_auto_close(true);
    for beam in &lattice.beams {
        attrs.clear();
        attrs.push(XmlAttr::new("v1", beam.v1.to_string()));
        attrs.push(XmlAttr::new("v2", beam.v2.to_string()));
        if beam.r1 != 0.0 {
            attrs.push(XmlAttr::new("r1", enc.format_f64(beam.r1)));
        }
        if beam.r2 != 0.0 {
            attrs.push(XmlAttr::new("r2", enc.format_f64(beam.r2)));
        }
        for (key, value) in [("p1", beam.p1), ("p2", beam.p2), ("pid", beam.pid)] {
            if let Some(value) = value {
                attrs.push(XmlAttr::new(key, value.to_string()));
            }
        }
        if let Some(cap) = beam.cap1 {
            attrs.push(XmlAttr::new("cap1", cap.as_str()));
        }
        if let Some(cap) = beam.cap2 {
            attrs.push(XmlAttr::new("cap2", cap.as_str()));
        }
        enc.write_start(&beam_name, &attrs)?;
    }
    enc.set_auto_close(false);
    enc.write_end()?;

    if !lattice.beam_sets.is_empty() {
        enc.write_start(&name("beamsets"), &[])?;
        let ref_name = name("ref");
        for set in &lattice.beam_sets {
            let mut attrs = Vec::new();
            if let Some(set_name) = &set.name {
                attrs.push(XmlAttr::new("name", set_name.as_str()));
            }
            if let Some(identifier) = &set.identifier {
                attrs.push(XmlAttr::new("identifier", identifier.as_str()));
            }
            enc.write_start(&name("beamset"), &attrs)?;
            for index in &set.refs {
                enc.write_element(&ref_name, &[XmlAttr::new("index", index.to_string())])?;
            }
            enc.write_end()?;
        }
        enc.write_end()?;
    }
    for tokens in &lattice.any {
        enc.write_tokens(tokens)?;
    }
    enc.write_end()
}
