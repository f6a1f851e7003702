//! Slice extension writing

use crate::codec::{XmlAttr, XmlEncoder, XmlName};
use crate::error::Result;
use crate::extension::Extension;
use crate::model::{MeshResolution, Slice, SliceStack, SliceStackInfo};

fn name(local: &str) -> XmlName {
    XmlName::new(Extension::Slice.namespace(), local)
}

/// Append `s:slicestackid` and, for low resolution meshes, `s:meshresolution`
pub(crate) fn slice_stack_info_attrs(info: &SliceStackInfo, out: &mut Vec<XmlAttr>) {
    let ns = Extension::Slice.namespace();
    out.push(XmlAttr::namespaced(ns, "slicestackid", info.slice_stack_id.to_string()));
    if info.mesh_resolution != MeshResolution::Full {
        out.push(XmlAttr::namespaced(ns, "meshresolution", info.mesh_resolution.as_str()));
    }
}

/// Write a `<s:slicestack>` resource
pub(crate) fn write_slice_stack(enc: &mut XmlEncoder<'_>, stack: &SliceStack) -> Result<()> {
    let mut attrs = vec![XmlAttr::new("id", stack.id.to_string())];
    if stack.bottom_z != 0.0 {
        attrs.push(XmlAttr::new("zbottom", enc.format_f32(stack.bottom_z)));
    }
    attrs.extend(stack.any_attr.iter().cloned());
    enc.write_start(&name("slicestack"), &attrs)?;

    for slice in &stack.slices {
        write_slice(enc, slice)?;
    }
    let ref_name = name("sliceref");
    for slice_ref in &stack.refs {
        let attrs = [
            XmlAttr::new("slicestackid", slice_ref.slice_stack_id.to_string()),
            XmlAttr::new("slicepath", slice_ref.path.as_str()),
        ];
        enc.write_element(&ref_name, &attrs)?;
    }
    for tokens in &stack.any {
        enc.write_tokens(tokens)?;
    }
    enc.write_end()
}

fn write_slice(enc: &mut XmlEncoder<'_>, slice: &Slice) -> Result<()> {
    let top_z = enc.format_f32(slice.top_z);
    enc.write_start(&name("slice"), &[XmlAttr::new("ztop", top_z)])?;

    enc.write_start(&name("vertices"), &[])?;
    let vertex = name("vertex");
    enc.set_auto_close(true);
    for v in &slice.vertices {
        let attrs = [
            XmlAttr::new("x", enc.format_f32(v.x)),
            XmlAttr::new("y", enc.format_f32(v.y)),
        ];
        enc.write_start(&vertex, &attrs)?;
    }
    enc.set_auto_close(false);
    enc.write_end()?;

    let segment = name("segment");
    for polygon in &slice.polygons {
        enc.write_start(&name("polygon"), &[XmlAttr::new("startv", polygon.start_v.to_string())])?;
        enc.set_auto_close(true);
        for s in &polygon.segments {
            let mut attrs = vec![XmlAttr::new("v2", s.v2.to_string())];
            for (key, value) in [("p1", s.p1), ("p2", s.p2), ("pid", s.pid)] {
                if let Some(value) = value {
                    attrs.push(XmlAttr::new(key, value.to_string()));
                }
            }
            enc.write_start(&segment, &attrs)?;
        }
        enc.set_auto_close(false);
        enc.write_end()?;
    }
    for tokens in &slice.any {
        enc.write_tokens(tokens)?;
    }
    enc.write_end()
}
