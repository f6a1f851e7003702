//! Slice extension types

use crate::codec::{UnknownTokens, XmlAttr};
use crate::error::Error;
use crate::geometry::Point2D;

/// A segment in a slice polygon
///
/// The segment starts at the previous segment's `v2` (or the polygon's start
/// vertex) and ends at `v2`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Segment {
    /// End vertex index
    pub v2: u32,
    /// Property group id
    pub pid: Option<u32>,
    /// Property index at the start vertex
    pub p1: Option<u32>,
    /// Property index at the end vertex
    pub p2: Option<u32>,
}

impl Segment {
    /// Create a segment ending at `v2`
    pub fn new(v2: u32) -> Self {
        Self {
            v2,
            ..Default::default()
        }
    }
}

/// A polygon in a slice
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polygon {
    /// Starting vertex index
    pub start_v: u32,
    /// Ordered segments
    pub segments: Vec<Segment>,
}

impl Polygon {
    /// Create a new polygon starting at `start_v`
    pub fn new(start_v: u32) -> Self {
        Self {
            start_v,
            segments: Vec::new(),
        }
    }

    /// A polygon is closed when its last segment returns to the start vertex
    pub fn is_closed(&self) -> bool {
        self.segments
            .last()
            .is_some_and(|segment| segment.v2 == self.start_v)
    }
}

/// A single slice at a specific Z height
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Slice {
    /// Z coordinate of the top of this slice
    pub top_z: f32,
    /// 2D vertices of this slice
    pub vertices: Vec<Point2D>,
    /// Polygons of this slice
    pub polygons: Vec<Polygon>,
    /// Child elements from unknown namespaces
    pub any: Vec<UnknownTokens>,
}

impl Slice {
    /// Create an empty slice
    pub fn new(top_z: f32) -> Self {
        Self {
            top_z,
            ..Default::default()
        }
    }
}

/// Reference to a slice stack in another model part
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SliceRef {
    /// Id of the referenced slice stack
    pub slice_stack_id: u32,
    /// Part path holding the referenced slice stack
    pub path: String,
}

/// A stack of slices, or references to stacks in other parts
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SliceStack {
    /// Resource id
    pub id: u32,
    /// Z coordinate of the bottom of the stack
    pub bottom_z: f32,
    /// Slices, bottom to top
    pub slices: Vec<Slice>,
    /// External slice stack references
    pub refs: Vec<SliceRef>,
    /// Attributes from unknown namespaces
    pub any_attr: Vec<XmlAttr>,
    /// Child elements from unknown namespaces
    pub any: Vec<UnknownTokens>,
}

impl SliceStack {
    /// Create an empty stack
    pub fn new(id: u32, bottom_z: f32) -> Self {
        Self {
            id,
            bottom_z,
            ..Default::default()
        }
    }
}

/// Resolution of the mesh that accompanies a sliced object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MeshResolution {
    /// The mesh is a full resolution representation
    #[default]
    Full,
    /// The mesh is a low resolution preview
    Low,
}

impl MeshResolution {
    /// XML value
    pub fn as_str(&self) -> &'static str {
        match self {
            MeshResolution::Full => "fullres",
            MeshResolution::Low => "lowres",
        }
    }
}

impl std::str::FromStr for MeshResolution {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fullres" => Ok(MeshResolution::Full),
            "lowres" => Ok(MeshResolution::Low),
            _ => Err(Error::InvalidFormat(format!(
                "Invalid mesh resolution '{}'. Must be 'fullres' or 'lowres'",
                s
            ))),
        }
    }
}

/// Slice attributes attached to an object
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SliceStackInfo {
    /// Id of the slice stack describing the object
    pub slice_stack_id: u32,
    /// Resolution of the object's mesh
    pub mesh_resolution: MeshResolution,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polygon_closed() {
        let mut polygon = Polygon::new(0);
        assert!(!polygon.is_closed());
        polygon.segments.push(Segment::new(1));
        polygon.segments.push(Segment::new(2));
        assert!(!polygon.is_closed());
        polygon.segments.push(Segment::new(0));
        assert!(polygon.is_closed());
    }

    #[test]
    fn test_mesh_resolution_values() {
        assert_eq!("lowres".parse::<MeshResolution>().unwrap(), MeshResolution::Low);
        assert_eq!(MeshResolution::default().as_str(), "fullres");
        assert!("medium".parse::<MeshResolution>().is_err());
    }
}
