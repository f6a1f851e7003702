//! Beam Lattice extension types

use crate::codec::{UnknownTokens, XmlAttr};
use crate::error::Error;

/// Cap mode for beam ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CapMode {
    /// Sphere cap (rounded ends)
    #[default]
    Sphere,
    /// Hemisphere cap (half sphere at end)
    Hemisphere,
    /// Butt cap (flat ends)
    Butt,
}

impl CapMode {
    /// XML value
    pub fn as_str(&self) -> &'static str {
        match self {
            CapMode::Sphere => "sphere",
            CapMode::Hemisphere => "hemisphere",
            CapMode::Butt => "butt",
        }
    }
}

impl std::fmt::Display for CapMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CapMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sphere" => Ok(CapMode::Sphere),
            "hemisphere" => Ok(CapMode::Hemisphere),
            "butt" => Ok(CapMode::Butt),
            _ => Err(Error::InvalidFormat(format!(
                "Invalid cap mode '{}'. Must be 'sphere', 'hemisphere', or 'butt'",
                s
            ))),
        }
    }
}

/// How the clipping mesh trims the lattice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClipMode {
    /// No clipping
    #[default]
    None,
    /// Keep the part of the lattice inside the clipping mesh
    Inside,
    /// Keep the part of the lattice outside the clipping mesh
    Outside,
}

impl ClipMode {
    /// XML value
    pub fn as_str(&self) -> &'static str {
        match self {
            ClipMode::None => "none",
            ClipMode::Inside => "inside",
            ClipMode::Outside => "outside",
        }
    }
}

impl std::str::FromStr for ClipMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(ClipMode::None),
            "inside" => Ok(ClipMode::Inside),
            "outside" => Ok(ClipMode::Outside),
            _ => Err(Error::InvalidFormat(format!(
                "Invalid clipping mode '{}'. Must be 'none', 'inside', or 'outside'",
                s
            ))),
        }
    }
}

/// A single beam between two mesh vertices
///
/// A radius of zero means "inherit the lattice default".
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Beam {
    /// Index of first vertex
    pub v1: u32,
    /// Index of second vertex
    pub v2: u32,
    /// Radius at first vertex
    pub r1: f64,
    /// Radius at second vertex
    pub r2: f64,
    /// Cap mode at first vertex, lattice default when absent
    pub cap1: Option<CapMode>,
    /// Cap mode at second vertex, lattice default when absent
    pub cap2: Option<CapMode>,
    /// Property group id
    pub pid: Option<u32>,
    /// Property index at first vertex
    pub p1: Option<u32>,
    /// Property index at second vertex
    pub p2: Option<u32>,
}

impl Beam {
    /// Create a new beam between two vertices using the default radius
    pub fn new(v1: u32, v2: u32) -> Self {
        Self {
            v1,
            v2,
            ..Default::default()
        }
    }

    /// Create a beam with explicit radii
    pub fn with_radii(v1: u32, v2: u32, r1: f64, r2: f64) -> Self {
        Self {
            v1,
            v2,
            r1,
            r2,
            ..Default::default()
        }
    }
}

/// A named group of beams
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BeamSet {
    /// Human-readable name
    pub name: Option<String>,
    /// Unique identifier
    pub identifier: Option<String>,
    /// Indices into the lattice beam table
    pub refs: Vec<u32>,
}

/// Beam lattice attached to a mesh
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BeamLattice {
    /// Minimum beam length
    pub min_length: f64,
    /// Default radius
    pub radius: f64,
    /// Default cap mode
    pub cap_mode: CapMode,
    /// Clipping mode
    pub clip_mode: ClipMode,
    /// Object id of the clipping mesh
    pub clipping_mesh: Option<u32>,
    /// Object id of the representation mesh
    pub representation_mesh: Option<u32>,
    /// Property group id
    pub pid: Option<u32>,
    /// Property index
    pub pindex: Option<u32>,
    /// Beam table
    pub beams: Vec<Beam>,
    /// Beam sets
    pub beam_sets: Vec<BeamSet>,
    /// Attributes from unknown namespaces
    pub any_attr: Vec<XmlAttr>,
    /// Child elements left undecoded, such as `<b:balls>`
    pub any: Vec<UnknownTokens>,
}

impl BeamLattice {
    /// Create a lattice with the given default radius and minimum length
    pub fn new(radius: f64, min_length: f64) -> Self {
        Self {
            radius,
            min_length,
            ..Default::default()
        }
    }
}
