//! Data structures representing 3MF models

mod attrs;
mod beam_lattice;
mod boolean_ops;
mod config;
mod core;
mod material;
mod mesh;
mod production;
mod slice;

pub use attrs::{ExtensionAttr, ExtensionAttrKind, ExtensionAttrs};

pub use beam_lattice::{Beam, BeamLattice, BeamSet, CapMode, ClipMode};

pub use boolean_ops::{Association, BooleanOpType, BooleanOperationAttr};

pub use config::{ParserConfig, WriterConfig};

pub use self::core::{
    Asset, Build, ChildModel, Component, Components, DEFAULT_MODEL_PATH, ExtensionDecl, Item,
    Metadata, Model, Object, ObjectType, Resources, Units,
};

pub use material::{Base, BaseMaterials, Rgba};

pub use mesh::{Mesh, MeshBuilder, MeshExtension, Triangle, VERTEX_QUANTUM, VertexTree};

pub use production::{ProductionAttr, is_valid_uuid};

pub use slice::{MeshResolution, Polygon, Segment, Slice, SliceRef, SliceStack, SliceStackInfo};
