//! Path-annotated diagnostics
//!
//! Decoders and validators never stop at the first problem. Each finding is a
//! [`DiagnosticKind`] wrapped with the [`DiagnosticPath`] of the element it was
//! found on, so a flat list still tells where every problem lives:
//!
//! ```text
//! /3D/3dmodel.model@Resources@Object#0@Mesh@Triangle#3: index out of bounds (12)
//! ```

use std::fmt;

/// The kind of a non-fatal finding
///
/// Kinds are typed values so callers can match on them; the `Display`
/// implementation provides the stable message used in logs and snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// An attribute value could not be decoded; the field was left zero
    ParseAttr {
        /// Attribute local name
        name: String,
        /// Whether the attribute is required by the schema
        required: bool,
    },
    /// An attribute the element does not define and cannot keep
    UnknownAttribute {
        /// Attribute local name
        name: String,
    },
    /// A required attribute or element is absent
    MissingField {
        /// Field name as it appears in XML
        name: String,
    },
    /// An index points past the end of the table it addresses
    IndexOutOfBounds {
        /// The offending index
        index: u32,
    },
    /// A triangle or beam uses the same vertex more than once
    DuplicatedIndices,
    /// A resource id is used twice inside one part
    DuplicatedId {
        /// The repeated id
        id: u32,
    },
    /// A reference does not resolve to a resource of the expected kind
    MissingResource {
        /// The id that could not be resolved
        id: u32,
    },
    /// A component graph references itself
    Recursion,
    /// A solid mesh has fewer than 3 vertices
    InsufficientVertices,
    /// A solid mesh has fewer than 4 triangles
    InsufficientTriangles,
    /// A solid mesh is not manifold and consistently oriented
    MeshConsistency,
    /// An object has both a mesh and components, or neither
    InvalidObject,
    /// An object owning components also carries a property reference
    ComponentsPid,
    /// A build item references an object of type `other`
    OtherItem,
    /// A triangle mixes different base materials on its corners
    BaseMaterialGradient,
    /// A `displaycolor` value is not `#RRGGBB` or `#RRGGBBAA`
    InvalidColor,
    /// A non-namespaced metadata name is not a predefined name
    MetadataName,
    /// A namespaced metadata name uses a namespace not declared on the model
    MetadataNamespace,
    /// A metadata name appears twice in the same group
    MetadataDuplicated,
    /// A required extension namespace has no registered handler
    UnsupportedExtension {
        /// The namespace URI
        namespace: String,
    },
    /// A production path is not an absolute part name
    PathNotAbsolute,
    /// A production path is used inside a non-root part
    ProdRefInNonRoot,
    /// A production UUID is used more than once
    DuplicatedUuid,
    /// A beam lattice is attached to an object that is not `model` or `solidsupport`
    LatticeObjectType,
    /// A beam lattice with a clipping mode has no clipping mesh
    LatticeClippedNoMesh,
    /// A beam lattice references its own object
    LatticeSelfReference,
    /// A clipping or representation mesh is not a plain mesh object
    LatticeInvalidMesh,
    /// A beam connects a vertex to itself
    LatticeSameVertex,
    /// A slice top-Z is not above the bottom-Z of its stack
    SliceSmallTopZ,
    /// Slice top-Z values are not strictly increasing
    SliceNoMonotonic,
    /// A polygon of a solid object does not end at its start vertex
    SlicePolygonNotClosed,
    /// A slice stack mixes slices and slice references
    SlicesAndRefs,
    /// A slice has fewer than 2 vertices
    SliceInsufficientVertices,
    /// A slice has no polygons, or a polygon has no segments
    SliceInsufficientSegments,
    /// A slice reference points into the part that declares it
    SliceRefSamePart,
    /// A sliced object is placed with a non-planar transform
    SliceInvalidTransform,
    /// A boolean component group has fewer than two operands
    BooleanInsufficientComponents,
    /// A boolean operand is not a mesh object
    BooleanNonMeshOperand,
    /// A package part name violates OPC naming rules
    OpcPartName {
        /// The offending part name
        name: String,
    },
    /// A relationship targets a part that does not exist
    OpcRelTarget {
        /// The relationship target
        target: String,
    },
    /// A part has no content type or the wrong one
    OpcContentType {
        /// The part name
        part: String,
    },
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticKind::ParseAttr { name, required } => {
                let level = if *required { "required" } else { "optional" };
                write!(f, "cannot parse {} attribute '{}'", level, name)
            }
            DiagnosticKind::UnknownAttribute { name } => write!(f, "unknown attribute '{}'", name),
            DiagnosticKind::MissingField { name } => write!(f, "missing field '{}'", name),
            DiagnosticKind::IndexOutOfBounds { index } => {
                write!(f, "index out of bounds ({})", index)
            }
            DiagnosticKind::DuplicatedIndices => f.write_str("duplicated indices"),
            DiagnosticKind::DuplicatedId { id } => write!(f, "duplicated resource id {}", id),
            DiagnosticKind::MissingResource { id } => write!(f, "missing resource {}", id),
            DiagnosticKind::Recursion => f.write_str("recursive component reference"),
            DiagnosticKind::InsufficientVertices => {
                f.write_str("solid mesh needs at least 3 vertices")
            }
            DiagnosticKind::InsufficientTriangles => {
                f.write_str("solid mesh needs at least 4 triangles")
            }
            DiagnosticKind::MeshConsistency => {
                f.write_str("mesh is not manifold and oriented")
            }
            DiagnosticKind::InvalidObject => {
                f.write_str("object must have either a mesh or components")
            }
            DiagnosticKind::ComponentsPid => {
                f.write_str("object with components cannot have a property reference")
            }
            DiagnosticKind::OtherItem => f.write_str("build item references an object of type other"),
            DiagnosticKind::BaseMaterialGradient => {
                f.write_str("triangle mixes different base materials")
            }
            DiagnosticKind::InvalidColor => f.write_str("invalid sRGB color"),
            DiagnosticKind::MetadataName => f.write_str("unknown metadata name"),
            DiagnosticKind::MetadataNamespace => {
                f.write_str("metadata namespace is not declared")
            }
            DiagnosticKind::MetadataDuplicated => f.write_str("duplicated metadata name"),
            DiagnosticKind::UnsupportedExtension { namespace } => {
                write!(f, "required extension '{}' is not supported", namespace)
            }
            DiagnosticKind::PathNotAbsolute => f.write_str("path is not absolute"),
            DiagnosticKind::ProdRefInNonRoot => {
                f.write_str("path reference is only allowed in the root model")
            }
            DiagnosticKind::DuplicatedUuid => f.write_str("duplicated UUID"),
            DiagnosticKind::LatticeObjectType => {
                f.write_str("beam lattice requires an object of type model or solidsupport")
            }
            DiagnosticKind::LatticeClippedNoMesh => {
                f.write_str("clipped beam lattice has no clipping mesh")
            }
            DiagnosticKind::LatticeSelfReference => {
                f.write_str("beam lattice references its own object")
            }
            DiagnosticKind::LatticeInvalidMesh => {
                f.write_str("referenced mesh must be a mesh object without a beam lattice")
            }
            DiagnosticKind::LatticeSameVertex => f.write_str("beam uses the same vertex twice"),
            DiagnosticKind::SliceSmallTopZ => f.write_str("slice top z is not above the stack bottom z"),
            DiagnosticKind::SliceNoMonotonic => f.write_str("slices are not monotonically increasing"),
            DiagnosticKind::SlicePolygonNotClosed => f.write_str("slice polygon is not closed"),
            DiagnosticKind::SlicesAndRefs => {
                f.write_str("slice stack cannot contain both slices and slice references")
            }
            DiagnosticKind::SliceInsufficientVertices => {
                f.write_str("slice needs at least 2 vertices")
            }
            DiagnosticKind::SliceInsufficientSegments => {
                f.write_str("slice polygon needs at least 1 segment")
            }
            DiagnosticKind::SliceRefSamePart => {
                f.write_str("slice reference must point to another part")
            }
            DiagnosticKind::SliceInvalidTransform => {
                f.write_str("sliced object transform must be planar")
            }
            DiagnosticKind::BooleanInsufficientComponents => {
                f.write_str("boolean operation needs at least 2 components")
            }
            DiagnosticKind::BooleanNonMeshOperand => {
                f.write_str("boolean operand must be a mesh object")
            }
            DiagnosticKind::OpcPartName { name } => write!(f, "invalid part name '{}'", name),
            DiagnosticKind::OpcRelTarget { target } => {
                write!(f, "relationship target '{}' does not exist", target)
            }
            DiagnosticKind::OpcContentType { part } => {
                write!(f, "part '{}' has no valid content type", part)
            }
        }
    }
}

impl DiagnosticKind {
    /// Shorthand for [`DiagnosticKind::ParseAttr`]
    pub fn parse_attr(name: impl Into<String>, required: bool) -> Self {
        DiagnosticKind::ParseAttr {
            name: name.into(),
            required,
        }
    }

    /// Shorthand for [`DiagnosticKind::MissingField`]
    pub fn missing_field(name: impl Into<String>) -> Self {
        DiagnosticKind::MissingField { name: name.into() }
    }
}

/// One step of a diagnostic path, optionally indexed (`Object#2`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSegment {
    /// Element kind, or the part path for the first segment
    pub name: String,
    /// Position inside the owning container
    pub index: Option<usize>,
}

impl PathSegment {
    /// A plain segment
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            index: None,
        }
    }

    /// An indexed segment
    pub fn indexed(name: impl Into<String>, index: usize) -> Self {
        Self {
            name: name.into(),
            index: Some(index),
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(index) => write!(f, "{}#{}", self.name, index),
            None => f.write_str(&self.name),
        }
    }
}

/// Location of a diagnostic, starting with the part path
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagnosticPath {
    segments: Vec<PathSegment>,
}

impl DiagnosticPath {
    /// A path rooted at a model part
    pub fn new(part: &str) -> Self {
        Self {
            segments: vec![PathSegment::new(part)],
        }
    }

    /// A copy of this path extended with a plain segment
    pub fn child(&self, name: &str) -> Self {
        self.with(PathSegment::new(name))
    }

    /// A copy of this path extended with an indexed segment
    pub fn indexed(&self, name: &str, index: usize) -> Self {
        self.with(PathSegment::indexed(name, index))
    }

    /// A copy of this path extended with `segment`
    pub fn with(&self, segment: PathSegment) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment);
        Self { segments }
    }

    /// Append a segment in place
    pub fn push(&mut self, segment: PathSegment) {
        self.segments.push(segment);
    }

    /// Remove the last segment in place
    pub fn pop(&mut self) -> Option<PathSegment> {
        self.segments.pop()
    }

    /// Segments from the part path down
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Number of segments
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns true when there are no segments
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Display for DiagnosticPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str("@")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

/// A diagnostic kind wrapped with the path it occurred at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Where the finding was made
    pub path: DiagnosticPath,
    /// What was found
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    /// Wrap `kind` with a copy of `path`
    pub fn new(path: &DiagnosticPath, kind: DiagnosticKind) -> Self {
        Self {
            path: path.clone(),
            kind,
        }
    }

    /// Returns true if the path ends with `tail`, compared segment by segment
    ///
    /// `tail` uses the textual form, e.g. `"Build@Item#0"`.
    pub fn path_ends_with(&self, tail: &str) -> bool {
        let path = self.path.to_string();
        path == tail || path.ends_with(&format!("@{}", tail))
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_display() {
        let path = DiagnosticPath::new("/3D/3dmodel.model")
            .child("Resources")
            .indexed("Object", 2)
            .child("Mesh")
            .indexed("Triangle", 7);
        assert_eq!(
            path.to_string(),
            "/3D/3dmodel.model@Resources@Object#2@Mesh@Triangle#7"
        );
    }

    #[test]
    fn test_diagnostic_display() {
        let path = DiagnosticPath::new("/3D/3dmodel.model")
            .child("Build")
            .indexed("Item", 0);
        let diag = Diagnostic::new(&path, DiagnosticKind::MissingResource { id: 99 });
        assert_eq!(
            diag.to_string(),
            "/3D/3dmodel.model@Build@Item#0: missing resource 99"
        );
        assert!(diag.path_ends_with("Build@Item#0"));
        assert!(!diag.path_ends_with("Item#1"));
    }

    #[test]
    fn test_parse_attr_message() {
        let kind = DiagnosticKind::parse_attr("radius", true);
        assert_eq!(kind.to_string(), "cannot parse required attribute 'radius'");
        let kind = DiagnosticKind::parse_attr("pid", false);
        assert_eq!(kind.to_string(), "cannot parse optional attribute 'pid'");
    }

    #[test]
    fn test_push_pop() {
        let mut path = DiagnosticPath::new("/3D/a.model");
        path.push(PathSegment::new("Resources"));
        assert_eq!(path.len(), 2);
        assert_eq!(path.pop(), Some(PathSegment::new("Resources")));
        assert_eq!(path.to_string(), "/3D/a.model");
    }
}
