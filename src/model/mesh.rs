//! Triangle mesh store and construction-time vertex deduplication

use std::collections::HashMap;

use super::beam_lattice::BeamLattice;
use crate::codec::{UnknownTokens, XmlAttr};
use crate::extension::Extension;
use crate::geometry::Point3D;

/// Quantisation factor of the vertex tree (coordinates in integer micros)
pub const VERTEX_QUANTUM: f64 = 1_000_000.0;

/// A triangle referencing three mesh vertices
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Triangle {
    /// Index of first vertex
    pub v1: u32,
    /// Index of second vertex
    pub v2: u32,
    /// Index of third vertex
    pub v3: u32,
    /// Property group id
    pub pid: Option<u32>,
    /// Property index for v1
    pub p1: Option<u32>,
    /// Property index for v2
    pub p2: Option<u32>,
    /// Property index for v3
    pub p3: Option<u32>,
}

impl Triangle {
    /// Create a new triangle without properties
    pub fn new(v1: u32, v2: u32, v3: u32) -> Self {
        Self {
            v1,
            v2,
            v3,
            ..Default::default()
        }
    }

    /// Vertex indices in order
    pub fn indices(&self) -> [u32; 3] {
        [self.v1, self.v2, self.v3]
    }
}

/// Extension payload living inside `<mesh>`
#[derive(Debug, Clone, PartialEq)]
pub enum MeshExtension {
    /// Beam lattice
    BeamLattice(BeamLattice),
    /// An element from an unregistered namespace
    Unknown(UnknownTokens),
}

impl MeshExtension {
    /// Namespace of the payload element
    pub fn namespace(&self) -> &str {
        match self {
            MeshExtension::BeamLattice(_) => Extension::BeamLattice.namespace(),
            MeshExtension::Unknown(tokens) => tokens.name().map_or("", |name| name.space.as_str()),
        }
    }
}

/// A triangle mesh
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mesh {
    /// Vertex buffer
    pub vertices: Vec<Point3D>,
    /// Triangle table
    pub triangles: Vec<Triangle>,
    /// Extension payloads in document order
    pub extensions: Vec<MeshExtension>,
    /// Attributes from unknown namespaces
    pub any_attr: Vec<XmlAttr>,
}

impl Mesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// The beam lattice of this mesh, if any
    pub fn beam_lattice(&self) -> Option<&BeamLattice> {
        self.extensions.iter().find_map(|ext| match ext {
            MeshExtension::BeamLattice(lattice) => Some(lattice),
            MeshExtension::Unknown(_) => None,
        })
    }

    /// Mutable access to the beam lattice of this mesh, if any
    pub fn beam_lattice_mut(&mut self) -> Option<&mut BeamLattice> {
        self.extensions.iter_mut().find_map(|ext| match ext {
            MeshExtension::BeamLattice(lattice) => Some(lattice),
            MeshExtension::Unknown(_) => None,
        })
    }

    /// Returns true if every undirected edge is used exactly once in each direction
    ///
    /// For each directed edge `(a, b)` the census keyed by the ordered pair
    /// `(min, max)` counts a positive hit when `a <= b` and a negative hit
    /// otherwise. Meshes with fewer than 3 vertices or 3 triangles are never
    /// manifold.
    pub fn is_manifold_and_oriented(&self) -> bool {
        if self.vertices.len() < 3 || self.triangles.len() < 3 {
            return false;
        }

        let mut census: HashMap<(u32, u32), (u32, u32)> =
            HashMap::with_capacity(self.triangles.len() * 3 / 2);
        for triangle in &self.triangles {
            let v = triangle.indices();
            for j in 0..3 {
                let n1 = v[j];
                let n2 = v[(j + 1) % 3];
                let entry = census.entry((n1.min(n2), n1.max(n2))).or_insert((0, 0));
                if n1 <= n2 {
                    entry.0 += 1;
                } else {
                    entry.1 += 1;
                }
            }
        }

        census.values().all(|&(positive, negative)| positive == 1 && negative == 1)
    }
}

/// Quantised-coordinate index used while building a mesh
///
/// Two points land on the same key when each coordinate floors to the same
/// integer number of micros.
#[derive(Debug, Clone, Default)]
pub struct VertexTree {
    index: HashMap<[i64; 3], u32>,
}

impl VertexTree {
    /// Create an empty tree
    pub fn new() -> Self {
        Self::default()
    }

    fn key(p: Point3D) -> [i64; 3] {
        [
            (p.x as f64 * VERTEX_QUANTUM).floor() as i64,
            (p.y as f64 * VERTEX_QUANTUM).floor() as i64,
            (p.z as f64 * VERTEX_QUANTUM).floor() as i64,
        ]
    }

    /// Index of a previously added quantised twin of `p`
    pub fn find(&self, p: Point3D) -> Option<u32> {
        self.index.get(&Self::key(p)).copied()
    }

    /// Record `p` at `index`
    pub fn insert(&mut self, p: Point3D, index: u32) {
        self.index.insert(Self::key(p), index);
    }

    /// Number of distinct quantised points
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns true if no point was recorded
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

/// Builds a [`Mesh`], optionally deduplicating vertices through a [`VertexTree`]
///
/// ```
/// use threemf::geometry::Point3D;
/// use threemf::model::MeshBuilder;
///
/// let mut builder = MeshBuilder::with_vertex_tree();
/// let a = builder.add_vertex(Point3D::new(1.0, 2.0, 3.0));
/// let b = builder.add_vertex(Point3D::new(1.0, 2.0, 3.0));
/// assert_eq!(a, b);
/// assert_eq!(builder.finish().vertices.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MeshBuilder {
    mesh: Mesh,
    tree: Option<VertexTree>,
}

impl MeshBuilder {
    /// Builder that appends every vertex
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder that deduplicates quantised twins
    pub fn with_vertex_tree() -> Self {
        Self {
            mesh: Mesh::new(),
            tree: Some(VertexTree::new()),
        }
    }

    /// Add a vertex, returning its index
    pub fn add_vertex(&mut self, p: Point3D) -> u32 {
        if let Some(index) = self.tree.as_ref().and_then(|tree| tree.find(p)) {
            return index;
        }
        let index = self.mesh.vertices.len() as u32;
        self.mesh.vertices.push(p);
        if let Some(tree) = self.tree.as_mut() {
            tree.insert(p, index);
        }
        index
    }

    /// Add a triangle, returning its index
    pub fn add_triangle(&mut self, v1: u32, v2: u32, v3: u32) -> usize {
        self.mesh.triangles.push(Triangle::new(v1, v2, v3));
        self.mesh.triangles.len() - 1
    }

    /// The mesh built so far
    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    /// Finish construction, dropping the vertex tree
    pub fn finish(self) -> Mesh {
        self.mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tetrahedron() -> Mesh {
        let mut mesh = Mesh::new();
        mesh.vertices = vec![
            Point3D::new(0.0, 0.0, 0.0),
            Point3D::new(1.0, 0.0, 0.0),
            Point3D::new(0.0, 1.0, 0.0),
            Point3D::new(0.0, 0.0, 1.0),
        ];
        mesh.triangles = vec![
            Triangle::new(0, 2, 1),
            Triangle::new(0, 1, 3),
            Triangle::new(1, 2, 3),
            Triangle::new(0, 3, 2),
        ];
        mesh
    }

    #[test]
    fn test_tetrahedron_is_manifold() {
        assert!(tetrahedron().is_manifold_and_oriented());
    }

    #[test]
    fn test_flipped_triangle_is_not_oriented() {
        let mut mesh = tetrahedron();
        mesh.triangles[0] = Triangle::new(0, 1, 2);
        assert!(!mesh.is_manifold_and_oriented());
    }

    #[test]
    fn test_open_mesh_is_not_manifold() {
        let mut mesh = tetrahedron();
        mesh.triangles.pop();
        assert!(!mesh.is_manifold_and_oriented());
    }

    #[test]
    fn test_small_mesh_is_not_manifold() {
        let mut mesh = tetrahedron();
        mesh.triangles.truncate(2);
        assert!(!mesh.is_manifold_and_oriented());
    }

    #[test]
    fn test_vertex_tree_dedup() {
        let mut builder = MeshBuilder::with_vertex_tree();
        let a = builder.add_vertex(Point3D::new(0.5, 0.5, 0.5));
        let b = builder.add_vertex(Point3D::new(0.5, 0.5, 0.5));
        let c = builder.add_vertex(Point3D::new(0.5, 0.5, 0.6));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(builder.mesh().vertices.len(), 2);
    }

    #[test]
    fn test_builder_without_tree_keeps_duplicates() {
        let mut builder = MeshBuilder::new();
        builder.add_vertex(Point3D::new(1.0, 1.0, 1.0));
        builder.add_vertex(Point3D::new(1.0, 1.0, 1.0));
        assert_eq!(builder.finish().vertices.len(), 2);
    }

    #[test]
    fn test_beam_lattice_accessor() {
        let mut mesh = Mesh::new();
        assert!(mesh.beam_lattice().is_none());
        mesh.extensions
            .push(MeshExtension::BeamLattice(BeamLattice::new(1.0, 0.1)));
        assert_eq!(mesh.beam_lattice().map(|l| l.radius), Some(1.0));
    }
}
