//! STL (Stereolithography) import and export
//!
//! Both the ASCII and the binary flavour are supported. The decoder detects
//! the flavour from the first bytes of the stream and feeds every vertex
//! through a [`MeshBuilder`](crate::model::MeshBuilder) vertex tree, so shared
//! corners of adjacent facets collapse to one vertex.
//!
//! # Binary Format
//!
//! ```text
//! UINT8[80]    – Header (ignored)
//! UINT32       – Number of triangles
//! foreach triangle
//!     REAL32[3] – Normal vector
//!     REAL32[3] – Vertex 1
//!     REAL32[3] – Vertex 2
//!     REAL32[3] – Vertex 3
//!     UINT16    – Attribute byte count
//! end
//! ```
//!
//! # ASCII Format
//!
//! ```text
//! solid name
//!   facet normal ni nj nk
//!     outer loop
//!       vertex v1x v1y v1z
//!       vertex v2x v2y v2z
//!       vertex v3x v3y v3z
//!     endloop
//!   endfacet
//! endsolid name
//! ```

mod decoder;
mod encoder;

pub use decoder::{DEFAULT_CHECK_INTERVAL, StlDecoder};
pub use encoder::StlEncoder;

/// Binary STL header size in bytes
pub(crate) const HEADER_SIZE: usize = 80;

/// Number of leading bytes inspected to tell ASCII from binary
pub(crate) const DETECTION_WINDOW: usize = 300;

/// STL flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StlFormat {
    /// Text STL
    Ascii,
    /// Little-endian binary STL
    #[default]
    Binary,
}

impl StlFormat {
    /// Detect the flavour from the leading bytes of a file
    ///
    /// ASCII files start with `solid` and contain only 7-bit characters in
    /// the inspected window; anything else is binary.
    ///
    /// ```
    /// use threemf::stl::StlFormat;
    ///
    /// assert_eq!(StlFormat::detect(b"solid cube\n facet normal 0 0 1"), StlFormat::Ascii);
    /// assert_eq!(StlFormat::detect(b"solid\x00\x00\x80"), StlFormat::Binary);
    /// ```
    pub fn detect(head: &[u8]) -> Self {
        let window = &head[..head.len().min(DETECTION_WINDOW)];
        if window.starts_with(b"solid") && window.is_ascii() {
            StlFormat::Ascii
        } else {
            StlFormat::Binary
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point3D;
    use crate::model::{Mesh, MeshBuilder, Model, Object};
    use std::io::Cursor;

    fn two_facets() -> Mesh {
        let mut builder = MeshBuilder::new();
        let points = [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [5.0, 5.0, 5.0],
            [6.0, 5.0, 5.0],
            [5.0, 6.0, 5.0],
        ];
        for [x, y, z] in points {
            builder.add_vertex(Point3D::new(x, y, z));
        }
        builder.add_triangle(0, 1, 2);
        builder.add_triangle(3, 4, 5);
        builder.finish()
    }

    fn encode(mesh: Mesh, format: StlFormat) -> Vec<u8> {
        let mut model = Model::new();
        model.resources.objects.push(Object::with_mesh(1, mesh));
        let mut out = Vec::new();
        StlEncoder::new(&mut out, format).encode(&model).unwrap();
        out
    }

    #[test]
    fn test_ascii_and_binary_decode_alike() {
        let ascii = encode(two_facets(), StlFormat::Ascii);
        let binary = encode(two_facets(), StlFormat::Binary);
        assert_eq!(StlFormat::detect(&ascii), StlFormat::Ascii);
        assert_eq!(StlFormat::detect(&binary), StlFormat::Binary);

        let from_ascii = StlDecoder::new(Cursor::new(ascii)).decode_mesh().unwrap();
        let from_binary = StlDecoder::new(Cursor::new(binary)).decode_mesh().unwrap();
        assert_eq!(from_ascii.vertices.len(), 6);
        assert_eq!(from_ascii.triangles.len(), 2);
        assert_eq!(from_ascii, from_binary);
        assert_eq!(from_ascii, two_facets());
    }

    #[test]
    fn test_detect_short_input() {
        assert_eq!(StlFormat::detect(b""), StlFormat::Binary);
        assert_eq!(StlFormat::detect(b"sol"), StlFormat::Binary);
        assert_eq!(StlFormat::detect(b"solid"), StlFormat::Ascii);
    }
}
