//! STL encoding

use std::io::Write;

use byteorder::{LittleEndian, WriteBytesExt};
use tracing::debug;

use super::{HEADER_SIZE, StlFormat};
use crate::error::{Error, Result};
use crate::geometry::Point3D;
use crate::model::{Mesh, Model};

const HEADER_TEXT: &[u8] = b"Binary STL written by threemf";

/// Encoder writing the meshes of a model as one STL solid
///
/// Only mesh objects of the root part are written, in resource order and in
/// object coordinates. Facet normals are recomputed from the vertex order.
pub struct StlEncoder<W> {
    writer: W,
    format: StlFormat,
}

impl<W: Write> StlEncoder<W> {
    /// Encoder writing `format` to `writer`
    pub fn new(writer: W, format: StlFormat) -> Self {
        Self { writer, format }
    }

    /// Write every mesh object of the root part
    pub fn encode(&mut self, model: &Model) -> Result<()> {
        let meshes: Vec<&Mesh> = model
            .resources
            .objects
            .iter()
            .filter_map(|object| object.mesh.as_ref())
            .collect();
        self.encode_meshes(&meshes)
    }

    /// Write one mesh
    pub fn encode_mesh(&mut self, mesh: &Mesh) -> Result<()> {
        self.encode_meshes(&[mesh])
    }

    fn encode_meshes(&mut self, meshes: &[&Mesh]) -> Result<()> {
        let mut facets = Vec::new();
        for mesh in meshes {
            for (index, triangle) in mesh.triangles.iter().enumerate() {
                let corner = |v: u32| {
                    mesh.vertices.get(v as usize).copied().ok_or_else(|| {
                        Error::InvalidFormat(format!(
                            "triangle {} references missing vertex {}",
                            index, v
                        ))
                    })
                };
                facets.push([corner(triangle.v1)?, corner(triangle.v2)?, corner(triangle.v3)?]);
            }
        }

        match self.format {
            StlFormat::Ascii => self.write_ascii(&facets)?,
            StlFormat::Binary => self.write_binary(&facets)?,
        }
        debug!(format = ?self.format, facets = facets.len(), "encoded STL");
        Ok(())
    }

    fn write_ascii(&mut self, facets: &[[Point3D; 3]]) -> Result<()> {
        let w = &mut self.writer;
        writeln!(w, "solid threemf")?;
        for facet in facets {
            let n = facet_normal(facet);
            writeln!(w, "  facet normal {} {} {}", n.x, n.y, n.z)?;
            writeln!(w, "    outer loop")?;
            for v in facet {
                writeln!(w, "      vertex {} {} {}", v.x, v.y, v.z)?;
            }
            writeln!(w, "    endloop")?;
            writeln!(w, "  endfacet")?;
        }
        writeln!(w, "endsolid threemf")?;
        Ok(())
    }

    fn write_binary(&mut self, facets: &[[Point3D; 3]]) -> Result<()> {
        let count = u32::try_from(facets.len())
            .map_err(|_| Error::InvalidFormat(format!("{} facets exceed binary STL limit", facets.len())))?;
        let mut header = [b' '; HEADER_SIZE];
        header[..HEADER_TEXT.len()].copy_from_slice(HEADER_TEXT);

        let w = &mut self.writer;
        w.write_all(&header)?;
        w.write_u32::<LittleEndian>(count)?;
        for facet in facets {
            let n = facet_normal(facet);
            for p in std::iter::once(&n).chain(facet.iter()) {
                w.write_f32::<LittleEndian>(p.x)?;
                w.write_f32::<LittleEndian>(p.y)?;
                w.write_f32::<LittleEndian>(p.z)?;
            }
            w.write_u16::<LittleEndian>(0)?;
        }
        Ok(())
    }
}

/// `normalize((v2 - v1) x (v3 - v1))`
fn facet_normal([v1, v2, v3]: &[Point3D; 3]) -> Point3D {
    (*v2 - *v1).cross(*v3 - *v1).normalize()
}
