//! STL decoding

use std::io::{self, BufRead, BufReader, Cursor, Read};

use byteorder::{LittleEndian, ReadBytesExt};
use tracing::{debug, warn};

use super::{DETECTION_WINDOW, HEADER_SIZE, StlFormat};
use crate::cancellation::CancellationToken;
use crate::error::{Error, Result};
use crate::geometry::Point3D;
use crate::model::{Item, Mesh, MeshBuilder, Model, Object};

/// Faces decoded between two cancellation checks
pub const DEFAULT_CHECK_INTERVAL: usize = 1000;

/// Decoder for ASCII and binary STL streams
///
/// ```
/// use std::io::Cursor;
/// use threemf::model::Model;
/// use threemf::stl::StlDecoder;
///
/// let stl = "solid t
///   facet normal 0 0 1
///     outer loop
///       vertex 0 0 0
///       vertex 1 0 0
///       vertex 0 1 0
///     endloop
///   endfacet
/// endsolid t";
/// let mut model = Model::new();
/// let id = StlDecoder::new(Cursor::new(stl)).decode(&mut model).unwrap();
/// assert_eq!(model.resources.objects[0].id, id);
/// assert_eq!(model.build.items[0].object_id, id);
/// ```
pub struct StlDecoder<R> {
    reader: R,
    cancellation: Option<CancellationToken>,
    check_interval: usize,
}

impl<R: Read> StlDecoder<R> {
    /// Decoder over `reader`
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            cancellation: None,
            check_interval: DEFAULT_CHECK_INTERVAL,
        }
    }

    /// Poll `token` while decoding
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Faces decoded between two cancellation checks; zero is treated as one
    pub fn with_check_interval(mut self, faces: usize) -> Self {
        self.check_interval = faces.max(1);
        self
    }

    /// Decode into a new object appended to the root part, plus a build item for it
    ///
    /// Returns the id of the new object.
    pub fn decode(self, model: &mut Model) -> Result<u32> {
        let id = model
            .resources
            .next_id()
            .ok_or_else(|| Error::InvalidFormat("no free resource id left in the root part".to_string()))?;
        let mesh = self.decode_mesh()?;
        model.resources.objects.push(Object::with_mesh(id, mesh));
        model.build.items.push(Item::new(id));
        Ok(id)
    }

    /// Decode into a mesh
    pub fn decode_mesh(mut self) -> Result<Mesh> {
        let mut head = Vec::with_capacity(DETECTION_WINDOW);
        (&mut self.reader)
            .take(DETECTION_WINDOW as u64)
            .read_to_end(&mut head)?;
        let format = StlFormat::detect(&head);
        let state = FaceCounter {
            cancellation: self.cancellation,
            interval: self.check_interval,
            faces: 0,
        };
        let stream = Cursor::new(head).chain(self.reader);

        let mesh = match format {
            StlFormat::Ascii => decode_ascii(BufReader::new(stream), state)?,
            StlFormat::Binary => decode_binary(stream, state)?,
        };
        debug!(
            format = ?format,
            vertices = mesh.vertices.len(),
            triangles = mesh.triangles.len(),
            "decoded STL"
        );
        Ok(mesh)
    }
}

/// Counts faces and polls the cancellation token every `interval` faces
struct FaceCounter {
    cancellation: Option<CancellationToken>,
    interval: usize,
    faces: usize,
}

impl FaceCounter {
    fn face_done(&mut self) -> Result<()> {
        self.faces += 1;
        match &self.cancellation {
            Some(token) if self.faces % self.interval == 0 => token.check(),
            _ => Ok(()),
        }
    }
}

fn decode_ascii<R: BufRead>(reader: R, mut counter: FaceCounter) -> Result<Mesh> {
    let mut builder = MeshBuilder::with_vertex_tree();
    let mut corners = [0u32; 3];
    let mut pending = 0;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("vertex") => {
                let mut coords = [0f32; 3];
                for coord in &mut coords {
                    *coord = tokens
                        .next()
                        .and_then(|t| t.parse().ok())
                        .ok_or_else(|| {
                            Error::InvalidStl(format!("line {}: malformed vertex '{}'", line_no + 1, line.trim()))
                        })?;
                }
                corners[pending] = builder.add_vertex(Point3D::new(coords[0], coords[1], coords[2]));
                pending += 1;
                if pending == 3 {
                    builder.add_triangle(corners[0], corners[1], corners[2]);
                    pending = 0;
                    counter.face_done()?;
                }
            }
            Some("endsolid") => break,
            _ => {}
        }
    }
    if pending != 0 {
        warn!(vertices = pending, "STL ends inside a facet, trailing vertices dropped");
    }
    Ok(builder.finish())
}

fn decode_binary<R: Read>(mut reader: R, mut counter: FaceCounter) -> Result<Mesh> {
    let mut header = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header).map_err(truncated("header"))?;
    let face_count = reader
        .read_u32::<LittleEndian>()
        .map_err(truncated("face count"))?;

    let mut builder = MeshBuilder::with_vertex_tree();
    for face in 0..face_count {
        let [a, b, c] = read_face(&mut reader).map_err(|e| match e.kind() {
            io::ErrorKind::UnexpectedEof => Error::InvalidStl(format!(
                "expected {} faces, data ends after {}",
                face_count, face
            )),
            _ => Error::Io(e),
        })?;
        let v1 = builder.add_vertex(a);
        let v2 = builder.add_vertex(b);
        let v3 = builder.add_vertex(c);
        builder.add_triangle(v1, v2, v3);
        counter.face_done()?;
    }
    Ok(builder.finish())
}

/// One 50-byte face record; the stored normal is ignored
fn read_face<R: Read>(reader: &mut R) -> io::Result<[Point3D; 3]> {
    let mut values = [0f32; 12];
    reader.read_f32_into::<LittleEndian>(&mut values)?;
    reader.read_u16::<LittleEndian>()?;
    Ok([
        Point3D::new(values[3], values[4], values[5]),
        Point3D::new(values[6], values[7], values[8]),
        Point3D::new(values[9], values[10], values[11]),
    ])
}

fn truncated(what: &'static str) -> impl Fn(io::Error) -> Error {
    move |e| match e.kind() {
        io::ErrorKind::UnexpectedEof => Error::InvalidStl(format!("truncated {}", what)),
        _ => Error::Io(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::WriteBytesExt;

    const TWO_FACETS: &str = "solid two
  facet normal 0 0 1
    outer loop
      vertex 0 0 0
      vertex 1 0 0
      vertex 1 1 0
    endloop
  endfacet
  facet normal 0 0 1
    outer loop
      vertex 0 0 0
      vertex 1 1 0
      vertex 0 1 0
    endloop
  endfacet
endsolid two
";

    fn binary(faces: u32, triangles: &[[f32; 9]]) -> Vec<u8> {
        let mut out = vec![0u8; HEADER_SIZE];
        out.write_u32::<LittleEndian>(faces).unwrap();
        for triangle in triangles {
            for _ in 0..3 {
                out.write_f32::<LittleEndian>(0.0).unwrap();
            }
            for value in triangle {
                out.write_f32::<LittleEndian>(*value).unwrap();
            }
            out.write_u16::<LittleEndian>(0).unwrap();
        }
        out
    }

    #[test]
    fn test_ascii_shared_corners_are_merged() {
        let mesh = StlDecoder::new(Cursor::new(TWO_FACETS)).decode_mesh().unwrap();
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.triangles.len(), 2);
        assert_eq!(mesh.triangles[1].indices(), [0, 2, 3]);
    }

    #[test]
    fn test_ascii_malformed_vertex() {
        let stl = "solid x\nfacet normal 0 0 1\nouter loop\nvertex 0 a 0\n";
        let result = StlDecoder::new(Cursor::new(stl)).decode_mesh();
        assert!(matches!(result, Err(Error::InvalidStl(msg)) if msg.starts_with("line 4")));
    }

    #[test]
    fn test_binary_truncated() {
        let data = binary(2, &[[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]]);
        let result = StlDecoder::new(Cursor::new(data)).decode_mesh();
        assert!(matches!(result, Err(Error::InvalidStl(msg)) if msg.contains("ends after 1")));

        let result = StlDecoder::new(Cursor::new(vec![0u8; 40])).decode_mesh();
        assert!(matches!(result, Err(Error::InvalidStl(msg)) if msg == "truncated header"));
    }

    #[test]
    fn test_binary_header_starting_with_solid() {
        let mut data = binary(1, &[[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]]);
        data[..5].copy_from_slice(b"solid");
        data[HEADER_SIZE + 4 + 12] = 0x80;
        let mesh = StlDecoder::new(Cursor::new(data)).decode_mesh().unwrap();
        assert_eq!(mesh.triangles.len(), 1);
    }

    #[test]
    fn test_cancelled_decode() {
        let token = CancellationToken::new();
        token.cancel();
        let triangle = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        let data = binary(4, &[triangle; 4]);
        let result = StlDecoder::new(Cursor::new(data))
            .with_cancellation(token)
            .with_check_interval(2)
            .decode_mesh();
        assert!(matches!(result, Err(Error::Cancelled)));
    }

    #[test]
    fn test_untripped_token_does_not_interrupt() {
        let mesh = StlDecoder::new(Cursor::new(TWO_FACETS))
            .with_cancellation(CancellationToken::new())
            .with_check_interval(1)
            .decode_mesh()
            .unwrap();
        assert_eq!(mesh.triangles.len(), 2);
    }

    #[test]
    fn test_decode_appends_after_existing_ids() {
        let mut model = Model::new();
        model.resources.objects.push(Object::new(7));
        let id = StlDecoder::new(Cursor::new(TWO_FACETS)).decode(&mut model).unwrap();
        assert_eq!(id, 8);
        assert_eq!(model.resources.objects.len(), 2);
        assert_eq!(model.build.items.len(), 1);
    }
}
