//! STL (Stereolithography) support.
//!
//! Uploads arrive as bytes, so everything here works on slices rather than
//! files.
//!
//! # Binary Format
//!
//! ```text
//! UINT8[80]    – Header (ignored, often contains file info)
//! UINT32       – Number of triangles
//! foreach triangle
//!     REAL32[3] – Normal vector (often not accurate)
//!     REAL32[3] – Vertex 1
//!     REAL32[3] – Vertex 2
//!     REAL32[3] – Vertex 3
//!     UINT16    – Attribute byte count (usually 0)
//! end
//! ```
//!
//! ASCII STL (`solid ... endsolid`) is also accepted.

use mesh_types::{Facet, Point3, TriangleMesh, Vector3};
use tracing::debug;

use crate::error::{IoError, IoResult};

/// STL binary header size in bytes.
const HEADER_SIZE: usize = 80;

/// Size of one triangle in binary STL (normal + 3 vertices + attribute).
const TRIANGLE_SIZE: usize = 50;

/// Parse STL bytes, detecting ASCII vs binary.
pub(crate) fn parse_stl(bytes: &[u8]) -> IoResult<TriangleMesh> {
    if looks_like_ascii(bytes) {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| IoError::invalid_content(format!("ASCII STL is not UTF-8: {e}")))?;
        parse_stl_ascii(text)
    } else {
        parse_stl_binary(bytes)
    }
}

/// ASCII when the text starts with `solid` and the header has no NUL,
/// unless the length is exactly what the binary triangle count declares.
///
/// Plenty of binary exporters write "solid" into the header, padded with
/// zeros or spaces.
fn looks_like_ascii(bytes: &[u8]) -> bool {
    if binary_length_matches(bytes) {
        return false;
    }
    let header = &bytes[..bytes.len().min(HEADER_SIZE)];
    let starts_with_solid = header
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .is_some_and(|start| header[start..].starts_with(b"solid"));
    starts_with_solid && !header.contains(&0)
}

/// True when `bytes` is exactly a header, a count, and that many triangles.
fn binary_length_matches(bytes: &[u8]) -> bool {
    let Some(count) = bytes.get(HEADER_SIZE..HEADER_SIZE + 4) else {
        return false;
    };
    let declared = u32::from_le_bytes([count[0], count[1], count[2], count[3]]) as usize;
    declared
        .checked_mul(TRIANGLE_SIZE)
        .and_then(|body| body.checked_add(HEADER_SIZE + 4))
        .is_some_and(|expected| expected == bytes.len())
}

fn parse_stl_binary(bytes: &[u8]) -> IoResult<TriangleMesh> {
    if bytes.len() < HEADER_SIZE + 4 {
        return Err(IoError::invalid_content(format!(
            "binary STL needs at least {} bytes, got {}",
            HEADER_SIZE + 4,
            bytes.len()
        )));
    }

    let declared = u32::from_le_bytes([
        bytes[HEADER_SIZE],
        bytes[HEADER_SIZE + 1],
        bytes[HEADER_SIZE + 2],
        bytes[HEADER_SIZE + 3],
    ]);

    let body = &bytes[HEADER_SIZE + 4..];
    let available = body.len() / TRIANGLE_SIZE;
    if available < declared as usize {
        return Err(IoError::Truncated {
            declared,
            available,
        });
    }

    let mut mesh = TriangleMesh::with_capacity(declared as usize);
    for chunk in body.chunks_exact(TRIANGLE_SIZE).take(declared as usize) {
        let normal = read_vec3(&chunk[0..12]);
        let vertices = [
            Point3::from(read_vec3(&chunk[12..24])),
            Point3::from(read_vec3(&chunk[24..36])),
            Point3::from(read_vec3(&chunk[36..48])),
        ];
        mesh.facets.push(Facet::with_supplied_normal(vertices, normal));
    }

    debug!(triangles = declared, "parsed binary STL");
    Ok(mesh)
}

/// Read 3 little-endian f32s from 12 bytes.
fn read_vec3(buf: &[u8]) -> Vector3<f64> {
    let x = f32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]);
    let y = f32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]);
    let z = f32::from_le_bytes([buf[8], buf[9], buf[10], buf[11]]);
    Vector3::new(f64::from(x), f64::from(y), f64::from(z))
}

fn parse_stl_ascii(text: &str) -> IoResult<TriangleMesh> {
    let mut mesh = TriangleMesh::new();
    let mut normal = Vector3::zeros();
    let mut in_loop = false;
    let mut corners: Vec<Point3<f64>> = Vec::with_capacity(3);

    for line in text.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some(keyword) = parts.first() else {
            continue;
        };

        match keyword.to_ascii_lowercase().as_str() {
            "facet" => {
                normal = if parts.len() >= 5 && parts[1].eq_ignore_ascii_case("normal") {
                    Vector3::new(parts[2].parse()?, parts[3].parse()?, parts[4].parse()?)
                } else {
                    Vector3::zeros()
                };
            }
            "outer" => {
                in_loop = true;
                corners.clear();
            }
            "vertex" if in_loop => {
                if parts.len() < 4 {
                    return Err(IoError::invalid_content(format!(
                        "vertex line has {} coordinates",
                        parts.len() - 1
                    )));
                }
                corners.push(Point3::new(
                    parts[1].parse()?,
                    parts[2].parse()?,
                    parts[3].parse()?,
                ));
            }
            "endloop" => in_loop = false,
            "endfacet" => {
                let [a, b, c] = corners.as_slice() else {
                    return Err(IoError::invalid_content(format!(
                        "facet {} has {} vertices",
                        mesh.facet_count(),
                        corners.len()
                    )));
                };
                mesh.facets
                    .push(Facet::with_supplied_normal([*a, *b, *c], normal));
                corners.clear();
            }
            "endsolid" => break,
            _ => {}
        }
    }

    debug!(triangles = mesh.facet_count(), "parsed ASCII STL");
    Ok(mesh)
}

/// Encode a mesh as binary STL.
///
/// Used to hand a re-oriented mesh to the slicer. Coordinates are narrowed
/// to `f32` as the format requires.
///
/// # Example
///
/// ```
/// use mesh_io::{load_model, save_stl_binary};
/// use mesh_types::{Point3, TriangleMesh};
///
/// let cube = TriangleMesh::axis_aligned_box(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
/// let bytes = save_stl_binary(&cube);
/// assert_eq!(bytes.len(), 84 + 12 * 50);
/// assert_eq!(load_model(&bytes, "cube.stl").unwrap().facet_count(), 12);
/// ```
#[must_use]
pub fn save_stl_binary(mesh: &TriangleMesh) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_SIZE + 4 + mesh.facet_count() * TRIANGLE_SIZE);

    let mut header = [b' '; HEADER_SIZE];
    let text = b"Binary STL written by print-quote mesh-io";
    header[..text.len()].copy_from_slice(text);
    // A NUL keeps the header from being mistaken for ASCII STL.
    header[HEADER_SIZE - 1] = 0;
    out.extend_from_slice(&header);

    #[allow(clippy::cast_possible_truncation)]
    // Truncation: STL cannot describe more than u32::MAX triangles
    let count = mesh.facet_count() as u32;
    out.extend_from_slice(&count.to_le_bytes());

    for facet in &mesh.facets {
        write_vec3(&mut out, &facet.normal);
        for v in &facet.vertices {
            write_vec3(&mut out, &v.coords);
        }
        out.extend_from_slice(&0u16.to_le_bytes());
    }

    out
}

fn write_vec3(out: &mut Vec<u8>, v: &Vector3<f64>) {
    #[allow(clippy::cast_possible_truncation)]
    // Truncation: f64 to f32 is intentional for STL format
    {
        out.extend_from_slice(&(v.x as f32).to_le_bytes());
        out.extend_from_slice(&(v.y as f32).to_le_bytes());
        out.extend_from_slice(&(v.z as f32).to_le_bytes());
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn one_triangle() -> TriangleMesh {
        let mut mesh = TriangleMesh::new();
        mesh.push_triangle(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        );
        mesh
    }

    #[test]
    fn binary_with_space_padded_solid_header() {
        let cube = TriangleMesh::axis_aligned_box(Point3::origin(), Point3::new(1.0, 2.0, 3.0));
        let mut bytes = save_stl_binary(&cube);
        let header = format!("{:<80}", "solid PartOne");
        bytes[..HEADER_SIZE].copy_from_slice(header.as_bytes());

        assert!(!looks_like_ascii(&bytes));
        let mesh = parse_stl(&bytes).unwrap();
        assert_eq!(mesh.facet_count(), 12);
        assert_relative_eq!(mesh.surface_area(), 22.0, epsilon = 1e-6);
    }

    #[test]
    fn short_ascii_is_not_mistaken_for_binary() {
        assert!(looks_like_ascii(b"solid t\nendsolid t\n"));
    }

    #[test]
    fn binary_round_trip_keeps_geometry() {
        let bytes = save_stl_binary(&one_triangle());
        let loaded = parse_stl(&bytes).unwrap();
        assert_eq!(loaded.facet_count(), 1);
        assert_relative_eq!(loaded.facets[0].normal, Vector3::z());
        assert_relative_eq!(loaded.facets[0].vertices[1], Point3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn zeroed_stored_normal_is_recomputed() {
        let mut bytes = save_stl_binary(&one_triangle());
        bytes[HEADER_SIZE + 4..HEADER_SIZE + 16].fill(0);
        let loaded = parse_stl(&bytes).unwrap();
        assert_relative_eq!(loaded.facets[0].normal, Vector3::z());
    }

    #[test]
    fn declared_count_must_fit_payload() {
        let mut bytes = save_stl_binary(&one_triangle());
        bytes[HEADER_SIZE..HEADER_SIZE + 4].copy_from_slice(&3u32.to_le_bytes());
        let err = parse_stl(&bytes).unwrap_err();
        assert!(matches!(
            err,
            IoError::Truncated {
                declared: 3,
                available: 1
            }
        ));
    }

    #[test]
    fn binary_header_starting_with_solid_is_binary() {
        let mut bytes = save_stl_binary(&one_triangle());
        bytes[..5].copy_from_slice(b"solid");
        assert!(!looks_like_ascii(&bytes));
        assert_eq!(parse_stl(&bytes).unwrap().facet_count(), 1);
    }

    #[test]
    fn ascii_stl_parsing() {
        let ascii = "solid test
  facet normal 0 0 1
    outer loop
      vertex 0 0 0
      vertex 1 0 0
      vertex 0 1 0
    endloop
  endfacet
endsolid test";

        let mesh = parse_stl(ascii.as_bytes()).unwrap();
        assert_eq!(mesh.facet_count(), 1);
        assert_relative_eq!(mesh.facets[0].area(), 0.5);
    }

    #[test]
    fn ascii_facet_with_two_vertices_is_rejected() {
        let ascii = "solid bad
  facet normal 0 0 1
    outer loop
      vertex 0 0 0
      vertex 1 0 0
    endloop
  endfacet
endsolid bad";

        assert!(parse_stl(ascii.as_bytes()).is_err());
    }

    #[test]
    fn tiny_payload_is_rejected() {
        assert!(parse_stl(&[1, 2, 3]).is_err());
    }
}
