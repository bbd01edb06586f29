//! STL (Stereolithography) reading and writing.
//!
//! STL stores an unindexed triangle soup: every facet carries its own three
//! corners. Loading therefore produces three vertices per face; welding them
//! back together is the repair stage's job.
//!
//! # Format Detection
//!
//! Many binary files start their 80-byte header with `solid`, so the leading
//! keyword alone is not trusted. A file is read as binary when its length is
//! exactly `84 + 50 * n` for the triangle count `n` stored at byte 80, as
//! ASCII when it starts with `solid` otherwise, and as (possibly truncated)
//! binary in every other case.
//!
//! # Binary Layout
//!
//! ```text
//! UINT8[80]    header
//! UINT32       triangle count
//! foreach triangle
//!     REAL32[3] normal
//!     REAL32[3] vertex 1
//!     REAL32[3] vertex 2
//!     REAL32[3] vertex 3
//!     UINT16    attribute byte count
//! end
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use mesh_types::{IndexedMesh, MeshTopology, Point3, Triangle, Vertex};
use tracing::debug;

use crate::error::{IoError, IoResult};

const HEADER_SIZE: usize = 80;
const TRIANGLE_SIZE: usize = 50;

/// Load an STL file, detecting ASCII or binary encoding.
///
/// # Errors
///
/// [`IoError::FileNotFound`] if `path` does not exist, [`IoError::Truncated`]
/// for a short binary file, or a parse error for malformed ASCII.
///
/// # Example
///
/// ```no_run
/// use mesh_io::load_stl;
///
/// let mesh = load_stl("bunny.stl").unwrap();
/// println!("{} triangles", mesh.faces.len());
/// ```
pub fn load_stl<P: AsRef<Path>>(path: P) -> IoResult<IndexedMesh> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| IoError::on_open(path, e))?;
    let mesh = parse_stl(&bytes)?;
    debug!(path = %path.display(), faces = mesh.faces.len(), "Loaded STL");
    Ok(mesh)
}

/// Parse STL content held in memory.
///
/// # Errors
///
/// See [`load_stl`].
pub fn parse_stl(bytes: &[u8]) -> IoResult<IndexedMesh> {
    if bytes.len() >= HEADER_SIZE + 4 {
        let declared = declared_count(bytes);
        if bytes.len() as u64 == expected_binary_len(declared) {
            return parse_binary(bytes, declared);
        }
    }

    if starts_with_solid(bytes) {
        return parse_ascii(BufReader::new(bytes));
    }

    if bytes.len() < HEADER_SIZE + 4 {
        return Err(IoError::invalid_content("file too small to be valid STL"));
    }
    parse_binary(bytes, declared_count(bytes))
}

fn declared_count(bytes: &[u8]) -> u32 {
    u32::from_le_bytes([
        bytes[HEADER_SIZE],
        bytes[HEADER_SIZE + 1],
        bytes[HEADER_SIZE + 2],
        bytes[HEADER_SIZE + 3],
    ])
}

fn expected_binary_len(count: u32) -> u64 {
    (HEADER_SIZE as u64 + 4) + u64::from(count) * TRIANGLE_SIZE as u64
}

fn starts_with_solid(bytes: &[u8]) -> bool {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    bytes[start..]
        .get(..5)
        .is_some_and(|w| w.eq_ignore_ascii_case(b"solid"))
}

#[allow(clippy::cast_possible_truncation)]
fn parse_binary(bytes: &[u8], declared: u32) -> IoResult<IndexedMesh> {
    let body = &bytes[HEADER_SIZE + 4..];
    let available = (body.len() / TRIANGLE_SIZE) as u64;
    if available < u64::from(declared) {
        return Err(IoError::Truncated {
            expected: declared,
            got: available as u32,
        });
    }

    let count = declared as usize;
    let mut mesh = IndexedMesh::with_capacity(count * 3, count);
    for record in body.chunks_exact(TRIANGLE_SIZE).take(count) {
        // Stored normals are recomputed downstream.
        let base = mesh.vertices.len() as u32;
        for corner in 0..3 {
            let at = 12 + corner * 12;
            mesh.vertices
                .push(Vertex::new(read_point(&record[at..at + 12])));
        }
        mesh.faces.push([base, base + 1, base + 2]);
    }
    Ok(mesh)
}

fn read_point(buf: &[u8]) -> Point3<f64> {
    let f = |i: usize| f64::from(f32::from_le_bytes([buf[i], buf[i + 1], buf[i + 2], buf[i + 3]]));
    Point3::new(f(0), f(4), f(8))
}

#[allow(clippy::cast_possible_truncation)]
fn parse_ascii<R: BufRead>(reader: R) -> IoResult<IndexedMesh> {
    let mut mesh = IndexedMesh::new();
    let mut corners: Vec<Point3<f64>> = Vec::with_capacity(3);
    let mut in_loop = false;

    for line in reader.lines() {
        let line = line?;
        let mut words = line.split_whitespace();
        let Some(keyword) = words.next() else {
            continue;
        };

        match keyword.to_ascii_lowercase().as_str() {
            "outer" => {
                in_loop = true;
                corners.clear();
            }
            "vertex" if in_loop => {
                let mut coord = || -> IoResult<f64> {
                    words
                        .next()
                        .ok_or_else(|| IoError::invalid_content("vertex needs three coordinates"))?
                        .parse::<f64>()
                        .map_err(IoError::from)
                };
                let p = Point3::new(coord()?, coord()?, coord()?);
                corners.push(p);
            }
            "endloop" => in_loop = false,
            "endfacet" => {
                if corners.len() != 3 {
                    return Err(IoError::invalid_content(format!(
                        "facet {} has {} vertices",
                        mesh.faces.len(),
                        corners.len()
                    )));
                }
                let base = mesh.vertices.len() as u32;
                mesh.vertices.extend(corners.drain(..).map(Vertex::new));
                mesh.faces.push([base, base + 1, base + 2]);
            }
            "endsolid" => break,
            _ => {}
        }
    }

    Ok(mesh)
}

/// Save a mesh as STL.
///
/// Faces referring to missing vertices are skipped.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
///
/// # Example
///
/// ```no_run
/// use mesh_io::save_stl;
/// use mesh_types::unit_cube;
///
/// save_stl(&unit_cube(), "cube.stl", true).unwrap();
/// save_stl(&unit_cube(), "cube_ascii.stl", false).unwrap();
/// ```
pub fn save_stl<P: AsRef<Path>>(mesh: &IndexedMesh, path: P, binary: bool) -> IoResult<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_stl(mesh, &mut writer, binary)?;
    writer.flush()?;
    Ok(())
}

/// Write a mesh as STL to any writer.
///
/// # Errors
///
/// Returns an error if writing fails or the mesh has more than `u32::MAX`
/// valid faces.
pub fn write_stl<W: Write>(mesh: &IndexedMesh, writer: &mut W, binary: bool) -> IoResult<()> {
    let triangles: Vec<Triangle> = mesh.triangles().collect();
    if binary {
        write_binary(&triangles, writer)
    } else {
        write_ascii(&triangles, writer)
    }
}

fn write_binary<W: Write>(triangles: &[Triangle], writer: &mut W) -> IoResult<()> {
    let mut header = [b' '; HEADER_SIZE];
    let text = b"binary STL written by mesh-io";
    header[..text.len()].copy_from_slice(text);
    writer.write_all(&header)?;

    let count = u32::try_from(triangles.len()).map_err(|_| IoError::TooLarge {
        count: triangles.len(),
    })?;
    writer.write_all(&count.to_le_bytes())?;

    for tri in triangles {
        let n = tri.normal().unwrap_or_default();
        write_f32x3(writer, n.x, n.y, n.z)?;
        for p in tri.corners() {
            write_f32x3(writer, p.x, p.y, p.z)?;
        }
        writer.write_all(&0u16.to_le_bytes())?;
    }
    Ok(())
}

#[allow(clippy::cast_possible_truncation)]
fn write_f32x3<W: Write>(writer: &mut W, x: f64, y: f64, z: f64) -> IoResult<()> {
    writer.write_all(&(x as f32).to_le_bytes())?;
    writer.write_all(&(y as f32).to_le_bytes())?;
    writer.write_all(&(z as f32).to_le_bytes())?;
    Ok(())
}

fn write_ascii<W: Write>(triangles: &[Triangle], writer: &mut W) -> IoResult<()> {
    writeln!(writer, "solid fragment")?;
    for tri in triangles {
        let n = tri.normal().unwrap_or_default();
        writeln!(writer, "  facet normal {:.6e} {:.6e} {:.6e}", n.x, n.y, n.z)?;
        writeln!(writer, "    outer loop")?;
        for p in tri.corners() {
            writeln!(writer, "      vertex {:.6e} {:.6e} {:.6e}", p.x, p.y, p.z)?;
        }
        writeln!(writer, "    endloop")?;
        writeln!(writer, "  endfacet")?;
    }
    writeln!(writer, "endsolid fragment")?;
    Ok(())
}
