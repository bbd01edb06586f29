//! Wavefront OBJ reading and writing.
//!
//! Only geometry is read: `v` positions and `f` faces. Texture and normal
//! references in face corners (`f 1/2/3`) are ignored, negative indices are
//! resolved relative to the vertices seen so far, and polygons are
//! fan-triangulated.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use mesh_types::{IndexedMesh, Vertex};
use tracing::debug;

use crate::error::{IoError, IoResult};

/// Load an OBJ file.
///
/// # Errors
///
/// [`IoError::FileNotFound`] if `path` does not exist, a parse error for bad
/// numbers, or [`IoError::IndexOutOfRange`] for a face corner that names a
/// vertex the file never defines.
pub fn load_obj<P: AsRef<Path>>(path: P) -> IoResult<IndexedMesh> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| IoError::on_open(path, e))?;
    let mesh = read_obj(BufReader::new(file))?;
    debug!(path = %path.display(), vertices = mesh.vertices.len(), faces = mesh.faces.len(), "Loaded OBJ");
    Ok(mesh)
}

/// Parse OBJ text from any buffered reader.
///
/// # Errors
///
/// See [`load_obj`].
pub fn read_obj<R: BufRead>(reader: R) -> IoResult<IndexedMesh> {
    let mut mesh = IndexedMesh::new();
    let mut polygon: Vec<u32> = Vec::with_capacity(4);
    let mut face_number = 0usize;

    for line in reader.lines() {
        let line = line?;
        let line = line.split('#').next().unwrap_or_default();
        let mut words = line.split_whitespace();

        match words.next() {
            Some("v") => {
                let mut coords = [0.0f64; 3];
                for c in &mut coords {
                    *c = words
                        .next()
                        .ok_or_else(|| IoError::invalid_content("vertex needs three coordinates"))?
                        .parse()?;
                }
                mesh.vertices
                    .push(Vertex::from_coords(coords[0], coords[1], coords[2]));
            }
            Some("f") => {
                polygon.clear();
                for corner in words {
                    let index = corner.split('/').next().unwrap_or_default();
                    polygon.push(resolve_index(index, mesh.vertices.len(), face_number)?);
                }
                if polygon.len() < 3 {
                    return Err(IoError::invalid_content(format!(
                        "face {face_number} has {} corners",
                        polygon.len()
                    )));
                }
                for i in 1..polygon.len() - 1 {
                    mesh.faces.push([polygon[0], polygon[i], polygon[i + 1]]);
                }
                face_number += 1;
            }
            _ => {}
        }
    }

    Ok(mesh)
}

/// Turn a 1-based (or negative, relative) OBJ index into a 0-based one.
fn resolve_index(token: &str, vertex_count: usize, face: usize) -> IoResult<u32> {
    let raw: i64 = token.parse()?;
    let count = i64::try_from(vertex_count).unwrap_or(i64::MAX);
    let resolved = match raw {
        r if r > 0 => r - 1,
        r if r < 0 => count + r,
        _ => -1,
    };
    if resolved < 0 || resolved >= count {
        return Err(IoError::IndexOutOfRange {
            face,
            index: raw,
            vertex_count,
        });
    }
    u32::try_from(resolved).map_err(|_| IoError::TooLarge {
        count: vertex_count,
    })
}

/// Save a mesh as OBJ.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
///
/// # Example
///
/// ```no_run
/// use mesh_io::save_obj;
/// use mesh_types::unit_cube;
///
/// save_obj(&unit_cube(), "cube.obj").unwrap();
/// ```
pub fn save_obj<P: AsRef<Path>>(mesh: &IndexedMesh, path: P) -> IoResult<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_obj(mesh, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Write a mesh as OBJ text.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_obj<W: Write>(mesh: &IndexedMesh, writer: &mut W) -> IoResult<()> {
    writeln!(writer, "# written by mesh-io")?;
    writeln!(writer, "# {} vertices, {} faces", mesh.vertices.len(), mesh.faces.len())?;
    for v in &mesh.vertices {
        let p = v.position;
        writeln!(writer, "v {} {} {}", p.x, p.y, p.z)?;
    }
    let n = mesh.vertices.len();
    for &[a, b, c] in &mesh.faces {
        if [a, b, c].iter().any(|&i| i as usize >= n) {
            continue;
        }
        writeln!(writer, "f {} {} {}", a + 1, b + 1, c + 1)?;
    }
    Ok(())
}
