//! PLY (Polygon File Format) reading and writing.
//!
//! Besides positions and faces, PLY carries optional per-vertex colour
//! (`red`, `green`, `blue` as `uchar`). Colour is what the preview output
//! uses to tell fragments apart, so it survives a save/load round trip.
//!
//! Loading accepts ASCII and both binary encodings through `ply-rs`.
//! Binary saving is written by hand because `ply-rs` emits the element count
//! instead of the list length for binary list properties.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use mesh_types::{IndexedMesh, Vertex, VertexColor};
use ply_rs::parser::Parser;
use ply_rs::ply::{
    Addable, DefaultElement, ElementDef, Encoding, Ply, Property, PropertyDef, PropertyType,
    ScalarType,
};
use ply_rs::writer::Writer;
use tracing::debug;

use crate::error::{IoError, IoResult};

/// Colour written for uncoloured vertices of a partly coloured mesh.
const DEFAULT_COLOR: VertexColor = VertexColor::new(255, 255, 255);

/// Load a PLY file.
///
/// # Errors
///
/// [`IoError::FileNotFound`] if `path` does not exist,
/// [`IoError::InvalidContent`] if the header or payload cannot be parsed or a
/// vertex lacks a coordinate, [`IoError::IndexOutOfRange`] for a bad face.
///
/// # Example
///
/// ```no_run
/// use mesh_io::load_ply;
///
/// let mesh = load_ply("scan.ply").unwrap();
/// println!("{} vertices", mesh.vertices.len());
/// ```
pub fn load_ply<P: AsRef<Path>>(path: P) -> IoResult<IndexedMesh> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| IoError::on_open(path, e))?;
    let mut reader = BufReader::new(file);

    let parser = Parser::<DefaultElement>::new();
    let header = parser
        .read_header(&mut reader)
        .map_err(|e| IoError::invalid_content(format!("failed to parse PLY header: {e}")))?;
    let payload = parser
        .read_payload(&mut reader, &header)
        .map_err(|e| IoError::invalid_content(format!("failed to read PLY payload: {e}")))?;

    let mut mesh = IndexedMesh::new();

    if let Some(elements) = payload.get("vertex") {
        mesh.vertices.reserve(elements.len());
        for element in elements {
            let coord = |key: &str| {
                scalar(element, key).ok_or_else(|| {
                    IoError::invalid_content(format!("vertex without numeric '{key}'"))
                })
            };
            let mut vertex = Vertex::from_coords(coord("x")?, coord("y")?, coord("z")?);
            vertex.color = color(element);
            mesh.vertices.push(vertex);
        }
    }

    if let Some(elements) = payload.get("face") {
        mesh.faces.reserve(elements.len());
        let vertex_count = mesh.vertices.len();
        for (face, element) in elements.iter().enumerate() {
            let indices = index_list(element);
            let mut polygon = Vec::with_capacity(indices.len());
            for index in indices {
                match u32::try_from(index) {
                    Ok(i) if (i as usize) < vertex_count => polygon.push(i),
                    _ => {
                        return Err(IoError::IndexOutOfRange {
                            face,
                            index,
                            vertex_count,
                        })
                    }
                }
            }
            for i in 1..polygon.len().saturating_sub(1) {
                mesh.faces.push([polygon[0], polygon[i], polygon[i + 1]]);
            }
        }
    }

    debug!(path = %path.display(), vertices = mesh.vertices.len(), faces = mesh.faces.len(), "Loaded PLY");
    Ok(mesh)
}

fn scalar(element: &DefaultElement, key: &str) -> Option<f64> {
    Some(match element.get(key)? {
        Property::Float(v) => f64::from(*v),
        Property::Double(v) => *v,
        Property::Int(v) => f64::from(*v),
        Property::UInt(v) => f64::from(*v),
        Property::Short(v) => f64::from(*v),
        Property::UShort(v) => f64::from(*v),
        Property::Char(v) => f64::from(*v),
        Property::UChar(v) => f64::from(*v),
        _ => return None,
    })
}

fn color(element: &DefaultElement) -> Option<VertexColor> {
    let channel = |key: &str| match element.get(key)? {
        Property::UChar(v) => Some(*v),
        _ => None,
    };
    Some(VertexColor::new(
        channel("red")?,
        channel("green")?,
        channel("blue")?,
    ))
}

fn index_list(element: &DefaultElement) -> Vec<i64> {
    for key in ["vertex_indices", "vertex_index"] {
        let list: Vec<i64> = match element.get(key) {
            Some(Property::ListInt(v)) => v.iter().map(|&i| i64::from(i)).collect(),
            Some(Property::ListUInt(v)) => v.iter().map(|&i| i64::from(i)).collect(),
            Some(Property::ListShort(v)) => v.iter().map(|&i| i64::from(i)).collect(),
            Some(Property::ListUShort(v)) => v.iter().map(|&i| i64::from(i)).collect(),
            Some(Property::ListChar(v)) => v.iter().map(|&i| i64::from(i)).collect(),
            Some(Property::ListUChar(v)) => v.iter().map(|&i| i64::from(i)).collect(),
            _ => continue,
        };
        return list;
    }
    Vec::new()
}

/// Save a mesh as PLY.
///
/// Colour properties are written when any vertex carries a colour.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn save_ply<P: AsRef<Path>>(mesh: &IndexedMesh, path: P, binary: bool) -> IoResult<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    if binary {
        write_binary(mesh, &mut writer)?;
    } else {
        write_ascii(mesh, &mut writer)?;
    }
    writer.flush()?;
    Ok(())
}

fn has_colors(mesh: &IndexedMesh) -> bool {
    mesh.vertices.iter().any(|v| v.color.is_some())
}

fn valid_faces(mesh: &IndexedMesh) -> impl Iterator<Item = &[u32; 3]> {
    let n = mesh.vertices.len();
    mesh.faces
        .iter()
        .filter(move |f| f.iter().all(|&i| (i as usize) < n))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
fn write_binary<W: Write>(mesh: &IndexedMesh, writer: &mut W) -> IoResult<()> {
    let colored = has_colors(mesh);
    let face_count = valid_faces(mesh).count();

    writeln!(writer, "ply")?;
    writeln!(writer, "format binary_little_endian 1.0")?;
    writeln!(writer, "comment written by mesh-io")?;
    writeln!(writer, "element vertex {}", mesh.vertices.len())?;
    for axis in ["x", "y", "z"] {
        writeln!(writer, "property float {axis}")?;
    }
    if colored {
        for channel in ["red", "green", "blue"] {
            writeln!(writer, "property uchar {channel}")?;
        }
    }
    writeln!(writer, "element face {face_count}")?;
    writeln!(writer, "property list uchar int vertex_indices")?;
    writeln!(writer, "end_header")?;

    for v in &mesh.vertices {
        for c in v.position.coords.iter() {
            writer.write_all(&(*c as f32).to_le_bytes())?;
        }
        if colored {
            let c = v.color.unwrap_or(DEFAULT_COLOR);
            writer.write_all(&[c.r, c.g, c.b])?;
        }
    }

    for face in valid_faces(mesh) {
        writer.write_all(&[3u8])?;
        for &i in face {
            writer.write_all(&(i as i32).to_le_bytes())?;
        }
    }
    Ok(())
}

#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
fn write_ascii<W: Write>(mesh: &IndexedMesh, writer: &mut W) -> IoResult<()> {
    let colored = has_colors(mesh);
    let mut ply = Ply::<DefaultElement>::new();
    ply.header.encoding = Encoding::Ascii;
    ply.header.comments.push("written by mesh-io".to_string());

    let mut vertex_def = ElementDef::new("vertex".to_string());
    for axis in ["x", "y", "z"] {
        vertex_def.properties.add(PropertyDef::new(
            axis.to_string(),
            PropertyType::Scalar(ScalarType::Float),
        ));
    }
    if colored {
        for channel in ["red", "green", "blue"] {
            vertex_def.properties.add(PropertyDef::new(
                channel.to_string(),
                PropertyType::Scalar(ScalarType::UChar),
            ));
        }
    }
    vertex_def.count = mesh.vertices.len();
    ply.header.elements.add(vertex_def);

    let faces: Vec<&[u32; 3]> = valid_faces(mesh).collect();
    let mut face_def = ElementDef::new("face".to_string());
    face_def.properties.add(PropertyDef::new(
        "vertex_indices".to_string(),
        PropertyType::List(ScalarType::UChar, ScalarType::Int),
    ));
    face_def.count = faces.len();
    ply.header.elements.add(face_def);

    let vertices = mesh
        .vertices
        .iter()
        .map(|v| {
            let mut element = DefaultElement::new();
            element.insert("x".to_string(), Property::Float(v.position.x as f32));
            element.insert("y".to_string(), Property::Float(v.position.y as f32));
            element.insert("z".to_string(), Property::Float(v.position.z as f32));
            if colored {
                let c = v.color.unwrap_or(DEFAULT_COLOR);
                element.insert("red".to_string(), Property::UChar(c.r));
                element.insert("green".to_string(), Property::UChar(c.g));
                element.insert("blue".to_string(), Property::UChar(c.b));
            }
            element
        })
        .collect();
    ply.payload.insert("vertex".to_string(), vertices);

    let face_elements = faces
        .iter()
        .map(|f| {
            let mut element = DefaultElement::new();
            element.insert(
                "vertex_indices".to_string(),
                Property::ListInt(f.iter().map(|&i| i as i32).collect()),
            );
            element
        })
        .collect();
    ply.payload.insert("face".to_string(), face_elements);

    Writer::new()
        .write_ply(writer, &mut ply)
        .map_err(|e| IoError::invalid_content(format!("failed to write PLY: {e}")))?;
    Ok(())
}
