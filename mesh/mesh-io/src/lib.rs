//! Mesh file reading and writing.
//!
//! - **STL**: binary and ASCII, loaded as a triangle soup
//! - **OBJ**: ASCII, polygons fan-triangulated
//! - **PLY**: binary and ASCII, with optional per-vertex colour
//!
//! Loading is the only way geometry enters the pipeline and saving is the
//! only way fragments leave it, so both sides report missing files and bad
//! content as typed [`IoError`]s rather than panicking.
//!
//! # Example
//!
//! ```no_run
//! use mesh_io::{load_mesh, save_mesh_with, MeshFormat};
//!
//! let mesh = load_mesh("model.obj").unwrap();
//! save_mesh_with(&mesh, "model.stl", MeshFormat::Stl, false).unwrap();
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]

mod error;
mod obj;
mod ply;
mod stl;

pub use error::{IoError, IoResult};
pub use obj::{load_obj, read_obj, save_obj, write_obj};
pub use ply::{load_ply, save_ply};
pub use stl::{load_stl, parse_stl, save_stl, write_stl};

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use mesh_types::IndexedMesh;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Supported mesh file formats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum MeshFormat {
    /// Stereolithography, binary or ASCII.
    #[default]
    Stl,
    /// Wavefront OBJ.
    Obj,
    /// Polygon File Format, binary or ASCII.
    Ply,
}

impl MeshFormat {
    /// All formats, in the order they are listed to users.
    pub const ALL: [Self; 3] = [Self::Stl, Self::Obj, Self::Ply];

    /// Detect the format from a file extension, ignoring case.
    #[must_use]
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        path.as_ref().extension()?.to_str()?.parse().ok()
    }

    /// Canonical lowercase file extension.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Stl => "stl",
            Self::Obj => "obj",
            Self::Ply => "ply",
        }
    }
}

impl fmt::Display for MeshFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for MeshFormat {
    type Err = IoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "stl" => Ok(Self::Stl),
            "obj" => Ok(Self::Obj),
            "ply" => Ok(Self::Ply),
            _ => Err(IoError::UnknownFormat {
                extension: s.to_string(),
            }),
        }
    }
}

fn format_of(path: &Path) -> IoResult<MeshFormat> {
    MeshFormat::from_path(path).ok_or_else(|| IoError::UnknownFormat {
        extension: path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("(none)")
            .to_string(),
    })
}

/// Load a mesh, choosing the reader from the file extension.
///
/// # Errors
///
/// [`IoError::UnknownFormat`] for an unsupported extension, otherwise
/// whatever the format reader reports.
pub fn load_mesh<P: AsRef<Path>>(path: P) -> IoResult<IndexedMesh> {
    let path = path.as_ref();
    match format_of(path)? {
        MeshFormat::Stl => load_stl(path),
        MeshFormat::Obj => load_obj(path),
        MeshFormat::Ply => load_ply(path),
    }
}

/// Save a mesh, choosing the writer from the file extension.
///
/// STL and PLY are written binary.
///
/// # Errors
///
/// [`IoError::UnknownFormat`] for an unsupported extension, otherwise any
/// write failure.
pub fn save_mesh<P: AsRef<Path>>(mesh: &IndexedMesh, path: P) -> IoResult<()> {
    let path = path.as_ref();
    save_mesh_with(mesh, path, format_of(path)?, true)
}

/// Save a mesh in an explicit format, regardless of the path's extension.
///
/// `binary` selects the encoding for STL and PLY and is ignored for OBJ.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn save_mesh_with<P: AsRef<Path>>(
    mesh: &IndexedMesh,
    path: P,
    format: MeshFormat,
    binary: bool,
) -> IoResult<()> {
    match format {
        MeshFormat::Stl => save_stl(mesh, path, binary),
        MeshFormat::Obj => save_obj(mesh, path),
        MeshFormat::Ply => save_ply(mesh, path, binary),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use mesh_types::{unit_cube, MeshTopology};

    #[test]
    fn format_from_path() {
        assert_eq!(MeshFormat::from_path("model.stl"), Some(MeshFormat::Stl));
        assert_eq!(MeshFormat::from_path("MODEL.STL"), Some(MeshFormat::Stl));
        assert_eq!(MeshFormat::from_path("/a/b/model.obj"), Some(MeshFormat::Obj));
        assert_eq!(MeshFormat::from_path("scan.PLY"), Some(MeshFormat::Ply));
        assert_eq!(MeshFormat::from_path("model.3mf"), None);
        assert_eq!(MeshFormat::from_path("model"), None);
        assert_eq!(MeshFormat::from_path(""), None);
    }

    #[test]
    fn format_names() {
        for format in MeshFormat::ALL {
            assert_eq!(format.to_string().parse::<MeshFormat>().unwrap(), format);
        }
        assert_eq!(MeshFormat::default(), MeshFormat::Stl);
        assert!("step".parse::<MeshFormat>().is_err());
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = load_mesh("model.xyz").unwrap_err();
        assert_eq!(err.to_string(), "unknown file format: .xyz");
        assert!(matches!(
            save_mesh(&unit_cube(), "noext"),
            Err(IoError::UnknownFormat { .. })
        ));
    }

    #[test]
    fn every_format_roundtrips_the_cube() {
        let dir = tempfile::tempdir().unwrap();
        for format in MeshFormat::ALL {
            for binary in [true, false] {
                let path = dir.path().join(format!("cube_{binary}.{format}"));
                save_mesh_with(&unit_cube(), &path, format, binary).unwrap();
                let loaded = load_mesh(&path).unwrap();
                assert_eq!(loaded.face_count(), 12, "{format} binary={binary}");
                assert!((loaded.signed_volume() - 1.0).abs() < 1e-6);
            }
        }
    }
}
