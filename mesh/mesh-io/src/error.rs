//! Error types for mesh I/O.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for mesh I/O operations.
pub type IoResult<T> = Result<T, IoError>;

/// Errors raised while reading or writing mesh files.
#[derive(Debug, Error)]
pub enum IoError {
    /// The input path does not exist.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was not found.
        path: PathBuf,
    },

    /// The extension does not name a supported format.
    #[error("unknown file format: .{extension}")]
    UnknownFormat {
        /// The unrecognized extension.
        extension: String,
    },

    /// The file parsed but its content is not a usable mesh.
    #[error("invalid file content: {message}")]
    InvalidContent {
        /// Description of what was invalid.
        message: String,
    },

    /// A binary STL ended before its declared triangle count.
    #[error("truncated STL: header declares {expected} triangles, file holds {got}")]
    Truncated {
        /// Triangle count from the header.
        expected: u32,
        /// Complete triangles present.
        got: u32,
    },

    /// A face refers to a vertex the file does not define.
    #[error("face {face} refers to vertex {index}, but only {vertex_count} exist")]
    IndexOutOfRange {
        /// Face number in file order.
        face: usize,
        /// Offending vertex index.
        index: i64,
        /// Vertices defined.
        vertex_count: usize,
    },

    /// The mesh has more vertices than a `u32` index can address.
    #[error("mesh too large: {count} vertices")]
    TooLarge {
        /// Vertex count.
        count: usize,
    },

    /// Underlying I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Bad floating point literal in a text format.
    #[error("float parsing error: {0}")]
    ParseFloat(#[from] std::num::ParseFloatError),

    /// Bad integer literal in a text format.
    #[error("integer parsing error: {0}")]
    ParseInt(#[from] std::num::ParseIntError),
}

impl IoError {
    /// Create an `InvalidContent` error with the given message.
    #[must_use]
    pub fn invalid_content(message: impl Into<String>) -> Self {
        Self::InvalidContent {
            message: message.into(),
        }
    }

    /// Map an open failure, turning `NotFound` into [`IoError::FileNotFound`].
    pub(crate) fn on_open(path: &Path, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            Self::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            Self::Io(err)
        }
    }
}
