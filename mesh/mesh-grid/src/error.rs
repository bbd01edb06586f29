//! Error types for grid decomposition.

use mesh_clip::ClipError;
use mesh_io::IoError;
use thiserror::Error;

/// Errors that abort a split before any cell is processed.
#[derive(Debug, Error)]
pub enum GridError {
    /// Mesh has no vertices.
    #[error("Mesh has no vertices")]
    EmptyMesh,

    /// A cell size component is zero, negative or not a number.
    #[error(
        "Invalid grid size {}x{}x{} (every component must be > 0)",
        .size[0],
        .size[1],
        .size[2]
    )]
    InvalidGridSize {
        /// The rejected cell size.
        size: [f64; 3],
    },

    /// The cell count does not fit in `usize`.
    #[error("Grid of {}x{}x{} cells is too large", .dims[0], .dims[1], .dims[2])]
    TooManyCells {
        /// Cells per axis.
        dims: [usize; 3],
    },

    /// Reading the input or preparing the output failed.
    #[error(transparent)]
    Io(#[from] IoError),
}

/// Result type for grid decomposition.
pub type GridResult<T> = std::result::Result<T, GridError>;

/// Why a single cell produced no fragment.
///
/// These never abort a run; they are collected into the
/// [`SplitReport`](crate::SplitReport).
#[derive(Debug, Error)]
pub enum CellError {
    /// Capping the clipped surface failed.
    #[error("capping failed: {0}")]
    Cap(#[from] ClipError),

    /// Writing the fragment failed.
    #[error("write failed: {0}")]
    Emit(#[from] IoError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(GridError::EmptyMesh.to_string(), "Mesh has no vertices");

        let err = GridError::InvalidGridSize {
            size: [50.0, 0.0, 50.0],
        };
        assert_eq!(
            err.to_string(),
            "Invalid grid size 50x0x50 (every component must be > 0)"
        );

        let err = GridError::TooManyCells { dims: [4, 5, 6] };
        assert_eq!(err.to_string(), "Grid of 4x5x6 cells is too large");

        let err = CellError::Cap(ClipError::OpenBoundary { edges: 4 });
        assert!(err.to_string().starts_with("capping failed:"));
    }

    #[test]
    fn io_errors_pass_through() {
        let err: GridError = IoError::FileNotFound {
            path: "missing.stl".into(),
        }
        .into();
        assert!(err.to_string().contains("missing.stl"));
    }
}
