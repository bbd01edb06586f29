//! Error types for clipping and capping.

use mesh_repair::RepairError;
use thiserror::Error;

/// Result type for clipping and capping.
pub type ClipResult<T> = Result<T, ClipError>;

/// Geometric failures while cutting or closing one fragment.
///
/// These never abort a whole split: the caller records them against the
/// cell that produced them and moves on.
#[derive(Debug, Error)]
pub enum ClipError {
    /// The box has an inverted or NaN extent.
    #[error("invalid clip box: {reason}")]
    InvalidBox {
        /// What is wrong with the box.
        reason: String,
    },

    /// A planar cap contour could not be triangulated.
    #[error("cap triangulation failed on {plane}: {reason}")]
    Triangulation {
        /// Cutting plane, e.g. `x <= 60`.
        plane: String,
        /// Triangulator message.
        reason: String,
    },

    /// Open edges survived both capping stages.
    #[error("fragment still has {edges} open edges after capping")]
    OpenBoundary {
        /// Remaining boundary edge count.
        edges: usize,
    },

    /// Some edge is shared by more than two faces after capping.
    #[error("fragment has {edges} non-manifold edges after capping")]
    NonManifold {
        /// Edges with more than two faces.
        edges: usize,
    },

    /// A repair building block failed during the fallback stage.
    #[error("hole fill failed: {0}")]
    Repair(#[from] RepairError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        let err = ClipError::OpenBoundary { edges: 4 };
        assert_eq!(err.to_string(), "fragment still has 4 open edges after capping");

        let err = ClipError::NonManifold { edges: 2 };
        assert_eq!(err.to_string(), "fragment has 2 non-manifold edges after capping");

        let err = ClipError::from(RepairError::EmptyMesh);
        assert_eq!(err.to_string(), "hole fill failed: mesh is empty");
    }
}
