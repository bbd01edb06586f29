//! Error types for mesh repair operations.

use thiserror::Error;

/// Result type for repair operations.
pub type RepairResult<T> = Result<T, RepairError>;

/// Errors that can occur during mesh repair.
///
/// Only the building blocks return these. [`crate::make_manifold`] is
/// best-effort and logs failures instead of returning them.
#[derive(Debug, Error)]
pub enum RepairError {
    /// Mesh has no vertices or no faces.
    #[error("mesh is empty")]
    EmptyMesh,

    /// A face refers to a vertex that does not exist.
    #[error("invalid vertex index {index} (mesh has {vertex_count} vertices)")]
    InvalidIndex {
        /// The offending index.
        index: u32,
        /// Number of vertices in the mesh.
        vertex_count: usize,
    },

    /// A boundary loop could not be triangulated.
    #[error("failed to fill hole: {reason}")]
    HoleFillFailed {
        /// Why the fill failed.
        reason: String,
    },
}
