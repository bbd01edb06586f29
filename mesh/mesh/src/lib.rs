//! Split meshes that are too big for a printer into closed, printable parts.
//!
//! This umbrella crate re-exports the mesh-* crates behind one dependency.
//!
//! # Quick Start
//!
//! ```no_run
//! use mesh::prelude::*;
//!
//! // Load and normalize
//! let mut mesh = load_mesh("model.stl").unwrap();
//! let summary = make_manifold(&mut mesh, &ManifoldParams::default());
//! println!("{summary}");
//!
//! // Cut into 60 mm cubes and write part_x<i>_y<j>_z<k>.stl files
//! let params = SplitParams::default().with_grid_size(Vector3::new(60.0, 60.0, 60.0));
//! let sink = FragmentEmitter::new("output_parts", params.format);
//! let report = GridSplitter::new(&mesh, params).run(&sink, &mut ()).unwrap();
//! println!("{report}");
//! ```
//!
//! # Module Organization
//!
//! - [`types`] - Core data structures: `IndexedMesh`, `Vertex`, `Triangle`, `Aabb`
//! - [`io`] - File I/O for STL, OBJ and PLY
//! - [`repair`] - Welding, hole filling, orientation and validation
//! - [`clip`] - Box clipping and planar capping
//! - [`grid`] - Lattice, fragment output and the split loop

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

// =============================================================================
// Re-exports
// =============================================================================

/// Core data structures: `IndexedMesh`, `Vertex`, `Triangle`, `Aabb`.
pub use mesh_types as types;

/// File I/O for STL, OBJ and PLY.
pub use mesh_io as io;

/// Mesh validation and repair.
pub use mesh_repair as repair;

/// Box clipping and planar capping.
pub use mesh_clip as clip;

/// Grid decomposition.
pub use mesh_grid as grid;

// =============================================================================
// Prelude
// =============================================================================

/// Common imports for splitting meshes.
///
/// # Usage
///
/// ```
/// use mesh::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use mesh_types::{Aabb, IndexedMesh, MeshBounds, MeshTopology, Point3, Vector3, Vertex};

    // I/O
    pub use mesh_io::{load_mesh, save_mesh, MeshFormat};

    // Repair
    pub use mesh_repair::{make_manifold, validate_mesh, ManifoldParams, MeshReport};

    // Capping
    pub use mesh_clip::{CapParams, SurfaceCap, SurfaceCapper};

    // Splitting (main use case)
    pub use mesh_grid::{
        split_file, FragmentEmitter, FragmentObserver, FragmentSink, GridPartition, GridSplitter,
        SplitParams, SplitReport,
    };
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prelude_imports() {
        use prelude::*;

        let mesh = IndexedMesh::new();
        assert_eq!(mesh.vertex_count(), 0);
        assert_eq!(mesh.face_count(), 0);
        assert_eq!(SplitParams::default().format, MeshFormat::Stl);
    }

    #[test]
    fn test_module_reexports() {
        let _ = types::IndexedMesh::new();
        let _ = repair::ManifoldParams::default();
        let _ = clip::CapParams::default();
        let _ = grid::SplitParams::default();
    }
}
