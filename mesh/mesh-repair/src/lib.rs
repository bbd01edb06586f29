//! Mesh cleanup and manifold repair.
//!
//! The entry point is [`make_manifold`], which normalizes a raw mesh before it
//! is cut into grid cells:
//!
//! 1. drop faces with bad indices, weld near-coincident vertices, drop
//!    zero-area and duplicate faces ([`clean_mesh`])
//! 2. close boundary loops by ear clipping ([`fill_holes`])
//! 3. orient every connected shell consistently, outward for solids and
//!    inward for cavities ([`fix_winding_order`])
//! 4. recompute area-weighted vertex normals ([`compute_vertex_normals`])
//!
//! The individual passes are public so the capping stage can reuse them on
//! cut fragments. [`validate_mesh`] reports what is left.
//!
//! # Example
//!
//! ```
//! use mesh_types::unit_cube;
//! use mesh_repair::{make_manifold, validate_mesh, ManifoldParams};
//!
//! let mut mesh = unit_cube();
//! mesh.faces.pop();
//!
//! let summary = make_manifold(&mut mesh, &ManifoldParams::default());
//! assert_eq!(summary.holes_filled, 1);
//! assert!(validate_mesh(&mesh).is_closed_solid());
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]

mod adjacency;
mod error;
pub mod holes;
mod manifold;
mod normals;
mod repair;
mod validate;
pub mod winding;

pub use adjacency::MeshAdjacency;
pub use error::{RepairError, RepairResult};
pub use holes::{
    chain_edges, detect_holes, fill_hole_ear_clipping, fill_holes, BoundaryLoop, EdgeChains,
};
pub use manifold::{make_manifold, ManifoldParams, ManifoldSummary};
pub use normals::compute_vertex_normals;
pub use repair::{
    clean_mesh, remove_degenerate_triangles, remove_duplicate_faces, remove_invalid_faces,
    remove_unreferenced_vertices, weld_vertices, CleanupSummary,
};
pub use validate::{validate_mesh, MeshReport};
pub use winding::{count_inconsistent_faces, fix_winding_order};
