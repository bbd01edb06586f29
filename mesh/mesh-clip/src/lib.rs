//! Box clipping and planar capping for grid decomposition.
//!
//! Two operations work on one grid cell at a time:
//!
//! - [`clip_to_box`] keeps the part of a surface inside a box and leaves it
//!   open. It answers "does this cell contain any surface" and is the raw
//!   output when capping is turned off.
//! - [`SurfaceCapper`] produces a closed solid for the cell. It cuts the
//!   source mesh with each face of the box and triangulates a flat cap in
//!   every cut ([`cap_to_box`]), then closes anything still open with the
//!   generic hole fill from `mesh-repair` ([`close_remaining_holes`]).
//!
//! # Example
//!
//! ```
//! use mesh_clip::{clip_to_box, SurfaceCap, SurfaceCapper};
//! use mesh_repair::MeshAdjacency;
//! use mesh_types::{unit_cube, Aabb, Point3};
//!
//! let cube = unit_cube();
//! let cell = Aabb::new(Point3::new(0.5, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
//!
//! let raw = clip_to_box(&cube, &cell, 1e-9).unwrap();
//! assert!(!MeshAdjacency::build(&raw.faces).is_watertight());
//!
//! let closed = SurfaceCapper::default().cap(&cube, &cell).unwrap();
//! assert!(MeshAdjacency::build(&closed.mesh.faces).is_watertight());
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]

mod capper;
mod clip;
mod cut;
mod error;
mod params;
mod plane;
pub mod polygon;

pub use capper::{
    cap_to_box, close_remaining_holes, CapOutput, FallbackSummary, SurfaceCap, SurfaceCapper,
};
pub use clip::clip_to_box;
pub use cut::{cut_and_cap, CutStats};
pub use error::{ClipError, ClipResult};
pub use params::CapParams;
pub use plane::{AxisPlane, KeepSide, PlaneSide};
