//! Core mesh types for grid decomposition.
//!
//! This crate holds the data model every other mesh crate speaks:
//!
//! - [`IndexedMesh`] - vertex positions plus triangles as index triples
//! - [`Vertex`] - a position with optional normal and colour
//! - [`Aabb`] - an axis-aligned bounding box (also used for grid cells)
//! - [`Triangle`] - a triangle with resolved positions, for geometry queries
//!
//! # Units
//!
//! Coordinates are `f64` and unit-agnostic. The splitter and its defaults
//! assume millimetres, which is what printer beds are measured in.
//!
//! # Winding
//!
//! Faces are **counter-clockwise when viewed from outside**, so normals point
//! outward by the right-hand rule. A closed mesh with correct winding has a
//! positive [`IndexedMesh::signed_volume`].
//!
//! # Example
//!
//! ```
//! use mesh_types::{box_mesh, Aabb, MeshBounds, MeshTopology, Point3};
//!
//! let cube = box_mesh(&Aabb::new(
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(100.0, 100.0, 100.0),
//! ));
//!
//! assert_eq!(cube.face_count(), 12);
//! assert_eq!(cube.bounds().max, Point3::new(100.0, 100.0, 100.0));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod bounds;
mod mesh;
mod traits;
mod triangle;
mod vertex;

pub use bounds::Aabb;
pub use mesh::{box_mesh, unit_cube, IndexedMesh};
pub use traits::{MeshBounds, MeshTopology};
pub use triangle::Triangle;
pub use vertex::{Vertex, VertexColor};

pub use nalgebra::{Point3, Vector3};
