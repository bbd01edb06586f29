//! Read-only mesh access traits.

use crate::{Aabb, Triangle, Vertex};

/// Counts and element access for a triangle mesh.
pub trait MeshTopology {
    /// Number of vertices.
    fn vertex_count(&self) -> usize;

    /// Number of triangles.
    fn face_count(&self) -> usize;

    /// True when there is nothing to render: no vertices or no faces.
    fn is_empty(&self) -> bool {
        self.vertex_count() == 0 || self.face_count() == 0
    }

    /// Vertex at `index`, if any.
    fn vertex(&self, index: usize) -> Option<&Vertex>;

    /// Face at `index` as vertex indices, if any.
    fn face(&self, index: usize) -> Option<[u32; 3]>;

    /// Face at `index` with resolved positions.
    ///
    /// `None` if the face or one of its vertices does not exist.
    fn triangle(&self, face_index: usize) -> Option<Triangle>;

    /// Iterate over resolved triangles, skipping faces with bad indices.
    fn triangles(&self) -> impl Iterator<Item = Triangle>;
}

/// Types with a spatial extent.
pub trait MeshBounds {
    /// Axis-aligned extent. Empty when there are no vertices.
    fn bounds(&self) -> Aabb;

    /// Extent, or `None` when empty.
    fn bounds_opt(&self) -> Option<Aabb> {
        let b = self.bounds();
        if b.is_empty() {
            None
        } else {
            Some(b)
        }
    }
}
