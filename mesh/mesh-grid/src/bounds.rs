//! Bounding box of the working mesh.

use mesh_types::{Aabb, IndexedMesh, MeshBounds};

use crate::error::{GridError, GridResult};

/// Component-wise min/max over every vertex position.
///
/// Unreferenced vertices count. Run the repair passes first if stray
/// vertices should not widen the grid.
///
/// # Errors
///
/// [`GridError::EmptyMesh`] if the mesh has no vertices.
///
/// # Example
///
/// ```
/// use mesh_grid::compute_bounds;
/// use mesh_types::{unit_cube, Point3};
///
/// let bounds = compute_bounds(&unit_cube()).unwrap();
/// assert_eq!(bounds.max, Point3::new(1.0, 1.0, 1.0));
/// ```
pub fn compute_bounds(mesh: &IndexedMesh) -> GridResult<Aabb> {
    if mesh.vertices.is_empty() {
        return Err(GridError::EmptyMesh);
    }
    Ok(mesh.bounds())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_types::{Point3, Vertex};

    #[test]
    fn bounds_of_scattered_points() {
        let mesh = IndexedMesh::from_parts(
            vec![
                Vertex::from_coords(3.0, -1.0, 7.5),
                Vertex::from_coords(-2.0, 4.0, 0.0),
                Vertex::from_coords(0.0, 0.0, -9.0),
            ],
            vec![[0, 1, 2]],
        );
        let b = compute_bounds(&mesh).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(b.min, Point3::new(-2.0, -1.0, -9.0));
        assert_eq!(b.max, Point3::new(3.0, 4.0, 7.5));
    }

    #[test]
    fn empty_mesh_is_rejected() {
        assert!(matches!(
            compute_bounds(&IndexedMesh::new()),
            Err(GridError::EmptyMesh)
        ));
    }

    #[test]
    fn flat_mesh_gives_degenerate_box() {
        let mesh = IndexedMesh::from_parts(
            vec![
                Vertex::from_coords(0.0, 0.0, 5.0),
                Vertex::from_coords(1.0, 0.0, 5.0),
                Vertex::from_coords(0.0, 1.0, 5.0),
            ],
            vec![[0, 1, 2]],
        );
        let b = compute_bounds(&mesh).unwrap_or_else(|e| panic!("{e}"));
        assert!(b.is_degenerate());
    }
}
