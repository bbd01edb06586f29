//! Vertex normal recomputation.

use mesh_types::{IndexedMesh, Triangle, Vector3};
use tracing::debug;

/// Recompute per-vertex normals as the area-weighted mean of incident face
/// normals.
///
/// Vertices with no incident area get `None`. Faces with bad indices are
/// skipped.
///
/// ```
/// use mesh_types::unit_cube;
/// use mesh_repair::compute_vertex_normals;
///
/// let mut cube = unit_cube();
/// compute_vertex_normals(&mut cube);
///
/// // Corner at the origin points away from the cube.
/// let n = cube.vertices[0].normal.unwrap_or_default();
/// assert!(n.x < 0.0 && n.y < 0.0 && n.z < 0.0);
/// ```
pub fn compute_vertex_normals(mesh: &mut IndexedMesh) {
    let mut accum = vec![Vector3::<f64>::zeros(); mesh.vertices.len()];

    for &[a, b, c] in &mesh.faces {
        let (Some(va), Some(vb), Some(vc)) = (
            mesh.vertices.get(a as usize),
            mesh.vertices.get(b as usize),
            mesh.vertices.get(c as usize),
        ) else {
            continue;
        };
        // Length is twice the area, which is the weight we want.
        let n = Triangle::new(va.position, vb.position, vc.position).normal_unnormalized();
        for i in [a, b, c] {
            accum[i as usize] += n;
        }
    }

    for (vertex, n) in mesh.vertices.iter_mut().zip(accum) {
        vertex.normal = n.try_normalize(f64::EPSILON);
    }

    debug!(vertices = mesh.vertices.len(), "Computed vertex normals");
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_types::Vertex;

    #[test]
    fn flat_patch_normals_point_up() {
        let mut mesh = IndexedMesh::new();
        mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(0.0, 1.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(5.0, 5.0, 5.0));
        mesh.faces.push([0, 1, 2]);

        compute_vertex_normals(&mut mesh);

        for v in &mesh.vertices[..3] {
            assert_eq!(v.normal, Some(Vector3::z()));
        }
        assert!(mesh.vertices[3].normal.is_none());
    }
}
