//! Mesh health report.

use std::fmt;

use hashbrown::HashSet;
use mesh_types::{IndexedMesh, MeshTopology};

use crate::adjacency::MeshAdjacency;
use crate::repair::canonical_face;

/// Topology and orientation summary of a mesh.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MeshReport {
    /// Number of vertices.
    pub vertex_count: usize,
    /// Number of faces.
    pub face_count: usize,
    /// Number of distinct undirected edges.
    pub edge_count: usize,
    /// Edges with one incident face.
    pub boundary_edge_count: usize,
    /// Edges with more than two incident faces.
    pub non_manifold_edge_count: usize,
    /// Faces referring to a missing vertex.
    pub invalid_face_count: usize,
    /// Faces repeating an earlier face with the same winding.
    pub duplicate_face_count: usize,
    /// No boundary edges.
    pub is_watertight: bool,
    /// No non-manifold edges.
    pub is_manifold: bool,
    /// Signed volume is negative.
    pub is_inside_out: bool,
}

impl MeshReport {
    /// Watertight, manifold and wound outward.
    #[must_use]
    pub fn is_closed_solid(&self) -> bool {
        self.is_watertight && self.is_manifold && !self.is_inside_out
    }
}

impl fmt::Display for MeshReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} verts, {} faces, {} edges ({} open, {} non-manifold)",
            self.vertex_count,
            self.face_count,
            self.edge_count,
            self.boundary_edge_count,
            self.non_manifold_edge_count
        )?;
        if self.invalid_face_count > 0 {
            write!(f, ", {} invalid faces", self.invalid_face_count)?;
        }
        if self.is_inside_out {
            write!(f, ", inside-out")?;
        }
        Ok(())
    }
}

/// Inspect `mesh` without changing it.
///
/// ```
/// use mesh_types::unit_cube;
/// use mesh_repair::validate_mesh;
///
/// let report = validate_mesh(&unit_cube());
/// assert!(report.is_closed_solid());
/// assert_eq!(report.edge_count, 18);
/// ```
#[must_use]
pub fn validate_mesh(mesh: &IndexedMesh) -> MeshReport {
    let adjacency = MeshAdjacency::build(&mesh.faces);
    let vertex_count = mesh.vertices.len();

    let invalid_face_count = mesh
        .faces
        .iter()
        .filter(|f| f.iter().any(|&i| i as usize >= vertex_count))
        .count();

    let mut seen = HashSet::new();
    let duplicate_face_count = mesh
        .faces
        .iter()
        .filter(|&&f| !seen.insert(canonical_face(f)))
        .count();

    MeshReport {
        vertex_count,
        face_count: mesh.face_count(),
        edge_count: adjacency.edge_count(),
        boundary_edge_count: adjacency.boundary_edge_count(),
        non_manifold_edge_count: adjacency.non_manifold_edge_count(),
        invalid_face_count,
        duplicate_face_count,
        is_watertight: adjacency.is_watertight(),
        is_manifold: adjacency.is_manifold(),
        is_inside_out: mesh.is_inside_out(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_types::unit_cube;

    #[test]
    fn open_cube_is_not_watertight() {
        let mut mesh = unit_cube();
        mesh.faces.pop();
        let report = validate_mesh(&mesh);
        assert!(!report.is_watertight);
        assert_eq!(report.boundary_edge_count, 3);
        assert!(!report.is_closed_solid());
    }

    #[test]
    fn inside_out_is_flagged() {
        let mut mesh = unit_cube();
        mesh.flip_normals();
        let report = validate_mesh(&mesh);
        assert!(report.is_inside_out);
        assert!(report.to_string().ends_with("inside-out"));
    }

    #[test]
    fn duplicates_and_invalid_faces_are_counted() {
        let mut mesh = unit_cube();
        mesh.faces.push([3, 0, 2]);
        mesh.faces.push([0, 1, 42]);
        let report = validate_mesh(&mesh);
        assert_eq!(report.duplicate_face_count, 1);
        assert_eq!(report.invalid_face_count, 1);
    }

    #[test]
    fn display_summary() {
        let report = validate_mesh(&unit_cube());
        assert_eq!(
            report.to_string(),
            "8 verts, 12 faces, 18 edges (0 open, 0 non-manifold)"
        );
    }
}
