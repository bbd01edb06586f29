//! Edge-to-face adjacency.

use hashbrown::HashMap;
use smallvec::SmallVec;

/// Faces incident to one undirected edge. Two for a manifold interior edge.
type EdgeFaces = SmallVec<[usize; 2]>;

/// Edge-to-face and vertex-to-face lookups for a face list.
///
/// Edges are undirected; the map key stores the smaller index first.
#[derive(Debug, Clone)]
pub struct MeshAdjacency {
    edge_to_faces: HashMap<(u32, u32), EdgeFaces>,
    vertex_to_faces: HashMap<u32, SmallVec<[usize; 8]>>,
}

impl MeshAdjacency {
    /// Build adjacency for `faces`.
    ///
    /// ```
    /// use mesh_repair::MeshAdjacency;
    ///
    /// let adj = MeshAdjacency::build(&[[0, 1, 2], [1, 3, 2]]);
    /// assert_eq!(adj.boundary_edge_count(), 4);
    /// assert_eq!(adj.edge_count(), 5);
    /// ```
    #[must_use]
    pub fn build(faces: &[[u32; 3]]) -> Self {
        let mut edge_to_faces: HashMap<(u32, u32), EdgeFaces> =
            HashMap::with_capacity(faces.len() * 3 / 2);
        let mut vertex_to_faces: HashMap<u32, SmallVec<[usize; 8]>> = HashMap::new();

        for (face_idx, face) in faces.iter().enumerate() {
            for &v in face {
                vertex_to_faces.entry(v).or_default().push(face_idx);
            }
            for (a, b) in face_edges(*face) {
                edge_to_faces
                    .entry(undirected(a, b))
                    .or_default()
                    .push(face_idx);
            }
        }

        Self {
            edge_to_faces,
            vertex_to_faces,
        }
    }

    /// Faces sharing the edge `v0`-`v1`, in either direction.
    #[must_use]
    pub fn faces_for_edge(&self, v0: u32, v1: u32) -> Option<&[usize]> {
        self.edge_to_faces
            .get(&undirected(v0, v1))
            .map(SmallVec::as_slice)
    }

    /// Faces using vertex `v`. Empty if none.
    #[must_use]
    pub fn faces_for_vertex(&self, v: u32) -> &[usize] {
        self.vertex_to_faces.get(&v).map_or(&[], SmallVec::as_slice)
    }

    /// Undirected edges with exactly one incident face (open edges).
    pub fn boundary_edges(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.edge_to_faces
            .iter()
            .filter(|(_, f)| f.len() == 1)
            .map(|(&e, _)| e)
    }

    /// Open edges oriented the way their single face traverses them.
    ///
    /// `faces` must be the slice this adjacency was built from. Sorted, so
    /// callers walking the result get the same order on every run.
    #[must_use]
    pub fn boundary_half_edges(&self, faces: &[[u32; 3]]) -> Vec<(u32, u32)> {
        let mut half_edges: Vec<(u32, u32)> = self
            .edge_to_faces
            .iter()
            .filter(|(_, f)| f.len() == 1)
            .filter_map(|(&(lo, hi), f)| {
                face_edges(*faces.get(f[0])?)
                    .into_iter()
                    .find(|&(a, b)| undirected(a, b) == (lo, hi))
            })
            .collect();
        half_edges.sort_unstable();
        half_edges
    }

    /// Number of open edges.
    #[must_use]
    pub fn boundary_edge_count(&self) -> usize {
        self.edge_to_faces.values().filter(|f| f.len() == 1).count()
    }

    /// Edges shared by more than two faces.
    pub fn non_manifold_edges(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.edge_to_faces
            .iter()
            .filter(|(_, f)| f.len() > 2)
            .map(|(&e, _)| e)
    }

    /// Number of edges shared by more than two faces.
    #[must_use]
    pub fn non_manifold_edge_count(&self) -> usize {
        self.edge_to_faces.values().filter(|f| f.len() > 2).count()
    }

    /// No edge has more than two faces.
    #[must_use]
    pub fn is_manifold(&self) -> bool {
        self.edge_to_faces.values().all(|f| f.len() <= 2)
    }

    /// No edge is open.
    #[must_use]
    pub fn is_watertight(&self) -> bool {
        self.edge_to_faces.values().all(|f| f.len() >= 2)
    }

    /// Number of distinct undirected edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edge_to_faces.len()
    }

    /// Number of vertices used by at least one face.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertex_to_faces.len()
    }
}

/// The three directed edges of a face, in winding order.
#[inline]
pub(crate) fn face_edges(face: [u32; 3]) -> [(u32, u32); 3] {
    [(face[0], face[1]), (face[1], face[2]), (face[2], face[0])]
}

#[inline]
fn undirected(v0: u32, v1: u32) -> (u32, u32) {
    if v0 < v1 {
        (v0, v1)
    } else {
        (v1, v0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_triangle_is_all_boundary() {
        let adj = MeshAdjacency::build(&[[0, 1, 2]]);
        assert_eq!(adj.edge_count(), 3);
        assert_eq!(adj.vertex_count(), 3);
        assert_eq!(adj.boundary_edge_count(), 3);
        assert!(!adj.is_watertight());
    }

    #[test]
    fn shared_edge_has_two_faces() {
        let adj = MeshAdjacency::build(&[[0, 1, 2], [1, 3, 2]]);
        assert_eq!(adj.faces_for_edge(2, 1).map(<[usize]>::len), Some(2));
        assert_eq!(adj.faces_for_edge(0, 1).map(<[usize]>::len), Some(1));
        assert!(adj.faces_for_edge(0, 3).is_none());
        assert_eq!(adj.faces_for_vertex(2).len(), 2);
        assert!(adj.faces_for_vertex(99).is_empty());
    }

    #[test]
    fn three_faces_on_one_edge_is_non_manifold() {
        let adj = MeshAdjacency::build(&[[0, 1, 2], [0, 1, 3], [0, 1, 4]]);
        assert_eq!(adj.non_manifold_edge_count(), 1);
        assert_eq!(adj.non_manifold_edges().next(), Some((0, 1)));
        assert!(!adj.is_manifold());
    }

    #[test]
    fn half_edges_follow_face_winding() {
        let faces = [[0, 1, 2], [1, 3, 2]];
        let adj = MeshAdjacency::build(&faces);
        let half = adj.boundary_half_edges(&faces);
        assert_eq!(half, vec![(0, 1), (1, 3), (2, 0), (3, 2)]);
    }

    #[test]
    fn closed_cube_has_no_boundary() {
        let cube = mesh_types::unit_cube();
        let adj = MeshAdjacency::build(&cube.faces);
        assert!(adj.is_watertight());
        assert!(adj.is_manifold());
        assert_eq!(adj.edge_count(), 18);
        assert!(adj.boundary_half_edges(&cube.faces).is_empty());
    }
}
