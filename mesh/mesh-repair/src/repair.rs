//! Cleanup passes: invalid and degenerate faces, welding, duplicates,
//! unreferenced vertices.
//!
//! Each pass returns how many elements it changed so callers can build a
//! summary. [`clean_mesh`] runs them in a fixed order.

use std::fmt;

use hashbrown::{HashMap, HashSet};
use mesh_types::{IndexedMesh, Point3, Triangle};
use tracing::debug;

/// Drop faces that name a missing vertex or repeat a vertex.
///
/// ```
/// use mesh_types::{IndexedMesh, Vertex};
/// use mesh_repair::remove_invalid_faces;
///
/// let mut mesh = IndexedMesh::new();
/// mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(0.0, 1.0, 0.0));
/// mesh.faces.extend([[0, 1, 2], [0, 1, 7], [1, 1, 2]]);
///
/// assert_eq!(remove_invalid_faces(&mut mesh), 2);
/// ```
pub fn remove_invalid_faces(mesh: &mut IndexedMesh) -> usize {
    let vertex_count = mesh.vertices.len();
    let before = mesh.faces.len();
    mesh.faces.retain(|&[a, b, c]| {
        a != b
            && b != c
            && a != c
            && (a as usize) < vertex_count
            && (b as usize) < vertex_count
            && (c as usize) < vertex_count
    });
    before - mesh.faces.len()
}

/// Drop triangles whose area is below `area_threshold`.
///
/// Faces with out-of-range indices are left for [`remove_invalid_faces`].
pub fn remove_degenerate_triangles(mesh: &mut IndexedMesh, area_threshold: f64) -> usize {
    let before = mesh.faces.len();
    let vertices = &mesh.vertices;
    mesh.faces.retain(|&[a, b, c]| {
        let at = |i: u32| vertices.get(i as usize).map(|v| v.position);
        match (at(a), at(b), at(c)) {
            (Some(p0), Some(p1), Some(p2)) => Triangle::new(p0, p1, p2).area() >= area_threshold,
            _ => true,
        }
    });
    before - mesh.faces.len()
}

/// Merge vertices closer than `epsilon`.
///
/// Uses a spatial hash with cells of `2 * epsilon`, so every pair within
/// range sits in neighbouring cells. The lowest index in a cluster survives
/// and keeps its position. Faces that collapse are dropped. Returns the
/// number of vertices merged away; the vertex array itself is not compacted.
///
/// ```
/// use mesh_types::{IndexedMesh, Vertex};
/// use mesh_repair::weld_vertices;
///
/// let mut mesh = IndexedMesh::new();
/// mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(0.0, 1.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(1.0 + 1e-9, 0.0, 0.0));
/// mesh.faces.push([0, 1, 2]);
/// mesh.faces.push([0, 3, 2]);
///
/// assert_eq!(weld_vertices(&mut mesh, 1e-6), 1);
/// assert_eq!(mesh.faces[1], [0, 1, 2]);
/// ```
#[allow(clippy::cast_possible_truncation)]
pub fn weld_vertices(mesh: &mut IndexedMesh, epsilon: f64) -> usize {
    if mesh.vertices.is_empty() || epsilon.is_nan() || epsilon <= 0.0 {
        return 0;
    }

    let cell_size = epsilon * 2.0;
    let mut grid: HashMap<(i64, i64, i64), Vec<u32>> = HashMap::new();
    for (idx, vertex) in mesh.vertices.iter().enumerate() {
        grid.entry(hash_cell(&vertex.position, cell_size))
            .or_default()
            .push(idx as u32);
    }

    let mut remap: Vec<u32> = (0..mesh.vertices.len() as u32).collect();
    let mut merged = 0;

    for (idx, vertex) in mesh.vertices.iter().enumerate() {
        let idx = idx as u32;
        if remap[idx as usize] != idx {
            continue;
        }
        let (cx, cy, cz) = hash_cell(&vertex.position, cell_size);
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let Some(bucket) = grid.get(&(cx + dx, cy + dy, cz + dz)) else {
                        continue;
                    };
                    for &other in bucket {
                        if other <= idx || remap[other as usize] != other {
                            continue;
                        }
                        let dist = (vertex.position - mesh.vertices[other as usize].position).norm();
                        if dist < epsilon {
                            remap[other as usize] = idx;
                            merged += 1;
                        }
                    }
                }
            }
        }
    }

    if merged == 0 {
        return 0;
    }

    let vertex_count = remap.len();
    for face in &mut mesh.faces {
        for i in face.iter_mut() {
            if (*i as usize) < vertex_count {
                *i = remap[*i as usize];
            }
        }
    }
    mesh.faces
        .retain(|&[a, b, c]| a != b && b != c && a != c);

    debug!(merged, epsilon, "Welded vertices");
    merged
}

#[allow(clippy::cast_possible_truncation)]
fn hash_cell(pos: &Point3<f64>, cell_size: f64) -> (i64, i64, i64) {
    (
        (pos.x / cell_size).floor() as i64,
        (pos.y / cell_size).floor() as i64,
        (pos.z / cell_size).floor() as i64,
    )
}

/// Drop repeated faces.
///
/// Copies with the same winding collapse to one. A face paired with its
/// reverse encloses nothing, so both copies go.
///
/// ```
/// use mesh_types::unit_cube;
/// use mesh_repair::remove_duplicate_faces;
///
/// let mut mesh = unit_cube();
/// mesh.faces.push([2, 3, 0]); // same as [0, 2, 3]
/// assert_eq!(remove_duplicate_faces(&mut mesh), 1);
/// assert_eq!(mesh.faces.len(), 12);
/// ```
pub fn remove_duplicate_faces(mesh: &mut IndexedMesh) -> usize {
    let before = mesh.faces.len();

    let mut first_seen: HashMap<[u32; 3], usize> = HashMap::new();
    let mut drop: HashSet<usize> = HashSet::new();

    for (i, &face) in mesh.faces.iter().enumerate() {
        let key = canonical_face(face);
        let reverse = canonical_face([face[0], face[2], face[1]]);
        if first_seen.contains_key(&key) {
            drop.insert(i);
        } else if let Some(&j) = first_seen.get(&reverse) {
            if !drop.contains(&j) {
                drop.insert(j);
                drop.insert(i);
            } else {
                first_seen.insert(key, i);
            }
        } else {
            first_seen.insert(key, i);
        }
    }

    if drop.is_empty() {
        return 0;
    }

    let mut i = 0;
    mesh.faces.retain(|_| {
        let keep = !drop.contains(&i);
        i += 1;
        keep
    });
    before - mesh.faces.len()
}

/// Rotate a face so its smallest index comes first, keeping winding.
pub(crate) fn canonical_face(face: [u32; 3]) -> [u32; 3] {
    let m = (0..3).min_by_key(|&k| face[k]).unwrap_or(0);
    [face[m], face[(m + 1) % 3], face[(m + 2) % 3]]
}

/// Drop vertices no face uses and compact the array.
///
/// Faces must only hold valid indices.
#[allow(clippy::cast_possible_truncation)]
pub fn remove_unreferenced_vertices(mesh: &mut IndexedMesh) -> usize {
    let before = mesh.vertices.len();
    let mut used = vec![false; before];
    for face in &mesh.faces {
        for &i in face {
            if let Some(u) = used.get_mut(i as usize) {
                *u = true;
            }
        }
    }
    if used.iter().all(|&u| u) {
        return 0;
    }

    let mut remap = vec![u32::MAX; before];
    let mut kept = Vec::with_capacity(before);
    for (old, vertex) in mesh.vertices.drain(..).enumerate() {
        if used[old] {
            remap[old] = kept.len() as u32;
            kept.push(vertex);
        }
    }
    for face in &mut mesh.faces {
        for i in face.iter_mut() {
            if let Some(&r) = remap.get(*i as usize) {
                *i = r;
            }
        }
    }
    mesh.vertices = kept;
    before - mesh.vertices.len()
}

/// Counts from one [`clean_mesh`] run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupSummary {
    /// Faces dropped for bad or repeated indices.
    pub invalid_removed: usize,
    /// Vertices merged into a neighbour.
    pub vertices_welded: usize,
    /// Faces dropped for having no area.
    pub degenerates_removed: usize,
    /// Faces dropped as duplicates.
    pub duplicates_removed: usize,
    /// Vertices dropped as unused.
    pub unreferenced_removed: usize,
}

impl CleanupSummary {
    /// True if any pass changed the mesh.
    #[must_use]
    pub fn had_changes(&self) -> bool {
        *self != Self::default()
    }
}

impl fmt::Display for CleanupSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} welded, {} invalid, {} degenerate, {} duplicate, {} unreferenced",
            self.vertices_welded,
            self.invalid_removed,
            self.degenerates_removed,
            self.duplicates_removed,
            self.unreferenced_removed
        )
    }
}

/// Run every cleanup pass: invalid faces, weld, degenerate faces,
/// duplicate faces, unreferenced vertices.
///
/// Welding goes before the area check so slivers that collapse to an edge
/// are caught by index comparison rather than by a float threshold.
pub fn clean_mesh(
    mesh: &mut IndexedMesh,
    weld_epsilon: f64,
    area_threshold: f64,
) -> CleanupSummary {
    let invalid_removed = remove_invalid_faces(mesh);
    let vertices_welded = weld_vertices(mesh, weld_epsilon);
    let degenerates_removed = remove_degenerate_triangles(mesh, area_threshold);
    let duplicates_removed = remove_duplicate_faces(mesh);
    let unreferenced_removed = remove_unreferenced_vertices(mesh);

    CleanupSummary {
        invalid_removed,
        vertices_welded,
        degenerates_removed,
        duplicates_removed,
        unreferenced_removed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_types::{unit_cube, Vertex};

    #[test]
    fn collinear_triangle_is_degenerate() {
        let mut mesh = IndexedMesh::new();
        mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(5.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(10.0, 0.0, 0.0));
        mesh.faces.push([0, 1, 2]);
        assert_eq!(remove_degenerate_triangles(&mut mesh, 1e-12), 1);
        assert!(mesh.faces.is_empty());
    }

    #[test]
    fn cube_has_nothing_to_clean() {
        let mut mesh = unit_cube();
        let summary = clean_mesh(&mut mesh, 1e-6, 1e-12);
        assert!(!summary.had_changes());
        assert_eq!(mesh, unit_cube());
    }

    #[test]
    fn weld_merges_coincident_and_drops_collapsed_faces() {
        let mut mesh = IndexedMesh::new();
        mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(0.0, 1.0, 0.0));
        mesh.faces.push([0, 1, 2]);
        mesh.faces.push([1, 2, 3]);

        assert_eq!(weld_vertices(&mut mesh, 1e-6), 1);
        assert_eq!(mesh.faces, vec![[0, 2, 3]]);
    }

    #[test]
    fn weld_with_zero_epsilon_is_noop() {
        let mut mesh = unit_cube();
        assert_eq!(weld_vertices(&mut mesh, 0.0), 0);
    }

    #[test]
    fn opposite_pair_cancels() {
        let mut mesh = unit_cube();
        mesh.faces.push([0, 1, 2]);
        mesh.faces.push([0, 2, 1]);
        assert_eq!(remove_duplicate_faces(&mut mesh), 2);
        assert_eq!(mesh.faces.len(), 12);
    }

    #[test]
    fn three_way_duplicate_keeps_one() {
        let mut mesh = unit_cube();
        mesh.faces.push([0, 2, 3]);
        mesh.faces.push([3, 0, 2]);
        assert_eq!(remove_duplicate_faces(&mut mesh), 2);
    }

    #[test]
    fn unreferenced_vertices_are_compacted() {
        let mut mesh = IndexedMesh::new();
        mesh.vertices.push(Vertex::from_coords(9.0, 9.0, 9.0));
        mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(0.0, 1.0, 0.0));
        mesh.faces.push([1, 2, 3]);

        assert_eq!(remove_unreferenced_vertices(&mut mesh), 1);
        assert_eq!(mesh.faces, vec![[0, 1, 2]]);
        assert_eq!(mesh.vertices[0].position, Point3::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn canonical_face_keeps_winding() {
        assert_eq!(canonical_face([5, 2, 9]), [2, 9, 5]);
        assert_eq!(canonical_face([2, 9, 5]), [2, 9, 5]);
    }

    #[test]
    fn summary_display() {
        let s = CleanupSummary {
            vertices_welded: 3,
            duplicates_removed: 1,
            ..CleanupSummary::default()
        };
        assert_eq!(
            s.to_string(),
            "3 welded, 0 invalid, 0 degenerate, 1 duplicate, 0 unreferenced"
        );
    }
}
