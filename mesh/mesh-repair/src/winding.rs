//! Consistent face orientation.

use std::collections::VecDeque;

use mesh_types::{Aabb, IndexedMesh, Point3, Triangle, Vector3};
use tracing::debug;

use crate::adjacency::{face_edges, MeshAdjacency};

/// Count two-face edges whose faces traverse them in the same direction.
///
/// Zero for a consistently oriented manifold mesh. Faces must hold valid
/// indices, as they do after [`crate::clean_mesh`].
#[must_use]
pub fn count_inconsistent_faces(mesh: &IndexedMesh) -> usize {
    let adjacency = MeshAdjacency::build(&mesh.faces);
    let mut count = 0;
    for (fi, face) in mesh.faces.iter().enumerate() {
        for (a, b) in face_edges(*face) {
            if let Some(&[f0, f1]) = adjacency.faces_for_edge(a, b) {
                let other = if f0 == fi { f1 } else { f0 };
                if fi < other && traverses(mesh.faces[other], a, b) {
                    count += 1;
                }
            }
        }
    }
    count
}

/// True if `face` has the directed edge `a -> b`.
fn traverses(face: [u32; 3], a: u32, b: u32) -> bool {
    face_edges(face).contains(&(a, b))
}

/// Orient faces consistently, with solid material on the inside.
///
/// Faces are propagated across two-face edges so that each neighbour walks
/// the shared edge the opposite way. Non-manifold edges are not crossed.
/// Each connected shell is then turned as a whole so that its signed volume
/// is positive, unless it sits inside an odd number of other closed shells:
/// such a shell bounds a cavity and is turned to negative volume. Returns
/// the number of faces whose winding changed.
///
/// ```
/// use mesh_types::unit_cube;
/// use mesh_repair::{count_inconsistent_faces, fix_winding_order};
///
/// let mut mesh = unit_cube();
/// mesh.faces[3].swap(1, 2);
/// assert!(count_inconsistent_faces(&mesh) > 0);
///
/// assert_eq!(fix_winding_order(&mut mesh), 1);
/// assert_eq!(count_inconsistent_faces(&mesh), 0);
/// assert!(mesh.signed_volume() > 0.0);
/// ```
pub fn fix_winding_order(mesh: &mut IndexedMesh) -> usize {
    let face_count = mesh.faces.len();
    if face_count == 0 {
        return 0;
    }

    let adjacency = MeshAdjacency::build(&mesh.faces);
    let original = mesh.faces.clone();
    let shells = propagate(mesh, &adjacency);

    let volumes: Vec<f64> = shells.iter().map(|s| shell_signed_volume(mesh, &s.faces)).collect();
    let bounds: Vec<Aabb> = shells.iter().map(|s| shell_bounds(mesh, &s.faces)).collect();

    let mut flip = Vec::with_capacity(shells.len());
    for (si, shell) in shells.iter().enumerate() {
        if volumes[si] == 0.0 {
            flip.push(false);
            continue;
        }
        let depth = match shell_sample(mesh, &shell.faces) {
            Some(point) if shells.len() > 1 => shells
                .iter()
                .enumerate()
                .filter(|&(oi, other)| {
                    oi != si
                        && other.closed
                        && volumes[oi] != 0.0
                        && bounds[oi].contains(&point)
                        && contains_point(mesh, &other.faces, &point)
                })
                .count(),
            _ => 0,
        };
        let want_positive = depth % 2 == 0;
        flip.push((volumes[si] > 0.0) != want_positive);
    }

    for (shell, turn) in shells.iter().zip(flip) {
        if turn {
            for &fi in &shell.faces {
                mesh.faces[fi].swap(1, 2);
            }
        }
    }

    let flipped = mesh
        .faces
        .iter()
        .zip(&original)
        .filter(|(now, before)| now != before)
        .count();
    if flipped > 0 {
        debug!(flipped, shells = shells.len(), "Reoriented faces");
    }
    flipped
}

/// Faces reachable from one another across two-face edges.
struct Shell {
    faces: Vec<usize>,
    /// Every edge of every face has exactly two faces.
    closed: bool,
}

/// Make each shell consistent with its first face and collect the shells.
fn propagate(mesh: &mut IndexedMesh, adjacency: &MeshAdjacency) -> Vec<Shell> {
    let face_count = mesh.faces.len();
    let mut visited = vec![false; face_count];
    let mut queue = VecDeque::new();
    let mut shells = Vec::new();

    for seed in 0..face_count {
        if visited[seed] {
            continue;
        }
        visited[seed] = true;
        queue.push_back(seed);
        let mut faces = vec![seed];
        let mut closed = true;

        while let Some(fi) = queue.pop_front() {
            let face = mesh.faces[fi];
            for (a, b) in face_edges(face) {
                let Some(&[f0, f1]) = adjacency.faces_for_edge(a, b) else {
                    closed = false;
                    continue;
                };
                let nb = if f0 == fi { f1 } else { f0 };
                if nb == fi || visited[nb] {
                    continue;
                }
                if traverses(mesh.faces[nb], a, b) {
                    mesh.faces[nb].swap(1, 2);
                }
                visited[nb] = true;
                queue.push_back(nb);
                faces.push(nb);
            }
        }
        shells.push(Shell { faces, closed });
    }
    shells
}

fn shell_signed_volume(mesh: &IndexedMesh, faces: &[usize]) -> f64 {
    faces
        .iter()
        .map(|&fi| {
            let [a, b, c] = mesh.faces[fi];
            let (p0, p1, p2) = (mesh.position(a), mesh.position(b), mesh.position(c));
            p0.coords.dot(&p1.coords.cross(&p2.coords))
        })
        .sum::<f64>()
        / 6.0
}

fn shell_bounds(mesh: &IndexedMesh, faces: &[usize]) -> Aabb {
    let mut bounds = Aabb::empty();
    for &fi in faces {
        for &v in &mesh.faces[fi] {
            bounds.expand_to_include(&mesh.position(v));
        }
    }
    bounds
}

/// Centroid of the shell's largest face, a point on its surface.
fn shell_sample(mesh: &IndexedMesh, faces: &[usize]) -> Option<Point3<f64>> {
    faces
        .iter()
        .map(|&fi| triangle(mesh, fi))
        .filter(|t| t.area() > 0.0)
        .max_by(|a, b| a.area().total_cmp(&b.area()))
        .map(|t| t.centroid())
}

fn triangle(mesh: &IndexedMesh, fi: usize) -> Triangle {
    let [a, b, c] = mesh.faces[fi];
    Triangle::new(mesh.position(a), mesh.position(b), mesh.position(c))
}

/// Ray directions for the inside test, skewed off the axes so rays do not
/// run along the edges of axis-aligned geometry.
const RAY_DIRECTIONS: [[f64; 3]; 3] = [
    [1.0, 0.318_309_886, 0.141_421_356],
    [0.173_205_081, 1.0, 0.367_879_441],
    [0.271_828_183, 0.223_606_798, 1.0],
];

/// Majority vote of three ray parity tests against a closed shell.
fn contains_point(mesh: &IndexedMesh, faces: &[usize], point: &Point3<f64>) -> bool {
    let inside = RAY_DIRECTIONS
        .iter()
        .filter(|dir| {
            let dir = Vector3::new(dir[0], dir[1], dir[2]);
            let hits = faces
                .iter()
                .filter(|&&fi| ray_hits_triangle(point, &dir, &triangle(mesh, fi)))
                .count();
            hits % 2 == 1
        })
        .count();
    inside >= 2
}

/// Möller-Trumbore, counting hits strictly in front of the origin.
fn ray_hits_triangle(origin: &Point3<f64>, dir: &Vector3<f64>, tri: &Triangle) -> bool {
    const EPSILON: f64 = 1e-12;
    let [v0, v1, v2] = tri.corners();
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let h = dir.cross(&edge2);
    let a = edge1.dot(&h);
    if a.abs() < EPSILON {
        return false;
    }
    let f = 1.0 / a;
    let s = *origin - v0;
    let u = f * s.dot(&h);
    if !(0.0..=1.0).contains(&u) {
        return false;
    }
    let q = s.cross(&edge1);
    let v = f * dir.dot(&q);
    if v < 0.0 || u + v > 1.0 {
        return false;
    }
    f * edge2.dot(&q) > EPSILON
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_types::{box_mesh, unit_cube};

    #[test]
    fn consistent_cube_is_untouched() {
        let mut mesh = unit_cube();
        assert_eq!(count_inconsistent_faces(&mesh), 0);
        assert_eq!(fix_winding_order(&mut mesh), 0);
        assert_eq!(mesh, unit_cube());
    }

    #[test]
    fn inside_out_cube_is_turned_outward() {
        let mut mesh = unit_cube();
        mesh.flip_normals();
        assert_eq!(fix_winding_order(&mut mesh), 12);
        assert!((mesh.signed_volume() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn scattered_flips_are_repaired() {
        let mut mesh = unit_cube();
        for fi in [0, 5, 9] {
            mesh.faces[fi].swap(0, 1);
        }
        fix_winding_order(&mut mesh);
        assert_eq!(count_inconsistent_faces(&mesh), 0);
        assert!(mesh.signed_volume() > 0.0);
    }

    /// 4x4x4 box around a 2x2x2 cavity, both shells wound outward.
    fn box_with_outward_cavity() -> IndexedMesh {
        let mut mesh = box_mesh(&Aabb::new(Point3::origin(), Point3::new(4.0, 4.0, 4.0)));
        mesh.merge(&box_mesh(&Aabb::new(
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(3.0, 3.0, 3.0),
        )));
        mesh
    }

    #[test]
    fn inverted_cavity_is_kept() {
        let mut mesh = box_with_outward_cavity();
        for face in &mut mesh.faces[12..] {
            face.swap(1, 2);
        }
        assert_eq!(fix_winding_order(&mut mesh), 0);
        assert!((mesh.signed_volume() - 56.0).abs() < 1e-12);
    }

    #[test]
    fn outward_cavity_is_turned_inward() {
        let mut mesh = box_with_outward_cavity();
        assert_eq!(fix_winding_order(&mut mesh), 12);
        assert!((mesh.signed_volume() - 56.0).abs() < 1e-12);
    }

    #[test]
    fn inside_out_hollow_box_is_turned_around() {
        let mut mesh = box_with_outward_cavity();
        for face in &mut mesh.faces[..12] {
            face.swap(1, 2);
        }
        // Outer shell inward, cavity outward: both wrong.
        assert_eq!(fix_winding_order(&mut mesh), 24);
        assert!((mesh.signed_volume() - 56.0).abs() < 1e-12);
    }

    #[test]
    fn solid_inside_a_cavity_points_out_again() {
        // Box, cavity, and a small block floating in the cavity.
        let mut mesh = box_with_outward_cavity();
        mesh.merge(&box_mesh(&Aabb::new(
            Point3::new(1.5, 1.5, 1.5),
            Point3::new(2.5, 2.5, 2.5),
        )));
        fix_winding_order(&mut mesh);
        assert!((mesh.signed_volume() - 57.0).abs() < 1e-12);
    }

    #[test]
    fn side_by_side_shells_both_point_out() {
        let mut mesh = unit_cube();
        let mut other = box_mesh(&Aabb::new(
            Point3::new(3.0, 0.0, 0.0),
            Point3::new(4.0, 1.0, 1.0),
        ));
        other.flip_normals();
        mesh.merge(&other);
        assert_eq!(fix_winding_order(&mut mesh), 12);
        assert!((mesh.signed_volume() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn empty_mesh() {
        let mut mesh = IndexedMesh::new();
        assert_eq!(fix_winding_order(&mut mesh), 0);
    }
}
