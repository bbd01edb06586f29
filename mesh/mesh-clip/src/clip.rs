//! Clip a surface to a box without closing it.

use mesh_repair::{remove_unreferenced_vertices, weld_vertices};
use mesh_types::{Aabb, IndexedMesh, MeshTopology, Point3, Triangle, Vertex};
use smallvec::SmallVec;
use tracing::trace;

use crate::plane::{AxisPlane, PlaneSide};

/// A convex polygon after clipping one triangle. A triangle cut by six
/// planes has at most nine corners.
type ClipPolygon = SmallVec<[Point3<f64>; 9]>;

/// Keep the part of `mesh` that lies inside `aabb`.
///
/// Every triangle is clipped against the six half-spaces of the box, with
/// points within `epsilon` of a face counted as inside. The clipped polygons
/// are fan-triangulated and welded. The result is generally open where the
/// box cut through the surface.
///
/// Returns `None` if no face survives, which is how an empty cell is
/// recognized.
///
/// # Example
///
/// ```
/// use mesh_clip::clip_to_box;
/// use mesh_types::{unit_cube, Aabb, Point3};
///
/// let half = Aabb::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(0.5, 2.0, 2.0));
/// let clipped = clip_to_box(&unit_cube(), &half, 1e-9).unwrap();
/// assert!((clipped.surface_area() - 4.0).abs() < 1e-9);
///
/// let far = Aabb::new(Point3::new(5.0, 5.0, 5.0), Point3::new(6.0, 6.0, 6.0));
/// assert!(clip_to_box(&unit_cube(), &far, 1e-9).is_none());
/// ```
#[must_use]
pub fn clip_to_box(mesh: &IndexedMesh, aabb: &Aabb, epsilon: f64) -> Option<IndexedMesh> {
    if aabb.is_empty() || mesh.is_empty() {
        return None;
    }

    let planes = AxisPlane::box_faces(aabb);
    let reach = aabb.expanded(epsilon);
    let min_area = epsilon * epsilon;
    let mut out = IndexedMesh::new();

    for tri in mesh.triangles() {
        if !tri.bounds().intersects(&reach) {
            continue;
        }

        let mut polygon: ClipPolygon = tri.corners().into_iter().collect();
        if !polygon.iter().all(|p| reach.contains(p)) {
            for plane in &planes {
                polygon = clip_polygon(&polygon, plane, epsilon);
                if polygon.len() < 3 {
                    break;
                }
            }
        }
        push_fan(&mut out, &polygon, min_area);
    }

    if out.faces.is_empty() {
        return None;
    }

    weld_vertices(&mut out, epsilon.max(f64::EPSILON));
    remove_unreferenced_vertices(&mut out);
    trace!(faces = out.faces.len(), bounds = %aabb, "Clipped cell");

    if out.faces.is_empty() {
        None
    } else {
        Some(out)
    }
}

/// One Sutherland-Hodgman step: keep the part of `polygon` on the kept side
/// of `plane`.
fn clip_polygon(polygon: &[Point3<f64>], plane: &AxisPlane, epsilon: f64) -> ClipPolygon {
    let mut kept = ClipPolygon::new();
    let n = polygon.len();
    for i in 0..n {
        let cur = &polygon[i];
        let next = &polygon[(i + 1) % n];
        let cur_side = plane.classify(cur, epsilon);
        let next_side = plane.classify(next, epsilon);

        if cur_side != PlaneSide::Outside {
            kept.push(*cur);
        }
        let crosses = matches!(
            (cur_side, next_side),
            (PlaneSide::Inside, PlaneSide::Outside) | (PlaneSide::Outside, PlaneSide::Inside)
        );
        if crosses {
            kept.push(plane.intersect(cur, next));
        }
    }
    kept
}

#[allow(clippy::cast_possible_truncation)]
fn push_fan(out: &mut IndexedMesh, polygon: &[Point3<f64>], min_area: f64) {
    if polygon.len() < 3 {
        return;
    }
    let base = out.vertices.len() as u32;
    let mut used = false;
    for i in 1..polygon.len() - 1 {
        let tri = Triangle::new(polygon[0], polygon[i], polygon[i + 1]);
        if tri.area() > min_area {
            out.faces
                .push([base, base + i as u32, base + i as u32 + 1]);
            used = true;
        }
    }
    if used {
        out.vertices.extend(polygon.iter().map(|&p| Vertex::new(p)));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use mesh_repair::MeshAdjacency;
    use mesh_types::{box_mesh, unit_cube};

    fn cube100() -> IndexedMesh {
        box_mesh(&Aabb::new(Point3::origin(), Point3::new(100.0, 100.0, 100.0)))
    }

    #[test]
    fn corner_cell_keeps_three_patches() {
        let cell = Aabb::new(Point3::origin(), Point3::new(60.0, 60.0, 60.0));
        let clipped = clip_to_box(&cube100(), &cell, 1e-9).unwrap();
        // Three 60x60 squares of the outer surface.
        assert_relative_eq!(clipped.surface_area(), 3.0 * 3600.0, epsilon = 1e-6);
        let adj = MeshAdjacency::build(&clipped.faces);
        assert!(adj.boundary_edge_count() > 0);
        assert!(adj.is_manifold());
    }

    #[test]
    fn box_containing_everything_keeps_the_mesh() {
        let cell = Aabb::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(2.0, 2.0, 2.0));
        let clipped = clip_to_box(&unit_cube(), &cell, 1e-9).unwrap();
        assert_eq!(clipped.face_count(), 12);
        assert_eq!(clipped.vertex_count(), 8);
        assert!(MeshAdjacency::build(&clipped.faces).is_watertight());
    }

    #[test]
    fn interior_cell_is_empty() {
        let cell = Aabb::new(Point3::new(40.0, 40.0, 40.0), Point3::new(60.0, 60.0, 60.0));
        assert!(clip_to_box(&cube100(), &cell, 1e-9).is_none());
    }

    #[test]
    fn face_on_box_boundary_counts_as_inside() {
        // Cell ends exactly at the cube's top face.
        let cell = Aabb::new(Point3::new(0.0, 0.0, 0.5), Point3::new(1.0, 1.0, 1.0));
        let clipped = clip_to_box(&unit_cube(), &cell, 1e-9).unwrap();
        assert_relative_eq!(clipped.surface_area(), 1.0 + 4.0 * 0.5, epsilon = 1e-9);
    }

    #[test]
    fn polygon_step_cuts_a_triangle() {
        let plane = AxisPlane::new(0, 1.0, crate::KeepSide::Below);
        let tri = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(0.0, 2.0, 0.0),
        ];
        let kept = clip_polygon(&tri, &plane, 1e-9);
        assert_eq!(kept.len(), 4);
        assert!(kept.iter().all(|p| p.x <= 1.0));
    }

    #[test]
    fn empty_box_gives_nothing() {
        assert!(clip_to_box(&unit_cube(), &Aabb::empty(), 1e-9).is_none());
    }
}
