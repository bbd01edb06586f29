//! Cut a closed mesh with one axis-aligned plane and cap the opening.
//!
//! The kept side of every face is retained; faces crossing the plane are
//! split at the crossing points, which are shared between the two faces on
//! each crossed edge. On-plane vertices closer than the snapping tolerance
//! are then merged, so crossings that land on one point from different
//! edges become one vertex. The cut leaves boundary edges whose ends both
//! lie on the plane. Those edges are chained into loops, reversed, and
//! triangulated flat in the plane, so the cap winds consistently with the
//! surface it closes.

use hashbrown::HashMap;
use mesh_repair::{chain_edges, remove_unreferenced_vertices, MeshAdjacency};
use mesh_types::{IndexedMesh, Point3, Triangle, Vector3, Vertex};
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::error::{ClipError, ClipResult};
use crate::plane::{AxisPlane, PlaneSide};
use crate::polygon::{contains_point, corner_indices, signed_area2, triangulate};

/// Counters from one [`cut_and_cap`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CutStats {
    /// Faces that straddled the plane and were split.
    pub faces_split: usize,
    /// Faces dropped as lying entirely on the discarded side.
    pub faces_dropped: usize,
    /// Outer cap contours triangulated.
    pub caps: usize,
    /// Triangles added by capping.
    pub cap_faces: usize,
    /// Boundary chains on the plane that did not close, plus hole contours
    /// with no surrounding outer contour. Left for the fallback fill.
    pub unclosed: usize,
    /// Coincident on-plane vertices merged before capping.
    pub merged: usize,
}

impl std::ops::AddAssign for CutStats {
    fn add_assign(&mut self, rhs: Self) {
        self.faces_split += rhs.faces_split;
        self.faces_dropped += rhs.faces_dropped;
        self.caps += rhs.caps;
        self.cap_faces += rhs.cap_faces;
        self.unclosed += rhs.unclosed;
        self.merged += rhs.merged;
    }
}

/// Keep the part of `mesh` on the kept side of `plane` and close the cut.
///
/// `mesh` should be closed and wound outward; open input yields caps only
/// where its boundary lies on the plane. Vertices within `epsilon` of the
/// plane are snapped onto it. Faces lying in the plane survive only if they
/// face out of the kept half-space.
///
/// # Errors
///
/// [`ClipError::Triangulation`] if a cap contour is rejected by the
/// triangulator.
///
/// # Example
///
/// ```
/// use mesh_clip::{cut_and_cap, AxisPlane, KeepSide};
/// use mesh_repair::validate_mesh;
/// use mesh_types::unit_cube;
///
/// let plane = AxisPlane::new(2, 0.25, KeepSide::Below);
/// let (lower, stats) = cut_and_cap(&unit_cube(), &plane, 1e-9).unwrap();
/// assert_eq!(stats.caps, 1);
/// assert!(validate_mesh(&lower).is_closed_solid());
/// assert!((lower.volume() - 0.25).abs() < 1e-12);
/// ```
pub fn cut_and_cap(
    mesh: &IndexedMesh,
    plane: &AxisPlane,
    epsilon: f64,
) -> ClipResult<(IndexedMesh, CutStats)> {
    let mut stats = CutStats::default();
    let mut splitter = Splitter::new(mesh, plane, epsilon);
    let mut faces: Vec<[u32; 3]> = Vec::with_capacity(mesh.faces.len());

    for &face in &mesh.faces {
        if face.iter().any(|&i| i as usize >= splitter.points.len()) {
            continue;
        }
        let sides = face.map(|i| splitter.sides[i as usize]);

        if sides.iter().all(|&s| s == PlaneSide::On) {
            if splitter.faces_outward(face) {
                faces.push(face);
            } else {
                stats.faces_dropped += 1;
            }
        } else if !sides.contains(&PlaneSide::Outside) {
            faces.push(face);
        } else if !sides.contains(&PlaneSide::Inside) {
            stats.faces_dropped += 1;
        } else {
            let polygon = splitter.clip_face(face, sides);
            for i in 1..polygon.len().saturating_sub(1) {
                faces.push([polygon[0], polygon[i], polygon[i + 1]]);
            }
            stats.faces_split += 1;
        }
    }

    stats.merged = splitter.merge_on_plane(&mut faces);
    let loops = splitter.cap_loops(&faces, &mut stats);
    splitter.triangulate_caps(&loops, &mut faces, &mut stats)?;

    let mut out = IndexedMesh::from_parts(
        splitter.points.into_iter().map(Vertex::new).collect(),
        faces,
    );
    remove_unreferenced_vertices(&mut out);

    trace!(
        %plane,
        split = stats.faces_split,
        dropped = stats.faces_dropped,
        caps = stats.caps,
        merged = stats.merged,
        "Cut"
    );
    Ok((out, stats))
}

/// Working state for one cut: snapped positions, their sides, and the
/// crossing points created so far.
struct Splitter<'a> {
    plane: &'a AxisPlane,
    epsilon: f64,
    points: Vec<Point3<f64>>,
    sides: Vec<PlaneSide>,
    crossings: HashMap<(u32, u32), u32>,
}

impl<'a> Splitter<'a> {
    fn new(mesh: &IndexedMesh, plane: &'a AxisPlane, epsilon: f64) -> Self {
        let mut points: Vec<Point3<f64>> = mesh.vertices.iter().map(|v| v.position).collect();
        let sides = points
            .iter_mut()
            .map(|p| {
                let side = plane.classify(p, epsilon);
                if side == PlaneSide::On {
                    p[plane.axis] = plane.value;
                }
                side
            })
            .collect();
        Self {
            plane,
            epsilon: epsilon.max(f64::EPSILON),
            points,
            sides,
            crossings: HashMap::new(),
        }
    }

    fn faces_outward(&self, [a, b, c]: [u32; 3]) -> bool {
        let tri = Triangle::new(
            self.points[a as usize],
            self.points[b as usize],
            self.points[c as usize],
        );
        tri.normal_unnormalized().dot(&self.plane.outward_normal()) > 0.0
    }

    /// Crossing point on edge `a`-`b`, created once per undirected edge.
    #[allow(clippy::cast_possible_truncation)]
    fn crossing(&mut self, a: u32, b: u32) -> u32 {
        let key = if a < b { (a, b) } else { (b, a) };
        if let Some(&id) = self.crossings.get(&key) {
            return id;
        }
        let p = self
            .plane
            .intersect(&self.points[key.0 as usize], &self.points[key.1 as usize]);
        let id = self.points.len() as u32;
        self.points.push(p);
        self.sides.push(PlaneSide::On);
        self.crossings.insert(key, id);
        id
    }

    /// Kept part of a face that has corners on both sides.
    fn clip_face(&mut self, face: [u32; 3], sides: [PlaneSide; 3]) -> SmallVec<[u32; 4]> {
        let mut polygon = SmallVec::new();
        for i in 0..3 {
            let j = (i + 1) % 3;
            if sides[i] != PlaneSide::Outside {
                polygon.push(face[i]);
            }
            let crosses = matches!(
                (sides[i], sides[j]),
                (PlaneSide::Inside, PlaneSide::Outside) | (PlaneSide::Outside, PlaneSide::Inside)
            );
            if crosses {
                polygon.push(self.crossing(face[i], face[j]));
            }
        }
        polygon
    }

    /// Merge referenced on-plane vertices lying within `epsilon` of each
    /// other and drop the faces that collapse. Returns the merge count.
    #[allow(clippy::cast_possible_truncation)]
    fn merge_on_plane(&self, faces: &mut Vec<[u32; 3]>) -> usize {
        let mut used = vec![false; self.points.len()];
        for face in faces.iter() {
            for &v in face {
                used[v as usize] = true;
            }
        }

        let cell_size = self.epsilon * 2.0;
        let cell = |v: u32| {
            let [u, w] = self.plane.project(&self.points[v as usize]);
            ((u / cell_size).floor() as i64, (w / cell_size).floor() as i64)
        };

        let mut grid: HashMap<(i64, i64), SmallVec<[u32; 2]>> = HashMap::new();
        let mut remap: Vec<u32> = (0..self.points.len() as u32).collect();
        let mut merged = 0;
        for v in 0..self.points.len() as u32 {
            if !used[v as usize] || self.sides[v as usize] != PlaneSide::On {
                continue;
            }
            let (cu, cw) = cell(v);
            let p = self.points[v as usize];
            let found = (-1..=1)
                .flat_map(|du| (-1..=1).map(move |dw| (cu + du, cw + dw)))
                .filter_map(|key| grid.get(&key))
                .flatten()
                .copied()
                .find(|&r| (self.points[r as usize] - p).norm() < self.epsilon);
            match found {
                Some(r) => {
                    remap[v as usize] = r;
                    merged += 1;
                }
                None => grid.entry((cu, cw)).or_default().push(v),
            }
        }

        if merged > 0 {
            for face in faces.iter_mut() {
                *face = face.map(|v| remap[v as usize]);
            }
            faces.retain(|&[a, b, c]| a != b && b != c && a != c);
            trace!(plane = %self.plane, merged, "Merged coincident on-plane vertices");
        }
        merged
    }

    /// Reversed boundary edges on the plane, chained into closed loops.
    fn cap_loops(&self, faces: &[[u32; 3]], stats: &mut CutStats) -> Vec<Vec<u32>> {
        let adjacency = MeshAdjacency::build(faces);
        let on_plane = |v: u32| self.sides[v as usize] == PlaneSide::On;
        let edges: Vec<(u32, u32)> = adjacency
            .boundary_half_edges(faces)
            .into_iter()
            .filter(|&(a, b)| on_plane(a) && on_plane(b))
            .map(|(a, b)| (b, a))
            .collect();

        let chains = chain_edges(&edges);
        let (loops, short): (Vec<Vec<u32>>, Vec<Vec<u32>>) = chains
            .closed
            .into_iter()
            .partition(|ring| ring.len() >= 3);
        stats.unclosed += chains.open + short.len();
        loops
    }

    /// Triangulate cap loops flat in the plane and append the faces.
    fn triangulate_caps(
        &mut self,
        loops: &[Vec<u32>],
        faces: &mut Vec<[u32; 3]>,
        stats: &mut CutStats,
    ) -> ClipResult<()> {
        let sign = self.plane.orientation();
        let mut outers: Vec<Ring<'_>> = Vec::new();
        let mut holes: Vec<Ring<'_>> = Vec::new();
        for ring in loops {
            let points: Vec<[f64; 2]> = ring
                .iter()
                .map(|&v| self.plane.project(&self.points[v as usize]))
                .collect();
            let area = signed_area2(&points) * sign;
            let corners = corner_indices(&points);
            if corners.len() < 3 || area == 0.0 {
                stats.unclosed += 1;
                continue;
            }
            let ring = Ring {
                ids: ring,
                points,
                corners,
                area,
            };
            if area > 0.0 {
                outers.push(ring);
            } else {
                holes.push(ring);
            }
        }

        let mut holes_of: Vec<Vec<&Ring<'_>>> = vec![Vec::new(); outers.len()];
        for hole in &holes {
            let sample = hole.points[0];
            let owner = outers
                .iter()
                .enumerate()
                .filter(|(_, outer)| contains_point(&outer.points, sample))
                .min_by(|a, b| a.1.area.total_cmp(&b.1.area))
                .map(|(o, _)| o);
            match owner {
                Some(o) => holes_of[o].push(hole),
                None => stats.unclosed += 1,
            }
        }

        for (outer, outer_holes) in outers.iter().zip(&holes_of) {
            let mut rings: Vec<&Ring<'_>> = vec![outer];
            rings.extend(outer_holes.iter().copied());
            let before = faces.len();
            self.triangulate_rings(&rings, faces)?;
            stats.cap_faces += faces.len() - before;
            stats.caps += 1;
        }

        if stats.unclosed > 0 {
            debug!(plane = %self.plane, unclosed = stats.unclosed, "Cap contours left open");
        }
        Ok(())
    }

    /// Triangulate one outer ring with its holes.
    ///
    /// Only ring corners go to the triangulator, which would drop collinear
    /// points anyway. Points on straight runs are put back afterwards by
    /// fanning the affected triangle around the centroid of its three
    /// corners, so every boundary edge of the cut is matched by a cap edge.
    fn triangulate_rings(&mut self, rings: &[&Ring<'_>], faces: &mut Vec<[u32; 3]>) -> ClipResult<()> {
        let corner_points: Vec<Vec<[f64; 2]>> = rings.iter().map(|r| r.corner_points()).collect();
        let hole_points: Vec<&[[f64; 2]]> = corner_points[1..].iter().map(Vec::as_slice).collect();
        let triangles = triangulate(&corner_points[0], &hole_points).map_err(|reason| {
            ClipError::Triangulation {
                plane: self.plane.to_string(),
                reason,
            }
        })?;

        // Global corner index -> (ring, corner).
        let mut slots: Vec<(usize, usize)> = Vec::new();
        for (r, ring) in rings.iter().enumerate() {
            slots.extend((0..ring.corners.len()).map(|c| (r, c)));
        }
        let point = |g: usize| corner_points[slots[g].0][slots[g].1];
        let sign = self.plane.orientation();

        for [i, j, k] in triangles {
            let area = signed_area2(&[point(i), point(j), point(k)]) * sign;
            let tri = if area < 0.0 { [i, k, j] } else { [i, j, k] };

            let corner_ids = tri.map(|g| {
                let ring = rings[slots[g].0];
                ring.ids[ring.corners[slots[g].1]]
            });
            let mut boundary: SmallVec<[u32; 8]> = SmallVec::new();
            for e in 0..3 {
                let (u, v) = (slots[tri[e]], slots[tri[(e + 1) % 3]]);
                let ring = rings[u.0];
                boundary.push(ring.ids[ring.corners[u.1]]);
                if u.0 != v.0 {
                    continue;
                }
                let count = ring.corners.len();
                if (u.1 + 1) % count == v.1 {
                    boundary.extend(ring.run(u.1));
                } else if (v.1 + 1) % count == u.1 {
                    let mut back: SmallVec<[u32; 8]> = ring.run(v.1).collect();
                    back.reverse();
                    boundary.extend(back);
                }
            }

            if boundary.len() == 3 {
                faces.push([boundary[0], boundary[1], boundary[2]]);
            } else {
                let center = self.centroid(&corner_ids);
                let n = boundary.len();
                for b in 0..n {
                    faces.push([center, boundary[b], boundary[(b + 1) % n]]);
                }
            }
        }
        Ok(())
    }

    /// New on-plane vertex at the mean of `ids`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn centroid(&mut self, ids: &[u32]) -> u32 {
        let sum = ids
            .iter()
            .fold(Vector3::zeros(), |acc, &v| acc + self.points[v as usize].coords);
        let mut p = Point3::from(sum / ids.len() as f64);
        p[self.plane.axis] = self.plane.value;
        let id = self.points.len() as u32;
        self.points.push(p);
        self.sides.push(PlaneSide::On);
        id
    }
}

/// A closed cap contour projected into its plane.
struct Ring<'r> {
    ids: &'r [u32],
    points: Vec<[f64; 2]>,
    /// Positions in `ids` that are not in the middle of a straight run.
    corners: Vec<usize>,
    /// Twice the area, positive for outer contours.
    area: f64,
}

impl Ring<'_> {
    fn corner_points(&self) -> Vec<[f64; 2]> {
        self.corners.iter().map(|&c| self.points[c]).collect()
    }

    /// Vertices strictly between corner `c` and the next corner.
    fn run(&self, c: usize) -> impl Iterator<Item = u32> + '_ {
        let n = self.ids.len();
        let from = self.corners[c];
        let to = self.corners[(c + 1) % self.corners.len()];
        let len = (to + n - from) % n;
        (1..len).map(move |s| self.ids[(from + s) % n])
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::plane::KeepSide;
    use approx::assert_relative_eq;
    use mesh_repair::validate_mesh;
    use mesh_types::{box_mesh, unit_cube, Aabb, MeshTopology};

    fn cut(mesh: &IndexedMesh, axis: usize, value: f64, keep: KeepSide) -> (IndexedMesh, CutStats) {
        cut_and_cap(mesh, &AxisPlane::new(axis, value, keep), 1e-9).unwrap()
    }

    #[test]
    fn cube_halves_are_closed() {
        for keep in [KeepSide::Above, KeepSide::Below] {
            for axis in 0..3 {
                let (half, stats) = cut(&unit_cube(), axis, 0.5, keep);
                assert_eq!(stats.caps, 1);
                assert_eq!(stats.unclosed, 0);
                let report = validate_mesh(&half);
                assert!(report.is_closed_solid(), "axis {axis} {keep:?}: {report}");
                assert_relative_eq!(half.signed_volume(), 0.5, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn plane_outside_the_mesh_keeps_or_drops_everything() {
        let (all, stats) = cut(&unit_cube(), 0, 2.0, KeepSide::Below);
        assert_eq!(all.face_count(), 12);
        assert_eq!(stats.caps, 0);

        let (none, _) = cut(&unit_cube(), 0, 2.0, KeepSide::Above);
        assert!(none.is_empty());
    }

    #[test]
    fn plane_through_a_face_keeps_it_only_facing_out() {
        // The top face lies on z = 1 and faces +z.
        let (kept, stats) = cut(&unit_cube(), 2, 1.0, KeepSide::Below);
        assert_eq!(kept.face_count(), 12);
        assert_eq!(stats.caps, 0);

        let (gone, _) = cut(&unit_cube(), 2, 1.0, KeepSide::Above);
        assert!(gone.faces.is_empty());
    }

    #[test]
    fn hollow_box_cap_has_a_hole() {
        // Outer 4x4x4 box with an inverted 2x2x2 cavity.
        let mut shell = box_mesh(&Aabb::new(Point3::origin(), Point3::new(4.0, 4.0, 4.0)));
        let mut cavity = box_mesh(&Aabb::new(
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(3.0, 3.0, 3.0),
        ));
        cavity.flip_normals();
        shell.merge(&cavity);

        let (lower, stats) = cut(&shell, 2, 2.0, KeepSide::Below);
        assert_eq!(stats.caps, 1);
        assert_eq!(stats.unclosed, 0);
        assert!(validate_mesh(&lower).is_closed_solid());
        assert_relative_eq!(lower.signed_volume(), 32.0 - 4.0, epsilon = 1e-9);
    }

    #[test]
    fn two_separate_solids_get_two_caps() {
        let mut pair = box_mesh(&Aabb::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0)));
        pair.merge(&box_mesh(&Aabb::new(
            Point3::new(3.0, 0.0, 0.0),
            Point3::new(4.0, 1.0, 1.0),
        )));
        let (lower, stats) = cut(&pair, 1, 0.3, KeepSide::Below);
        assert_eq!(stats.caps, 2);
        assert!(validate_mesh(&lower).is_closed_solid());
        assert_relative_eq!(lower.signed_volume(), 0.6, epsilon = 1e-12);
    }

    #[test]
    fn vertices_near_the_plane_are_snapped() {
        let (lower, _) = cut_and_cap(
            &unit_cube(),
            &AxisPlane::new(0, 1.0 - 1e-12, KeepSide::Below),
            1e-9,
        )
        .unwrap();
        assert!(lower.vertices.iter().all(|v| v.position.x <= 1.0 - 1e-12));
        assert!(validate_mesh(&lower).is_closed_solid());
    }

    #[test]
    fn crossings_on_an_unwelded_seam_are_merged() {
        // The +x side uses its own copies of corners 1, 3, 5 and 7, so the
        // vertical seams at x = 1 are crossed by two edges each.
        let mut cube = unit_cube();
        for c in [1, 3, 5, 7] {
            cube.vertices.push(cube.vertices[c].clone());
        }
        cube.faces[10] = [8, 9, 11];
        cube.faces[11] = [8, 11, 10];

        let (lower, stats) = cut(&cube, 2, 0.5, KeepSide::Below);
        assert_eq!(stats.merged, 2);
        assert_eq!(stats.caps, 1);
        assert_eq!(stats.unclosed, 0);
        assert_relative_eq!(lower.signed_volume(), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn run_points_get_a_fan_inside_the_cap() {
        // Halving a 2x1x1 box puts the side diagonals' crossings in the
        // middle of the cap's edges, so the cap needs fans. The second cut
        // then runs through those fans.
        let slab = box_mesh(&Aabb::new(Point3::origin(), Point3::new(2.0, 1.0, 1.0)));
        let (half, stats) = cut(&slab, 0, 1.0, KeepSide::Below);
        assert_eq!(stats.unclosed, 0);
        let (cut_again, stats) = cut(&half, 2, 0.5, KeepSide::Below);
        assert_eq!(stats.unclosed, 0);
        let report = validate_mesh(&cut_again);
        assert!(report.is_closed_solid(), "{report}");
        // No cap face may be degenerate.
        for &[a, b, c] in &cut_again.faces {
            let tri = Triangle::new(
                cut_again.position(a),
                cut_again.position(b),
                cut_again.position(c),
            );
            assert!(tri.area() > 1e-12);
        }
        assert_relative_eq!(cut_again.signed_volume(), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn open_input_leaves_unclosed_chain() {
        // Remove a side face that crosses the plane; the cut contour breaks.
        let mut open = unit_cube();
        open.faces.retain(|f| !(f.contains(&1) && f.contains(&3) && f.contains(&7)));
        let (_, stats) = cut(&open, 2, 0.5, KeepSide::Below);
        assert!(stats.unclosed > 0);
    }
}
