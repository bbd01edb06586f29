//! Two-stage closing of a cell fragment.
//!
//! Stage one cuts the repaired source mesh with the six faces of the cell
//! box, capping each cut exactly in its plane ([`cap_to_box`]). Stage two
//! welds the result and closes whatever boundary is left with the generic
//! hole fill from `mesh-repair` ([`close_remaining_holes`]). Stage one fails
//! to close contours that are degenerate or that the source mesh left open;
//! stage two exists for those.

use std::fmt;

use mesh_repair::{
    clean_mesh, compute_vertex_normals, fill_holes, fix_winding_order, validate_mesh,
    CleanupSummary, MeshAdjacency,
};
use mesh_types::{Aabb, IndexedMesh};
use tracing::{debug, warn};

use crate::cut::{cut_and_cap, CutStats};
use crate::error::{ClipError, ClipResult};
use crate::params::CapParams;
use crate::plane::AxisPlane;

/// Turns a source mesh and a cell box into a closed fragment.
///
/// The grid splitter is generic over this so tests can substitute a capper
/// that fails on chosen cells.
pub trait SurfaceCap: Send + Sync {
    /// Close the part of `source` inside `cell`.
    ///
    /// # Errors
    ///
    /// Any geometric failure. The caller decides whether it is fatal.
    fn cap(&self, source: &IndexedMesh, cell: &Aabb) -> ClipResult<CapOutput>;
}

/// What the fallback stage did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FallbackSummary {
    /// Cleanup counts from welding the stage-one output.
    pub cleanup: CleanupSummary,
    /// Open edges found after cleanup.
    pub open_edges_before: usize,
    /// Holes closed by the generic fill.
    pub holes_filled: usize,
    /// Open edges left at the end.
    pub open_edges_after: usize,
    /// Edges with more than two faces left at the end.
    pub non_manifold_edges_after: usize,
}

/// A capped fragment and how it was produced.
#[derive(Debug, Clone, Default)]
pub struct CapOutput {
    /// The fragment. Empty when the cell holds no material.
    pub mesh: IndexedMesh,
    /// Stage-one counters, summed over the six planes.
    pub cut: CutStats,
    /// Stage-two counters.
    pub fallback: FallbackSummary,
}

impl CapOutput {
    /// No faces survived.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mesh.faces.is_empty()
    }

    /// The generic hole fill had to step in.
    #[must_use]
    pub fn used_fallback(&self) -> bool {
        self.fallback.holes_filled > 0
    }
}

impl fmt::Display for CapOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} faces, {} caps ({} cap faces), {} holes filled",
            self.mesh.faces.len(),
            self.cut.caps,
            self.cut.cap_faces,
            self.fallback.holes_filled
        )
    }
}

/// The standard two-stage capper.
///
/// # Example
///
/// ```
/// use mesh_clip::{CapParams, SurfaceCap, SurfaceCapper};
/// use mesh_repair::validate_mesh;
/// use mesh_types::{box_mesh, Aabb, Point3};
///
/// let cube = box_mesh(&Aabb::new(Point3::origin(), Point3::new(100.0, 100.0, 100.0)));
/// let cell = Aabb::new(Point3::origin(), Point3::new(60.0, 60.0, 60.0));
///
/// let out = SurfaceCapper::new(CapParams::default()).cap(&cube, &cell).unwrap();
/// assert!(validate_mesh(&out.mesh).is_closed_solid());
/// assert!((out.mesh.volume() - 60.0f64.powi(3)).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SurfaceCapper {
    params: CapParams,
}

impl SurfaceCapper {
    /// Create a capper with the given tolerances.
    #[must_use]
    pub const fn new(params: CapParams) -> Self {
        Self { params }
    }

    /// The tolerances in use.
    #[must_use]
    pub const fn params(&self) -> &CapParams {
        &self.params
    }
}

impl SurfaceCap for SurfaceCapper {
    fn cap(&self, source: &IndexedMesh, cell: &Aabb) -> ClipResult<CapOutput> {
        let (mut mesh, cut) = cap_to_box(source, cell, self.params.plane_epsilon)?;
        if mesh.faces.is_empty() {
            return Ok(CapOutput {
                mesh,
                cut,
                fallback: FallbackSummary::default(),
            });
        }

        let fallback = close_remaining_holes(&mut mesh, &self.params)?;
        Ok(CapOutput {
            mesh,
            cut,
            fallback,
        })
    }
}

/// Stage one: cut `mesh` by the six faces of `aabb`, capping each cut.
///
/// Planes are applied in the order x-min, x-max, y-min, y-max, z-min, z-max.
/// A box that is flat on some axis encloses nothing and yields an empty
/// mesh.
///
/// # Errors
///
/// [`ClipError::InvalidBox`] for an empty or NaN box, or a triangulation
/// failure from one of the cuts.
pub fn cap_to_box(
    mesh: &IndexedMesh,
    aabb: &Aabb,
    plane_epsilon: f64,
) -> ClipResult<(IndexedMesh, CutStats)> {
    let finite = aabb
        .min
        .coords
        .iter()
        .chain(aabb.max.coords.iter())
        .all(|c| c.is_finite());
    if aabb.is_empty() || !finite {
        return Err(ClipError::InvalidBox {
            reason: format!("{aabb}"),
        });
    }
    if aabb.is_degenerate() {
        return Ok((IndexedMesh::new(), CutStats::default()));
    }

    let planes = AxisPlane::box_faces(aabb);
    let (mut current, mut total) = cut_and_cap(mesh, &planes[0], plane_epsilon)?;
    for plane in &planes[1..] {
        if current.faces.is_empty() {
            break;
        }
        let (next, stats) = cut_and_cap(&current, plane, plane_epsilon)?;
        current = next;
        total += stats;
    }
    Ok((current, total))
}

/// Stage two: weld, fill any remaining holes, orient, recompute normals.
///
/// # Errors
///
/// A hole fill failure. With `params.require_closed` set,
/// [`ClipError::OpenBoundary`] if open edges remain and
/// [`ClipError::NonManifold`] if some edge has more than two faces.
pub fn close_remaining_holes(
    mesh: &mut IndexedMesh,
    params: &CapParams,
) -> ClipResult<FallbackSummary> {
    let cleanup = clean_mesh(mesh, params.weld_epsilon, 0.0);
    let open_edges_before = MeshAdjacency::build(&mesh.faces).boundary_edge_count();

    let holes_filled = if open_edges_before > 0 && !mesh.faces.is_empty() {
        let filled = fill_holes(mesh, params.max_hole_edges)?;
        debug!(open_edges_before, filled, "Fallback fill closed cap holes");
        filled
    } else {
        0
    };

    fix_winding_order(mesh);
    compute_vertex_normals(mesh);

    let report = validate_mesh(mesh);
    if !report.is_watertight || !report.is_manifold {
        if params.require_closed {
            return Err(if report.is_watertight {
                ClipError::NonManifold {
                    edges: report.non_manifold_edge_count,
                }
            } else {
                ClipError::OpenBoundary {
                    edges: report.boundary_edge_count,
                }
            });
        }
        warn!(
            open_edges = report.boundary_edge_count,
            non_manifold_edges = report.non_manifold_edge_count,
            "Fragment left unclosed"
        );
    }

    Ok(FallbackSummary {
        cleanup,
        open_edges_before,
        holes_filled,
        open_edges_after: report.boundary_edge_count,
        non_manifold_edges_after: report.non_manifold_edge_count,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use mesh_types::{box_mesh, unit_cube, Point3, Vertex};

    fn cube100() -> IndexedMesh {
        box_mesh(&Aabb::new(Point3::origin(), Point3::new(100.0, 100.0, 100.0)))
    }

    fn capper() -> SurfaceCapper {
        SurfaceCapper::default()
    }

    fn cube_missing_side_triangle() -> IndexedMesh {
        let mut mesh = unit_cube();
        mesh.faces.retain(|f| *f != [1, 3, 7]);
        mesh
    }

    #[test]
    fn every_cell_of_a_two_by_two_split_is_closed() {
        let cube = cube100();
        let mut total = 0.0;
        for &(x0, x1) in &[(0.0, 60.0), (60.0, 100.0)] {
            for &(y0, y1) in &[(0.0, 60.0), (60.0, 100.0)] {
                for &(z0, z1) in &[(0.0, 60.0), (60.0, 100.0)] {
                    let cell = Aabb::new(Point3::new(x0, y0, z0), Point3::new(x1, y1, z1));
                    let out = capper().cap(&cube, &cell).unwrap();
                    assert!(validate_mesh(&out.mesh).is_closed_solid(), "{cell}");
                    assert!(!out.used_fallback());
                    assert_relative_eq!(out.mesh.volume(), cell.volume(), epsilon = 1e-6);
                    total += out.mesh.volume();
                }
            }
        }
        assert_relative_eq!(total, 1e6, epsilon = 1e-3);
    }

    #[test]
    fn cell_outside_the_mesh_is_empty() {
        let cell = Aabb::new(Point3::new(200.0, 0.0, 0.0), Point3::new(260.0, 60.0, 60.0));
        let out = capper().cap(&cube100(), &cell).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn open_source_is_closed_by_the_fallback() {
        // One side triangle missing: the cut contour at z = 0.5 breaks, so
        // stage one leaves the cell open.
        let open = cube_missing_side_triangle();
        let cell = Aabb::new(Point3::new(0.0, 0.0, 0.5), Point3::new(1.0, 1.0, 1.0));

        let out = capper().cap(&open, &cell).unwrap();
        assert!(out.used_fallback());
        assert_eq!(out.fallback.open_edges_after, 0);
        assert!(MeshAdjacency::build(&out.mesh.faces).is_watertight());
    }

    #[test]
    fn unfillable_hole_is_an_error_when_closure_is_required() {
        let open = cube_missing_side_triangle();
        let cell = Aabb::new(Point3::new(0.0, 0.0, 0.5), Point3::new(1.0, 1.0, 1.0));

        let strict = SurfaceCapper::new(CapParams::default().with_max_hole_edges(3));
        assert!(matches!(
            strict.cap(&open, &cell),
            Err(ClipError::OpenBoundary { .. })
        ));

        let lenient = SurfaceCapper::new(CapParams::lenient().with_max_hole_edges(3));
        let out = lenient.cap(&open, &cell).unwrap();
        assert!(out.fallback.open_edges_after > 0);
    }

    /// Unit cube with a second, welded cube sharing its top-front edge, so
    /// that edge has four faces.
    fn cubes_sharing_an_edge() -> IndexedMesh {
        let mut mesh = unit_cube();
        mesh.merge(&box_mesh(&Aabb::new(
            Point3::new(0.0, -1.0, 1.0),
            Point3::new(1.0, 0.0, 2.0),
        )));
        mesh
    }

    #[test]
    fn edge_with_four_faces_is_an_error_when_closure_is_required() {
        let mut strict = cubes_sharing_an_edge();
        assert!(matches!(
            close_remaining_holes(&mut strict, &CapParams::default()),
            Err(ClipError::NonManifold { edges: 1 })
        ));

        let mut lenient = cubes_sharing_an_edge();
        let summary = close_remaining_holes(&mut lenient, &CapParams::lenient()).unwrap();
        assert_eq!(summary.open_edges_after, 0);
        assert_eq!(summary.non_manifold_edges_after, 1);
    }

    #[test]
    fn near_duplicate_vertices_are_welded() {
        // A second copy of a top triangle through a near-duplicate corner.
        let mut mesh = unit_cube();
        mesh.vertices.push(Vertex::from_coords(1.0 + 1e-9, 1.0, 1.0));
        mesh.faces.push([4, 5, 8]);
        let summary = close_remaining_holes(&mut mesh, &CapParams::default()).unwrap();
        assert_eq!(summary.cleanup.vertices_welded, 1);
        assert_eq!(summary.cleanup.duplicates_removed, 1);
        assert_eq!(summary.open_edges_before, 0);
        assert_eq!(mesh.faces.len(), 12);
    }

    #[test]
    fn invalid_box_is_rejected() {
        assert!(matches!(
            cap_to_box(&unit_cube(), &Aabb::empty(), 1e-9),
            Err(ClipError::InvalidBox { .. })
        ));
    }

    #[test]
    fn flat_box_gives_nothing() {
        let flat = Aabb::new(Point3::new(0.0, 0.0, 0.5), Point3::new(1.0, 1.0, 0.5));
        let (mesh, _) = cap_to_box(&unit_cube(), &flat, 1e-9).unwrap();
        assert!(mesh.faces.is_empty());
    }
}
