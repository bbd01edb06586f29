//! Best-effort normalization of an input mesh before it is cut up.

use std::fmt;

use mesh_types::IndexedMesh;
use tracing::{debug, info, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::adjacency::MeshAdjacency;
use crate::holes::fill_holes;
use crate::normals::compute_vertex_normals;
use crate::repair::{clean_mesh, CleanupSummary};
use crate::winding::fix_winding_order;

/// Tolerances and switches for [`make_manifold`].
///
/// All lengths are in mesh units (millimetres for printer meshes).
///
/// # Example
///
/// ```
/// use mesh_repair::ManifoldParams;
///
/// let params = ManifoldParams::for_scans().with_max_hole_edges(500);
/// assert_eq!(params.max_hole_edges, 500);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ManifoldParams {
    /// Vertices closer than this are merged.
    ///
    /// Default: `1e-6`
    pub weld_epsilon: f64,

    /// Triangles with less area than this are dropped.
    ///
    /// Default: `1e-12`
    pub degenerate_area_threshold: f64,

    /// Largest hole, in edges, that will be closed.
    ///
    /// Default: `usize::MAX`, which closes every hole.
    pub max_hole_edges: usize,

    /// Propagate a consistent winding, outward for solids and inward for
    /// cavities.
    ///
    /// Default: `true`
    pub fix_winding: bool,

    /// Recompute per-vertex normals at the end.
    ///
    /// Default: `true`
    pub compute_normals: bool,
}

impl Default for ManifoldParams {
    fn default() -> Self {
        Self {
            weld_epsilon: 1e-6,
            degenerate_area_threshold: 1e-12,
            max_hole_edges: usize::MAX,
            fix_winding: true,
            compute_normals: true,
        }
    }
}

impl ManifoldParams {
    /// Looser welding for noisy scan data.
    #[must_use]
    pub fn for_scans() -> Self {
        Self {
            weld_epsilon: 0.01,
            degenerate_area_threshold: 1e-8,
            ..Default::default()
        }
    }

    /// Tight tolerances that keep small CAD features intact.
    #[must_use]
    pub fn for_cad() -> Self {
        Self {
            weld_epsilon: 1e-9,
            degenerate_area_threshold: 1e-15,
            ..Default::default()
        }
    }

    /// Set the weld distance.
    #[must_use]
    pub fn with_weld_epsilon(mut self, epsilon: f64) -> Self {
        self.weld_epsilon = epsilon;
        self
    }

    /// Set the degenerate area threshold.
    #[must_use]
    pub fn with_degenerate_area_threshold(mut self, threshold: f64) -> Self {
        self.degenerate_area_threshold = threshold;
        self
    }

    /// Set the hole size limit.
    #[must_use]
    pub fn with_max_hole_edges(mut self, edges: usize) -> Self {
        self.max_hole_edges = edges;
        self
    }

    /// Enable or disable winding repair.
    #[must_use]
    pub fn with_fix_winding(mut self, fix: bool) -> Self {
        self.fix_winding = fix;
        self
    }

    /// Enable or disable normal recomputation.
    #[must_use]
    pub fn with_compute_normals(mut self, compute: bool) -> Self {
        self.compute_normals = compute;
        self
    }
}

/// What [`make_manifold`] changed and what it could not fix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifoldSummary {
    /// Vertex count on entry.
    pub initial_vertices: usize,
    /// Face count on entry.
    pub initial_faces: usize,
    /// Vertex count on exit.
    pub final_vertices: usize,
    /// Face count on exit.
    pub final_faces: usize,
    /// Cleanup pass counts.
    pub cleanup: CleanupSummary,
    /// Holes closed.
    pub holes_filled: usize,
    /// Faces whose winding was reversed.
    pub faces_flipped: usize,
    /// Open edges left over.
    pub residual_boundary_edges: usize,
    /// Edges with more than two faces left over.
    pub residual_non_manifold_edges: usize,
}

impl ManifoldSummary {
    /// No open or over-shared edges remain.
    #[must_use]
    pub fn is_manifold(&self) -> bool {
        self.residual_boundary_edges == 0 && self.residual_non_manifold_edges == 0
    }
}

impl fmt::Display for ManifoldSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Manifold repair: {} -> {} verts, {} -> {} faces ({}), {} holes filled, {} flipped",
            self.initial_vertices,
            self.final_vertices,
            self.initial_faces,
            self.final_faces,
            self.cleanup,
            self.holes_filled,
            self.faces_flipped
        )?;
        if !self.is_manifold() {
            write!(
                f,
                "; residual {} open / {} non-manifold edges",
                self.residual_boundary_edges, self.residual_non_manifold_edges
            )?;
        }
        Ok(())
    }
}

/// Normalize `mesh` in place: clean, close holes, orient, recompute normals.
///
/// Never fails. Whatever cannot be fixed is reported in the summary and left
/// in place for later stages to cope with.
///
/// # Example
///
/// ```
/// use mesh_types::unit_cube;
/// use mesh_repair::{make_manifold, ManifoldParams};
///
/// let mut mesh = unit_cube();
/// mesh.faces.truncate(11);
/// mesh.flip_normals();
///
/// let summary = make_manifold(&mut mesh, &ManifoldParams::default());
/// assert_eq!(summary.holes_filled, 1);
/// assert!(summary.is_manifold());
/// assert!((mesh.signed_volume() - 1.0).abs() < 1e-12);
/// ```
pub fn make_manifold(mesh: &mut IndexedMesh, params: &ManifoldParams) -> ManifoldSummary {
    let initial_vertices = mesh.vertices.len();
    let initial_faces = mesh.faces.len();

    info!(
        vertices = initial_vertices,
        faces = initial_faces,
        weld_epsilon = params.weld_epsilon,
        "Starting manifold repair"
    );

    let cleanup = clean_mesh(mesh, params.weld_epsilon, params.degenerate_area_threshold);
    if cleanup.had_changes() {
        debug!(%cleanup, "Cleanup passes changed the mesh");
    }

    let holes_filled = if MeshAdjacency::build(&mesh.faces).is_watertight() {
        0
    } else {
        match fill_holes(mesh, params.max_hole_edges) {
            Ok(n) => n,
            Err(e) => {
                warn!(error = %e, "Hole filling failed, continuing with open mesh");
                0
            }
        }
    };

    let faces_flipped = if params.fix_winding {
        fix_winding_order(mesh)
    } else {
        0
    };

    if params.compute_normals {
        compute_vertex_normals(mesh);
    }

    let adjacency = MeshAdjacency::build(&mesh.faces);
    let summary = ManifoldSummary {
        initial_vertices,
        initial_faces,
        final_vertices: mesh.vertices.len(),
        final_faces: mesh.faces.len(),
        cleanup,
        holes_filled,
        faces_flipped,
        residual_boundary_edges: adjacency.boundary_edge_count(),
        residual_non_manifold_edges: adjacency.non_manifold_edge_count(),
    };

    if summary.is_manifold() {
        info!("{summary}");
    } else {
        warn!("{summary}");
    }
    summary
}
