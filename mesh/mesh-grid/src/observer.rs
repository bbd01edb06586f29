//! Watching a split as it happens.

use std::path::{Path, PathBuf};

use mesh_io::{save_ply, IoResult};
use mesh_types::{Aabb, IndexedMesh, VertexColor};
use tracing::{debug, info};

use crate::emit::Fragment;
use crate::grid::CellIndex;

/// Receives the source mesh and every written fragment.
///
/// Observers cannot influence the split. Fragments arrive in x-y-z cell
/// order, also when cells are processed in parallel.
pub trait FragmentObserver {
    /// The mesh being split and its bounds, before any cell.
    fn source(&mut self, _mesh: &IndexedMesh, _bounds: &Aabb) {}

    /// A fragment that was just written.
    fn fragment(&mut self, _fragment: &Fragment) {}

    /// Whether [`fragment`](Self::fragment) needs the geometry.
    ///
    /// When `false` a parallel run drops each fragment as soon as it has been
    /// written instead of holding on to it for this observer.
    fn wants_fragments(&self) -> bool {
        true
    }
}

/// No observer.
impl FragmentObserver for () {
    fn wants_fragments(&self) -> bool {
        false
    }
}

/// Palette for neighbouring fragments.
const PALETTE: [VertexColor; 10] = [
    VertexColor::new(31, 119, 180),
    VertexColor::new(255, 127, 14),
    VertexColor::new(44, 160, 44),
    VertexColor::new(214, 39, 40),
    VertexColor::new(148, 103, 189),
    VertexColor::new(140, 86, 75),
    VertexColor::new(227, 119, 194),
    VertexColor::new(127, 127, 127),
    VertexColor::new(188, 189, 34),
    VertexColor::new(23, 190, 207),
];

/// Collects fragments into one coloured mesh for a quick visual check.
///
/// Only written fragments are kept. Call [`write`](Self::write) once the run
/// is over.
///
/// # Example
///
/// ```
/// use mesh_grid::{CellIndex, Fragment, FragmentObserver, PreviewCollector};
/// use mesh_types::{unit_cube, Aabb};
///
/// let mut preview = PreviewCollector::new("out/preview.ply");
/// preview.fragment(&Fragment {
///     index: CellIndex::new(0, 0, 0),
///     bounds: Aabb::empty(),
///     mesh: unit_cube(),
/// });
/// assert_eq!(preview.fragment_count(), 1);
/// assert!(preview.mesh().vertices.iter().all(|v| v.color.is_some()));
/// ```
#[derive(Debug, Clone)]
pub struct PreviewCollector {
    path: PathBuf,
    include_source: bool,
    mesh: IndexedMesh,
    fragments: usize,
}

impl PreviewCollector {
    /// Collector that will write to `path`.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            include_source: false,
            mesh: IndexedMesh::new(),
            fragments: 0,
        }
    }

    /// Also include the source mesh, in light grey.
    #[must_use]
    pub fn with_source(mut self, include: bool) -> Self {
        self.include_source = include;
        self
    }

    /// Colour used for the fragment of `index`.
    ///
    /// Cells that share a face never get the same colour.
    #[must_use]
    pub fn color_for(index: CellIndex) -> VertexColor {
        PALETTE[(index.i * 7 + index.j * 5 + index.k * 3) % PALETTE.len()]
    }

    /// Where the preview goes.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Everything collected so far.
    #[must_use]
    pub const fn mesh(&self) -> &IndexedMesh {
        &self.mesh
    }

    /// Fragments collected so far.
    #[must_use]
    pub const fn fragment_count(&self) -> usize {
        self.fragments
    }

    /// Write the collected mesh as binary PLY with vertex colours.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn write(&self) -> IoResult<PathBuf> {
        save_ply(&self.mesh, &self.path, true)?;
        info!(
            path = %self.path.display(),
            fragments = self.fragments,
            "Preview written"
        );
        Ok(self.path.clone())
    }

    fn append(&mut self, mesh: &IndexedMesh, color: VertexColor) {
        let mut tinted = mesh.clone();
        for v in &mut tinted.vertices {
            v.color = Some(color);
        }
        self.mesh.merge(&tinted);
    }
}

impl FragmentObserver for PreviewCollector {
    fn source(&mut self, mesh: &IndexedMesh, bounds: &Aabb) {
        debug!(%bounds, faces = mesh.faces.len(), "Preview source");
        if self.include_source {
            self.append(mesh, VertexColor::LIGHT_GREY);
        }
    }

    fn fragment(&mut self, fragment: &Fragment) {
        self.append(&fragment.mesh, Self::color_for(fragment.index));
        self.fragments += 1;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use mesh_io::load_ply;
    use mesh_types::{box_mesh, unit_cube, MeshBounds, Point3};

    fn fragment_at(i: usize, j: usize, k: usize) -> Fragment {
        let min = Point3::new(i as f64, j as f64, k as f64);
        let bounds = Aabb::new(min, min + mesh_types::Vector3::repeat(1.0));
        Fragment {
            index: CellIndex::new(i, j, k),
            bounds,
            mesh: box_mesh(&bounds),
        }
    }

    #[test]
    fn face_neighbours_differ_in_colour() {
        for i in 0..4 {
            for j in 0..4 {
                for k in 0..4 {
                    let here = PreviewCollector::color_for(CellIndex::new(i, j, k));
                    for next in [
                        CellIndex::new(i + 1, j, k),
                        CellIndex::new(i, j + 1, k),
                        CellIndex::new(i, j, k + 1),
                    ] {
                        assert_ne!(here, PreviewCollector::color_for(next));
                    }
                }
            }
        }
    }

    #[test]
    fn source_is_skipped_unless_requested() {
        let cube = unit_cube();
        let mut plain = PreviewCollector::new("unused.ply");
        plain.source(&cube, &cube.bounds());
        assert!(plain.mesh().vertices.is_empty());

        let mut with_source = PreviewCollector::new("unused.ply").with_source(true);
        with_source.source(&cube, &cube.bounds());
        assert_eq!(with_source.mesh().faces.len(), 12);
        assert_eq!(
            with_source.mesh().vertices[0].color,
            Some(VertexColor::LIGHT_GREY)
        );
        assert_eq!(with_source.fragment_count(), 0);
    }

    #[test]
    fn writes_coloured_ply() {
        let tmp = tempfile::tempdir().unwrap();
        let mut preview = PreviewCollector::new(tmp.path().join("preview.ply"));
        preview.fragment(&fragment_at(0, 0, 0));
        preview.fragment(&fragment_at(1, 0, 0));
        let path = preview.write().unwrap();

        let back = load_ply(&path).unwrap();
        assert_eq!(back.faces.len(), 24);
        assert_eq!(
            back.vertices[0].color,
            Some(PreviewCollector::color_for(CellIndex::new(0, 0, 0)))
        );
        assert_eq!(
            back.vertices[8].color,
            Some(PreviewCollector::color_for(CellIndex::new(1, 0, 0)))
        );
    }

    #[test]
    fn unit_observer_declines_geometry() {
        assert!(!().wants_fragments());
        assert!(PreviewCollector::new("p.ply").wants_fragments());
    }
}
