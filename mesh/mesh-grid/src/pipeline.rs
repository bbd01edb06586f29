//! The split loop.

use std::path::{Path, PathBuf};

use mesh_clip::{clip_to_box, SurfaceCap, SurfaceCapper};
use mesh_io::load_mesh;
use mesh_repair::make_manifold;
use mesh_types::IndexedMesh;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::bounds::compute_bounds;
use crate::emit::{Fragment, FragmentEmitter, FragmentSink};
use crate::error::{CellError, GridResult};
use crate::grid::{GridCell, GridPartition};
use crate::observer::{FragmentObserver, PreviewCollector};
use crate::params::SplitParams;
use crate::report::{CellFailure, SplitReport};

/// What became of one cell.
enum CellOutcome {
    Empty,
    Written {
        path: PathBuf,
        faces: usize,
        fragment: Option<Fragment>,
    },
    Failed(CellError),
}

/// Splits one mesh into per-cell fragments.
///
/// The mesh is borrowed read-only for the whole run and should already be
/// repaired (see [`make_manifold`]); [`split_file`] does both.
///
/// The capping strategy is a type parameter so it can be swapped without
/// touching the loop.
///
/// # Example
///
/// ```
/// use mesh_grid::{FragmentSink, Fragment, GridSplitter, SplitParams};
/// use mesh_io::IoResult;
/// use mesh_types::{box_mesh, Aabb, Point3, Vector3};
/// use std::path::{Path, PathBuf};
/// use std::sync::Mutex;
///
/// #[derive(Default)]
/// struct Names(Mutex<Vec<String>>);
///
/// impl FragmentSink for Names {
///     fn write(&self, fragment: &Fragment) -> IoResult<PathBuf> {
///         let name = fragment.file_name(Default::default());
///         self.0.lock().unwrap().push(name.clone());
///         Ok(PathBuf::from(name))
///     }
///     fn destination(&self) -> &Path {
///         Path::new("memory")
///     }
/// }
///
/// let cube = box_mesh(&Aabb::new(Point3::origin(), Point3::new(100.0, 100.0, 100.0)));
/// let params = SplitParams::default().with_grid_size(Vector3::new(60.0, 60.0, 60.0));
/// let sink = Names::default();
///
/// let report = GridSplitter::new(&cube, params).run(&sink, &mut ()).unwrap();
/// assert_eq!(report.parts(), 8);
/// assert_eq!(sink.0.lock().unwrap()[0], "part_x0_y0_z0.stl");
/// ```
#[derive(Debug, Clone)]
pub struct GridSplitter<'m, C = SurfaceCapper> {
    mesh: &'m IndexedMesh,
    params: SplitParams,
    capper: C,
}

impl<'m> GridSplitter<'m> {
    /// Splitter using [`SurfaceCapper`] with `params.capping`.
    #[must_use]
    pub fn new(mesh: &'m IndexedMesh, params: SplitParams) -> Self {
        let capper = SurfaceCapper::new(params.capping.clone());
        Self {
            mesh,
            params,
            capper,
        }
    }
}

impl<'m, C: SurfaceCap> GridSplitter<'m, C> {
    /// Replace the capping strategy.
    #[must_use]
    pub fn with_capper<D: SurfaceCap>(self, capper: D) -> GridSplitter<'m, D> {
        GridSplitter {
            mesh: self.mesh,
            params: self.params,
            capper,
        }
    }

    /// The run parameters.
    #[must_use]
    pub const fn params(&self) -> &SplitParams {
        &self.params
    }

    /// Lattice over the mesh bounds.
    ///
    /// # Errors
    ///
    /// [`GridError::EmptyMesh`](crate::GridError::EmptyMesh),
    /// [`GridError::InvalidGridSize`](crate::GridError::InvalidGridSize) or
    /// [`GridError::TooManyCells`](crate::GridError::TooManyCells).
    pub fn partition(&self) -> GridResult<GridPartition> {
        let bounds = compute_bounds(self.mesh)?;
        GridPartition::new(bounds, self.params.grid_size)
    }

    /// Clip, cap and emit every cell.
    ///
    /// Cell failures are logged and collected in the report; only
    /// pre-flight problems (empty mesh, bad grid size, sink preparation)
    /// return an error.
    ///
    /// # Errors
    ///
    /// See [`partition`](Self::partition); also
    /// [`GridError::Io`](crate::GridError::Io) if the sink cannot be
    /// prepared.
    pub fn run<S, O>(&self, sink: &S, observer: &mut O) -> GridResult<SplitReport>
    where
        S: FragmentSink + ?Sized,
        O: FragmentObserver + ?Sized,
    {
        let partition = self.partition()?;
        let [nx, ny, nz] = partition.dims();
        let size = self.params.grid_size;
        info!("Original Bounds: {}", partition.bounds());
        info!("Grid Size: [{}, {}, {}]", size.x, size.y, size.z);
        info!(nx, ny, nz, "Max Chunks: {}", partition.cell_count());

        sink.prepare()?;
        observer.source(self.mesh, partition.bounds());

        let mut report = SplitReport::new(sink.destination().to_path_buf(), partition.dims());
        if self.params.parallel {
            let keep = observer.wants_fragments();
            let cells: Vec<GridCell> = partition.cells().collect();
            let outcomes: Vec<(GridCell, CellOutcome)> = cells
                .into_par_iter()
                .map(|cell| {
                    let outcome = self.visit(&cell, sink, keep);
                    (cell, outcome)
                })
                .collect();
            for (cell, outcome) in outcomes {
                Self::record(&mut report, observer, &cell, outcome);
            }
        } else {
            for cell in partition.cells() {
                let outcome = self.visit(&cell, sink, true);
                Self::record(&mut report, observer, &cell, outcome);
            }
        }

        info!(
            visited = report.visited,
            written = report.parts(),
            empty = report.empty,
            failed = report.failed.len(),
            "{report}"
        );
        Ok(report)
    }

    /// Build the fragment for one cell, or `None` if the cell is empty.
    ///
    /// # Errors
    ///
    /// Whatever the capper reports.
    pub fn fragment(&self, cell: &GridCell) -> Result<Option<Fragment>, CellError> {
        let Some(clipped) = clip_to_box(self.mesh, &cell.bounds, self.params.clip_epsilon) else {
            return Ok(None);
        };

        let mesh = if self.params.cap {
            let capped = self.capper.cap(self.mesh, &cell.bounds)?;
            if capped.used_fallback() {
                debug!(i = cell.index.i, j = cell.index.j, k = cell.index.k, "{capped}");
            }
            if capped.is_empty() {
                return Ok(None);
            }
            capped.mesh
        } else {
            clipped
        };

        Ok(Some(Fragment {
            index: cell.index,
            bounds: cell.bounds,
            mesh,
        }))
    }

    fn visit<S>(&self, cell: &GridCell, sink: &S, keep: bool) -> CellOutcome
    where
        S: FragmentSink + ?Sized,
    {
        let fragment = match self.fragment(cell) {
            Ok(Some(fragment)) => fragment,
            Ok(None) => return CellOutcome::Empty,
            Err(e) => return CellOutcome::Failed(e),
        };
        match sink.write(&fragment) {
            Ok(path) => CellOutcome::Written {
                path,
                faces: fragment.mesh.faces.len(),
                fragment: keep.then_some(fragment),
            },
            Err(e) => CellOutcome::Failed(CellError::Emit(e)),
        }
    }

    fn record<O>(report: &mut SplitReport, observer: &mut O, cell: &GridCell, outcome: CellOutcome)
    where
        O: FragmentObserver + ?Sized,
    {
        let index = cell.index;
        report.visited += 1;
        match outcome {
            CellOutcome::Empty => report.empty += 1,
            CellOutcome::Written {
                path,
                faces,
                fragment,
            } => {
                info!(faces, "Saved: {}", path.display());
                if let Some(fragment) = fragment {
                    observer.fragment(&fragment);
                }
                report.written.push(path);
            }
            CellOutcome::Failed(reason) => {
                warn!(
                    i = index.i,
                    j = index.j,
                    k = index.k,
                    error = %reason,
                    "Skipping cell"
                );
                report.failed.push(CellFailure { index, reason });
            }
        }
    }
}

/// Load `input`, repair it, and write its fragments into `output`.
///
/// Writes `preview.ply` into `output` as well when `params.preview` is set.
///
/// # Errors
///
/// Fails before any cell is processed if the input cannot be read, is
/// empty, or the grid size is invalid; fails afterwards only if the preview
/// cannot be written.
pub fn split_file<P, Q>(input: P, output: Q, params: SplitParams) -> GridResult<SplitReport>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let input = input.as_ref();
    let output = output.as_ref();

    let mut mesh = load_mesh(input)?;
    info!(
        path = %input.display(),
        vertices = mesh.vertices.len(),
        faces = mesh.faces.len(),
        "Loaded mesh"
    );
    make_manifold(&mut mesh, &params.repair);

    let sink = FragmentEmitter::new(output, params.format).with_binary(params.binary);
    let preview = params.preview;
    let splitter = GridSplitter::new(&mesh, params);

    if preview {
        let mut collector = PreviewCollector::new(output.join("preview.ply"));
        let report = splitter.run(&sink, &mut collector)?;
        collector.write()?;
        Ok(report)
    } else {
        splitter.run(&sink, &mut ())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::GridError;
    use mesh_repair::validate_mesh;
    use mesh_types::{box_mesh, Aabb, Point3, Vector3};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Collect(Mutex<Vec<Fragment>>);

    impl FragmentSink for Collect {
        fn write(&self, fragment: &Fragment) -> mesh_io::IoResult<PathBuf> {
            self.0.lock().unwrap().push(fragment.clone());
            Ok(PathBuf::from(fragment.file_name(mesh_io::MeshFormat::Stl)))
        }

        fn destination(&self) -> &Path {
            Path::new("memory")
        }
    }

    fn block() -> IndexedMesh {
        box_mesh(&Aabb::new(Point3::origin(), Point3::new(100.0, 40.0, 40.0)))
    }

    #[test]
    fn slab_splits_along_x() {
        let mesh = block();
        let params = SplitParams::default().with_grid_size(Vector3::new(30.0, 50.0, 50.0));
        let sink = Collect::default();
        let report = GridSplitter::new(&mesh, params).run(&sink, &mut ()).unwrap();

        assert_eq!(report.dims, [4, 1, 1]);
        assert_eq!(report.parts(), 4);
        let fragments = sink.0.into_inner().unwrap();
        let volumes: Vec<f64> = fragments.iter().map(|f| f.mesh.volume()).collect();
        for (v, expected) in volumes.iter().zip([48000.0, 48000.0, 48000.0, 16000.0]) {
            assert!((v - expected).abs() < 1e-6, "{v} vs {expected}");
        }
        assert!(fragments.iter().all(|f| validate_mesh(&f.mesh).is_closed_solid()));
    }

    #[test]
    fn raw_mode_leaves_fragments_open() {
        let mesh = block();
        let params = SplitParams::raw().with_grid_size(Vector3::new(50.0, 50.0, 50.0));
        let sink = Collect::default();
        let report = GridSplitter::new(&mesh, params).run(&sink, &mut ()).unwrap();

        assert_eq!(report.parts(), 2);
        for fragment in sink.0.into_inner().unwrap() {
            let report = validate_mesh(&fragment.mesh);
            assert!(!report.is_watertight);
            assert_eq!(report.non_manifold_edge_count, 0);
        }
    }

    #[test]
    fn fragment_of_single_cell() {
        let mesh = block();
        let splitter = GridSplitter::new(&mesh, SplitParams::default());
        let partition = splitter.partition().unwrap();
        let last = partition.cells().last().unwrap();
        let fragment = splitter.fragment(&last).unwrap().unwrap();
        assert_eq!(fragment.index, last.index);
        assert!((fragment.mesh.volume() - 50.0 * 40.0 * 40.0).abs() < 1e-6);
    }

    #[test]
    fn preflight_errors() {
        let empty = IndexedMesh::new();
        let err = GridSplitter::new(&empty, SplitParams::default())
            .run(&Collect::default(), &mut ())
            .unwrap_err();
        assert!(matches!(err, GridError::EmptyMesh));

        let mesh = block();
        let params = SplitParams::default().with_grid_size(Vector3::new(10.0, -1.0, 10.0));
        let err = GridSplitter::new(&mesh, params)
            .run(&Collect::default(), &mut ())
            .unwrap_err();
        assert!(matches!(err, GridError::InvalidGridSize { .. }));
    }
}
