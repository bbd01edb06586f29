//! Naming and writing fragments.

use std::fs;
use std::path::{Path, PathBuf};

use mesh_io::{save_mesh_with, IoResult, MeshFormat};
use mesh_types::{Aabb, IndexedMesh};
use tracing::debug;

use crate::grid::CellIndex;

/// The closed (or raw) mesh cut from one grid cell.
#[derive(Debug, Clone)]
pub struct Fragment {
    /// Cell the fragment came from.
    pub index: CellIndex,
    /// The cell box.
    pub bounds: Aabb,
    /// Fragment geometry.
    pub mesh: IndexedMesh,
}

impl Fragment {
    /// `part_x<i>_y<j>_z<k>.<ext>`.
    ///
    /// ```
    /// use mesh_grid::{CellIndex, Fragment};
    /// use mesh_io::MeshFormat;
    /// use mesh_types::{Aabb, IndexedMesh};
    ///
    /// let fragment = Fragment {
    ///     index: CellIndex::new(1, 0, 2),
    ///     bounds: Aabb::empty(),
    ///     mesh: IndexedMesh::new(),
    /// };
    /// assert_eq!(fragment.file_name(MeshFormat::Stl), "part_x1_y0_z2.stl");
    /// ```
    #[must_use]
    pub fn file_name(&self, format: MeshFormat) -> String {
        format!("{}.{}", self.index.file_stem(), format.extension())
    }
}

/// Destination for fragments.
///
/// Implementations must accept writes from several threads at once when the
/// split runs in parallel. Each fragment name is unique per run.
pub trait FragmentSink: Send + Sync {
    /// Called once before the first fragment.
    ///
    /// # Errors
    ///
    /// Any failure here aborts the run.
    fn prepare(&self) -> IoResult<()> {
        Ok(())
    }

    /// Store one fragment, returning where it went.
    ///
    /// # Errors
    ///
    /// A failure skips this fragment only.
    fn write(&self, fragment: &Fragment) -> IoResult<PathBuf>;

    /// Location reported in the summary.
    fn destination(&self) -> &Path;
}

/// Writes each fragment as its own file in one directory.
///
/// # Example
///
/// ```no_run
/// use mesh_grid::{FragmentEmitter, FragmentSink};
/// use mesh_io::MeshFormat;
///
/// let emitter = FragmentEmitter::new("output_parts", MeshFormat::Stl);
/// emitter.prepare().unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct FragmentEmitter {
    dir: PathBuf,
    format: MeshFormat,
    binary: bool,
}

impl FragmentEmitter {
    /// Binary files of `format` under `dir`.
    pub fn new<P: Into<PathBuf>>(dir: P, format: MeshFormat) -> Self {
        Self {
            dir: dir.into(),
            format,
            binary: true,
        }
    }

    /// Choose binary or ASCII encoding for STL and PLY.
    #[must_use]
    pub fn with_binary(mut self, binary: bool) -> Self {
        self.binary = binary;
        self
    }

    /// Output directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Fragment file format.
    #[must_use]
    pub const fn format(&self) -> MeshFormat {
        self.format
    }

    /// Path the fragment for `index` is written to.
    #[must_use]
    pub fn path_for(&self, index: CellIndex) -> PathBuf {
        self.dir
            .join(format!("{}.{}", index.file_stem(), self.format.extension()))
    }
}

impl FragmentSink for FragmentEmitter {
    fn prepare(&self) -> IoResult<()> {
        fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    fn write(&self, fragment: &Fragment) -> IoResult<PathBuf> {
        let path = self.dir.join(fragment.file_name(self.format));
        save_mesh_with(&fragment.mesh, &path, self.format, self.binary)?;
        debug!(path = %path.display(), faces = fragment.mesh.faces.len(), "Fragment written");
        Ok(path)
    }

    fn destination(&self) -> &Path {
        &self.dir
    }
}
