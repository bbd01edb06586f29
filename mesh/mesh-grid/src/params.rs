//! Split parameters and presets.

use mesh_clip::CapParams;
use mesh_io::MeshFormat;
use mesh_repair::ManifoldParams;
use mesh_types::Vector3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Parameters for [`GridSplitter`](crate::GridSplitter) and
/// [`split_file`](crate::split_file).
///
/// # Example
///
/// ```
/// use mesh_grid::SplitParams;
/// use mesh_io::MeshFormat;
///
/// let params = SplitParams::for_build_volume(220.0, 220.0, 250.0)
///     .with_format(MeshFormat::Obj)
///     .with_parallel(true);
/// assert_eq!(params.grid_size.x, 220.0);
/// assert!(params.cap);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SplitParams {
    /// Nominal cell size along x, y and z.
    ///
    /// Default: `50 x 50 x 50`
    pub grid_size: Vector3<f64>,

    /// Close every fragment. When off, the raw clipped surface is written.
    ///
    /// Default: `true`
    pub cap: bool,

    /// Repair applied to the input before splitting.
    pub repair: ManifoldParams,

    /// Capping tolerances.
    pub capping: CapParams,

    /// Slack when clipping faces against a cell.
    ///
    /// Default: `1e-9`
    pub clip_epsilon: f64,

    /// Fragment file format.
    ///
    /// Default: STL
    pub format: MeshFormat,

    /// Binary encoding for STL and PLY fragments.
    ///
    /// Default: `true`
    pub binary: bool,

    /// Process cells on the rayon thread pool.
    ///
    /// Default: `false`
    pub parallel: bool,

    /// Write `preview.ply` with every fragment coloured, next to the parts.
    ///
    /// Default: `false`
    pub preview: bool,
}

impl Default for SplitParams {
    fn default() -> Self {
        Self {
            grid_size: Vector3::new(50.0, 50.0, 50.0),
            cap: true,
            repair: ManifoldParams::default(),
            capping: CapParams::default(),
            clip_epsilon: 1e-9,
            format: MeshFormat::Stl,
            binary: true,
            parallel: false,
            preview: false,
        }
    }
}

impl SplitParams {
    /// Cells sized to a printer's build volume.
    #[must_use]
    pub fn for_build_volume(x: f64, y: f64, z: f64) -> Self {
        Self {
            grid_size: Vector3::new(x, y, z),
            ..Default::default()
        }
    }

    /// Raw clipped surfaces, no capping.
    #[must_use]
    pub fn raw() -> Self {
        Self {
            cap: false,
            ..Default::default()
        }
    }

    /// Set the cell size.
    #[must_use]
    pub fn with_grid_size(mut self, size: Vector3<f64>) -> Self {
        self.grid_size = size;
        self
    }

    /// Enable or disable capping.
    #[must_use]
    pub fn with_cap(mut self, cap: bool) -> Self {
        self.cap = cap;
        self
    }

    /// Set the input repair parameters.
    #[must_use]
    pub fn with_repair(mut self, repair: ManifoldParams) -> Self {
        self.repair = repair;
        self
    }

    /// Set the capping parameters.
    #[must_use]
    pub fn with_capping(mut self, capping: CapParams) -> Self {
        self.capping = capping;
        self
    }

    /// Set the clipping slack.
    #[must_use]
    pub fn with_clip_epsilon(mut self, epsilon: f64) -> Self {
        self.clip_epsilon = epsilon;
        self
    }

    /// Set the fragment format.
    #[must_use]
    pub fn with_format(mut self, format: MeshFormat) -> Self {
        self.format = format;
        self
    }

    /// Choose binary or ASCII encoding.
    #[must_use]
    pub fn with_binary(mut self, binary: bool) -> Self {
        self.binary = binary;
        self
    }

    /// Enable or disable parallel cell processing.
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Enable or disable the preview file.
    #[must_use]
    pub fn with_preview(mut self, preview: bool) -> Self {
        self.preview = preview;
        self
    }
}
