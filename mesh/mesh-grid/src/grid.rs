//! Uniform lattice over a bounding box.
//!
//! Cells start at the box minimum and advance by the cell size. The last
//! cell on each axis is clamped to the box maximum, so it may be thinner than
//! the others but never sticks out. Neighbouring cells share their boundary
//! coordinate exactly.

use std::fmt;
use std::iter::FusedIterator;

use mesh_types::{Aabb, Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{GridError, GridResult};

/// Zero-based lattice position of a cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CellIndex {
    /// Position along x.
    pub i: usize,
    /// Position along y.
    pub j: usize,
    /// Position along z.
    pub k: usize,
}

impl CellIndex {
    /// Create an index.
    #[inline]
    #[must_use]
    pub const fn new(i: usize, j: usize, k: usize) -> Self {
        Self { i, j, k }
    }

    /// File name without extension, `part_x<i>_y<j>_z<k>`.
    #[must_use]
    pub fn file_stem(&self) -> String {
        format!("part_x{}_y{}_z{}", self.i, self.j, self.k)
    }
}

impl fmt::Display for CellIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.i, self.j, self.k)
    }
}

/// One lattice cell and its concrete box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridCell {
    /// Lattice position.
    pub index: CellIndex,
    /// Cell box, clamped to the partitioned bounds.
    pub bounds: Aabb,
}

/// Number of cells needed to cover `[min, max]` with steps of `step`.
///
/// `ceil((max - min) / step)`, minus one if rounding left a final cell that
/// would start at or past `max`. A flat or inverted range has no cells. The
/// count saturates at `usize::MAX`.
///
/// ```
/// use mesh_grid::axis_cell_count;
///
/// assert_eq!(axis_cell_count(0.0, 100.0, 30.0), 4);
/// assert_eq!(axis_cell_count(0.0, 100.0, 50.0), 2);
/// assert_eq!(axis_cell_count(0.0, 100.0, 500.0), 1);
/// assert_eq!(axis_cell_count(5.0, 5.0, 1.0), 0);
/// ```
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
pub fn axis_cell_count(min: f64, max: f64, step: f64) -> usize {
    let span = max - min;
    if span.is_nan() || span <= 0.0 || step.is_nan() || step <= 0.0 {
        return 0;
    }
    let mut n = (span / step).ceil() as usize;
    while n > 1 && min + (n - 1) as f64 * step >= max {
        n -= 1;
    }
    n.max(1)
}

/// A uniform lattice of cells over a bounding box.
///
/// # Example
///
/// ```
/// use mesh_grid::{CellIndex, GridPartition};
/// use mesh_types::{Aabb, Point3, Vector3};
///
/// let bounds = Aabb::new(Point3::origin(), Point3::new(100.0, 100.0, 100.0));
/// let grid = GridPartition::new(bounds, Vector3::new(60.0, 60.0, 60.0)).unwrap();
///
/// assert_eq!(grid.dims(), [2, 2, 2]);
/// let last = grid.cell(CellIndex::new(1, 1, 1)).unwrap();
/// assert_eq!(last.bounds.min, Point3::new(60.0, 60.0, 60.0));
/// assert_eq!(last.bounds.max, Point3::new(100.0, 100.0, 100.0));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct GridPartition {
    bounds: Aabb,
    step: Vector3<f64>,
    dims: [usize; 3],
}

impl GridPartition {
    /// Lay a lattice with cell size `step` over `bounds`.
    ///
    /// An empty or flat box is accepted and has no cells.
    ///
    /// # Errors
    ///
    /// [`GridError::InvalidGridSize`] if any component of `step` is not
    /// strictly positive (NaN included), [`GridError::TooManyCells`] if the
    /// step is so small that the cell count overflows.
    pub fn new(bounds: Aabb, step: Vector3<f64>) -> GridResult<Self> {
        if step.iter().any(|s| s.is_nan() || *s <= 0.0) {
            return Err(GridError::InvalidGridSize {
                size: [step.x, step.y, step.z],
            });
        }
        let dims = if bounds.is_empty() {
            [0; 3]
        } else {
            [0, 1, 2].map(|axis| axis_cell_count(bounds.min[axis], bounds.max[axis], step[axis]))
        };
        if dims[0]
            .checked_mul(dims[1])
            .and_then(|n| n.checked_mul(dims[2]))
            .is_none()
        {
            return Err(GridError::TooManyCells { dims });
        }
        Ok(Self { bounds, step, dims })
    }

    /// The partitioned box.
    #[must_use]
    pub const fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    /// Nominal cell size.
    #[must_use]
    pub const fn step(&self) -> &Vector3<f64> {
        &self.step
    }

    /// Cells per axis.
    #[must_use]
    pub const fn dims(&self) -> [usize; 3] {
        self.dims
    }

    /// Total number of cells. Checked not to overflow on construction.
    #[must_use]
    pub const fn cell_count(&self) -> usize {
        self.dims[0] * self.dims[1] * self.dims[2]
    }

    /// The cell at `index`, or `None` outside the lattice.
    #[must_use]
    pub fn cell(&self, index: CellIndex) -> Option<GridCell> {
        let [nx, ny, nz] = self.dims;
        if index.i >= nx || index.j >= ny || index.k >= nz {
            return None;
        }
        let (i, j, k) = (index.i, index.j, index.k);
        let min = Point3::new(
            self.boundary(0, i),
            self.boundary(1, j),
            self.boundary(2, k),
        );
        let max = Point3::new(
            self.boundary(0, i + 1),
            self.boundary(1, j + 1),
            self.boundary(2, k + 1),
        );
        Some(GridCell {
            index,
            bounds: Aabb { min, max },
        })
    }

    /// Every cell, x outermost and z innermost.
    ///
    /// Lazy; call again to start over.
    #[must_use]
    pub fn cells(&self) -> GridCells<'_> {
        GridCells {
            partition: self,
            next: 0,
            end: self.cell_count(),
        }
    }

    /// Coordinate of boundary `n` along `axis`; the last one is the box max.
    #[allow(clippy::cast_precision_loss)]
    fn boundary(&self, axis: usize, n: usize) -> f64 {
        let (min, max) = self.bounds.axis_range(axis);
        if n >= self.dims[axis] {
            max
        } else {
            (min + n as f64 * self.step[axis]).min(max)
        }
    }

    fn index_at(&self, flat: usize) -> CellIndex {
        let [_, ny, nz] = self.dims;
        CellIndex {
            i: flat / (ny * nz),
            j: (flat / nz) % ny,
            k: flat % nz,
        }
    }
}

impl<'a> IntoIterator for &'a GridPartition {
    type Item = GridCell;
    type IntoIter = GridCells<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.cells()
    }
}

/// Iterator over the cells of a [`GridPartition`].
#[derive(Debug, Clone)]
pub struct GridCells<'a> {
    partition: &'a GridPartition,
    next: usize,
    end: usize,
}

impl Iterator for GridCells<'_> {
    type Item = GridCell;

    fn next(&mut self) -> Option<GridCell> {
        if self.next >= self.end {
            return None;
        }
        let index = self.partition.index_at(self.next);
        self.next += 1;
        self.partition.cell(index)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.end - self.next;
        (left, Some(left))
    }
}

impl ExactSizeIterator for GridCells<'_> {}
impl FusedIterator for GridCells<'_> {}
