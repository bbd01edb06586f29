//! Outcome of a split run.

use std::fmt;
use std::path::PathBuf;

use crate::error::CellError;
use crate::grid::CellIndex;

/// A cell that was skipped because of an error.
#[derive(Debug)]
pub struct CellFailure {
    /// The failed cell.
    pub index: CellIndex,
    /// What went wrong.
    pub reason: CellError,
}

impl fmt::Display for CellFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cell {}: {}", self.index, self.reason)
    }
}

/// Counts and paths collected by [`GridSplitter::run`](crate::GridSplitter::run).
///
/// Every visited cell ends up in exactly one of `written`, `empty` or
/// `failed`.
#[derive(Debug, Default)]
pub struct SplitReport {
    /// Where fragments were written.
    pub destination: PathBuf,
    /// Cells per axis.
    pub dims: [usize; 3],
    /// Cells processed.
    pub visited: usize,
    /// Fragment files, in x-y-z cell order.
    pub written: Vec<PathBuf>,
    /// Cells with no geometry.
    pub empty: usize,
    /// Cells skipped after an error.
    pub failed: Vec<CellFailure>,
}

impl SplitReport {
    /// Start an empty report.
    #[must_use]
    pub fn new(destination: PathBuf, dims: [usize; 3]) -> Self {
        Self {
            destination,
            dims,
            ..Default::default()
        }
    }

    /// Lattice size, `nx * ny * nz`.
    #[must_use]
    pub const fn total_chunks(&self) -> usize {
        self.dims[0] * self.dims[1] * self.dims[2]
    }

    /// Fragments written.
    #[must_use]
    pub fn parts(&self) -> usize {
        self.written.len()
    }

    /// No cell failed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

impl fmt::Display for SplitReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Done! Total {} parts saved in '{}'.",
            self.parts(),
            self.destination.display()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_clip::ClipError;

    #[test]
    fn summary_line() {
        let mut report = SplitReport::new(PathBuf::from("output_parts"), [2, 2, 2]);
        report.written.push(PathBuf::from("output_parts/part_x0_y0_z0.stl"));
        assert_eq!(report.total_chunks(), 8);
        assert_eq!(
            report.to_string(),
            "Done! Total 1 parts saved in 'output_parts'."
        );
    }

    #[test]
    fn failures_mark_incomplete() {
        let mut report = SplitReport::default();
        assert!(report.is_complete());
        report.failed.push(CellFailure {
            index: CellIndex::new(1, 0, 1),
            reason: CellError::Cap(ClipError::OpenBoundary { edges: 3 }),
        });
        assert!(!report.is_complete());
        assert!(report.failed[0].to_string().starts_with("cell (1, 0, 1): capping failed"));
    }
}
