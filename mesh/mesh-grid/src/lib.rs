//! Uniform grid decomposition of a closed mesh.
//!
//! A mesh too large for a printer is cut along an axis-aligned lattice into
//! fragments that each fit the build volume. Every fragment is closed again
//! by capping the cut faces, so it can be printed on its own.
//!
//! The pipeline, per run:
//!
//! 1. load and repair the source ([`split_file`] only)
//! 2. [`compute_bounds`] and lay a [`GridPartition`] over them
//! 3. for each cell in x-y-z order: clip, cap, hand the [`Fragment`] to a
//!    [`FragmentSink`] and show it to a [`FragmentObserver`]
//! 4. collect a [`SplitReport`]
//!
//! A failing cell never aborts the run. It is logged and listed in
//! [`SplitReport::failed`].
//!
//! # Example
//!
//! ```no_run
//! use mesh_grid::{split_file, SplitParams};
//! use mesh_types::Vector3;
//!
//! let params = SplitParams::default().with_grid_size(Vector3::new(60.0, 60.0, 60.0));
//! let report = split_file("model.stl", "output_parts", params).unwrap();
//! println!("{report}");
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]

mod bounds;
mod emit;
mod error;
mod grid;
mod observer;
mod params;
mod pipeline;
mod report;

pub use bounds::compute_bounds;
pub use emit::{Fragment, FragmentEmitter, FragmentSink};
pub use error::{CellError, GridError, GridResult};
pub use grid::{axis_cell_count, CellIndex, GridCell, GridCells, GridPartition};
pub use observer::{FragmentObserver, PreviewCollector};
pub use params::SplitParams;
pub use pipeline::{split_file, GridSplitter};
pub use report::{CellFailure, SplitReport};
