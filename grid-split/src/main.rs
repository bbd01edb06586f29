//! Command-line front end for grid decomposition.
//!
//! ```text
//! grid-split --input model.stl --output output_parts --size 60 60 60
//! ```
//!
//! Writes one `part_x<i>_y<j>_z<k>.stl` per non-empty cell. Cells that fail
//! are reported and skipped; only a bad input or grid size stops the run.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use mesh_grid::{split_file, SplitParams};
use mesh_io::MeshFormat;
use mesh_types::Vector3;
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Split a mesh into closed parts along a uniform grid.
#[derive(Parser, Debug)]
#[command(name = "grid-split")]
#[command(about = "Split a mesh into printable grid parts", long_about = None)]
#[command(version)]
#[command(allow_negative_numbers = true)]
struct Cli {
    /// Input mesh (STL, OBJ or PLY)
    #[arg(short, long)]
    input: PathBuf,

    /// Directory for the parts
    #[arg(short, long, default_value = "output_parts")]
    output: PathBuf,

    /// Cell size along x, y and z
    #[arg(
        short,
        long,
        num_args = 3,
        value_names = ["GX", "GY", "GZ"],
        default_values_t = [50.0, 50.0, 50.0]
    )]
    size: Vec<f64>,

    /// Write the raw clipped surfaces without capping
    #[arg(long)]
    no_cap: bool,

    /// Also write preview.ply with every part coloured
    #[arg(long)]
    vis: bool,

    /// Part file format: stl, obj or ply
    #[arg(long, default_value = "stl")]
    format: MeshFormat,

    /// Write ASCII instead of binary STL/PLY
    #[arg(long)]
    ascii: bool,

    /// Vertex merge distance for repair and capping
    #[arg(long, value_name = "EPS")]
    weld_epsilon: Option<f64>,

    /// Process cells on all cores
    #[arg(long)]
    parallel: bool,

    /// Debug logging
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Warnings and errors only
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn split_params(&self) -> SplitParams {
        let mut params = SplitParams::default()
            .with_grid_size(Vector3::from_iterator(self.size.iter().copied()))
            .with_cap(!self.no_cap)
            .with_preview(self.vis)
            .with_format(self.format)
            .with_binary(!self.ascii)
            .with_parallel(self.parallel);
        if let Some(eps) = self.weld_epsilon {
            params.repair.weld_epsilon = eps;
            params.capping.weld_epsilon = eps;
        }
        params
    }

    fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "warn"
        } else {
            "info"
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let report = split_file(&cli.input, &cli.output, cli.split_params())
        .with_context(|| format!("failed to split {}", cli.input.display()))?;

    for failure in &report.failed {
        warn!("{failure}");
    }
    println!("{report}");
    if !report.is_complete() {
        println!(
            "{} of {} cells skipped after errors.",
            report.failed.len(),
            report.visited
        );
    }
    Ok(())
}
