//! Property-based tests for the lattice.
//!
//! Run with: cargo test -p mesh-grid --test proptest_grid

#![allow(clippy::unwrap_used, clippy::cast_precision_loss)]

use mesh_grid::{axis_cell_count, GridPartition};
use mesh_types::{Aabb, Point3, Vector3};
use proptest::prelude::*;

fn arb_box() -> impl Strategy<Value = Aabb> {
    (
        prop::array::uniform3(-500.0..500.0f64),
        prop::array::uniform3(0.1..300.0f64),
    )
        .prop_map(|(lo, ext)| {
            let min = Point3::from(lo);
            Aabb::new(min, min + Vector3::from(ext))
        })
}

fn arb_step() -> impl Strategy<Value = Vector3<f64>> {
    prop::array::uniform3(0.5..120.0f64).prop_map(Vector3::from)
}

proptest! {
    #[test]
    fn cells_tile_the_box(bounds in arb_box(), step in arb_step()) {
        let grid = GridPartition::new(bounds, step).unwrap();
        let mut volume = 0.0;
        let mut union = Aabb::empty();
        for cell in grid.cells() {
            prop_assert!(cell.bounds.min.x < cell.bounds.max.x);
            prop_assert!(cell.bounds.min.y < cell.bounds.max.y);
            prop_assert!(cell.bounds.min.z < cell.bounds.max.z);
            volume += cell.bounds.volume();
            union = union.union(&cell.bounds);
        }
        prop_assert_eq!(union, bounds);
        prop_assert!((volume - bounds.volume()).abs() <= 1e-9 * bounds.volume());
    }

    #[test]
    fn neighbours_share_their_boundary(bounds in arb_box(), step in arb_step()) {
        let grid = GridPartition::new(bounds, step).unwrap();
        for cell in grid.cells() {
            let mut next = cell.index;
            next.i += 1;
            if let Some(right) = grid.cell(next) {
                prop_assert_eq!(cell.bounds.max.x, right.bounds.min.x);
                prop_assert_eq!(cell.bounds.min.y, right.bounds.min.y);
            }
        }
    }

    #[test]
    fn last_cell_is_clamped_to_the_max(bounds in arb_box(), step in arb_step()) {
        let grid = GridPartition::new(bounds, step).unwrap();
        let last = grid.cells().last().unwrap();
        prop_assert_eq!(last.bounds.max, bounds.max);
        let size = last.bounds.size();
        prop_assert!(size.x <= step.x && size.y <= step.y && size.z <= step.z);
    }

    #[test]
    fn count_is_ceil_of_span_over_step(min in -100.0..100.0f64, span in 0.1..400.0f64, step in 0.5..120.0f64) {
        let n = axis_cell_count(min, min + span, step);
        let ceil = (span / step).ceil() as usize;
        prop_assert!(n == ceil || n + 1 == ceil);
        prop_assert!(min + (n - 1) as f64 * step < min + span);
    }

    #[test]
    fn iteration_is_restartable(bounds in arb_box(), step in arb_step()) {
        let grid = GridPartition::new(bounds, step).unwrap();
        let a: Vec<_> = grid.cells().map(|c| c.index).collect();
        let b: Vec<_> = grid.cells().map(|c| c.index).collect();
        prop_assert_eq!(a.len(), grid.cell_count());
        prop_assert_eq!(a, b);
    }
}
