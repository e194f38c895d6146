//! Idle compression: active slots packed densely on top, idle slots spread
//! out below with every other column left empty.

use clusterart_core::Resource;

use super::{canonical_order, raster, GridPos, GridSize};

/// Horizontal step between idle slots.
const IDLE_STRIDE: u32 = 2;

pub(super) fn compute(resources: &[Resource], grid: GridSize) -> Vec<GridPos> {
    let (active, idle): (Vec<usize>, Vec<usize>) = canonical_order(resources)
        .into_iter()
        .partition(|&i| !resources[i].is_idle());

    let mut positions = vec![GridPos::default(); resources.len()];
    let active_lines = raster(&active, &mut positions, grid.width, 1, 0);

    // One blank line separates the two regions.
    let idle_y0 = if active_lines > 0 { active_lines + 1 } else { 0 };
    let idle_per_row = grid.width.div_ceil(IDLE_STRIDE);
    raster(&idle, &mut positions, idle_per_row, IDLE_STRIDE, idle_y0);
    positions
}
