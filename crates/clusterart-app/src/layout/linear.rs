//! Hostname hierarchy: hosts in lexical order, raster-scanned at grid width.

use clusterart_core::Resource;

use super::{canonical_order, raster, GridPos, GridSize};

pub(super) fn compute(resources: &[Resource], grid: GridSize) -> Vec<GridPos> {
    let mut positions = vec![GridPos::default(); resources.len()];
    raster(&canonical_order(resources), &mut positions, grid.width, 1, 0);
    positions
}
