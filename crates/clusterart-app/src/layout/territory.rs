//! Territory packing shared by user territories and job grouping.
//!
//! Slots are grouped by a key (occupant or job id); slots without a key form
//! the idle pool. Groups are packed as roughly square blocks, largest first,
//! left to right, wrapping to a new band once the next block would overflow
//! the grid width. Idle slots are rastered below everything else.

use std::collections::HashMap;

use clusterart_core::Resource;

use super::{canonical_order, raster, GridPos, GridSize};

/// Blocks are drawn wider than tall by this factor.
const BLOCK_ASPECT: f64 = 1.5;

pub(super) fn compute<'a>(
    resources: &'a [Resource],
    grid: GridSize,
    key_of: impl Fn(&'a Resource) -> Option<&'a str>,
) -> Vec<GridPos> {
    let mut groups: Vec<Vec<usize>> = Vec::new();
    let mut group_of: HashMap<&str, usize> = HashMap::new();
    let mut idle = Vec::new();

    for i in canonical_order(resources) {
        match key_of(&resources[i]) {
            Some(key) => {
                let g = *group_of.entry(key).or_insert_with(|| {
                    groups.push(Vec::new());
                    groups.len() - 1
                });
                groups[g].push(i);
            }
            None => idle.push(i),
        }
    }

    // Stable: equal counts keep encounter order.
    groups.sort_by(|a, b| b.len().cmp(&a.len()));

    let grid_width = grid.width as i32;
    let mut positions = vec![GridPos::default(); resources.len()];
    let (mut x, mut y, mut band_bottom) = (0i32, 0i32, 0i32);

    for members in &groups {
        let n = members.len();
        let width = ((n as f64 * BLOCK_ASPECT).sqrt().ceil() as i32).clamp(1, grid_width);
        let height = n.div_ceil(width as usize) as i32;

        if x > 0 && x + width > grid_width {
            x = 0;
            y = band_bottom;
        }
        for (k, &i) in members.iter().enumerate() {
            let k = k as i32;
            positions[i] = GridPos::new(x + k % width, y + k / width);
        }
        band_bottom = band_bottom.max(y + height);
        x += width;
    }

    raster(&idle, &mut positions, grid.width, 1, band_bottom);
    positions
}
