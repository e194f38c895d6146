//! Spiral: busiest slots at the center, walking an Ulam square spiral
//! outward. Idle slots count as 0% and occupied slots with no reported
//! figure as 100%, so unknown-but-busy lands near the middle.

use std::cmp::Ordering;

use clusterart_core::{canonical_cmp, Resource};

use super::GridPos;

/// Right, down, left, up (screen coordinates, y grows downward).
const DIRECTIONS: [(i32, i32); 4] = [(1, 0), (0, 1), (-1, 0), (0, -1)];

pub(super) fn compute(resources: &[Resource]) -> Vec<GridPos> {
    let mut order: Vec<usize> = (0..resources.len()).collect();
    order.sort_by(|&a, &b| {
        let (ra, rb) = (&resources[a], &resources[b]);
        rb.heat()
            .partial_cmp(&ra.heat())
            .unwrap_or(Ordering::Equal)
            .then_with(|| canonical_cmp(ra, rb))
    });

    let walk = ulam_walk(resources.len());
    let min_x = walk.iter().map(|p| p.x).min().unwrap_or(0);
    let min_y = walk.iter().map(|p| p.y).min().unwrap_or(0);

    let mut positions = vec![GridPos::default(); resources.len()];
    for (i, p) in order.into_iter().zip(walk) {
        positions[i] = GridPos::new(p.x - min_x, p.y - min_y);
    }
    positions
}

/// First `count` cells of a square spiral starting at the origin. The
/// direction turns after every segment; segments lengthen every two turns.
pub(crate) fn ulam_walk(count: usize) -> Vec<GridPos> {
    let mut cells = Vec::with_capacity(count);
    let (mut x, mut y) = (0, 0);
    let mut dir = 0;
    let mut segment_len = 1;
    let mut walked = 0;
    let mut turns = 0;

    while cells.len() < count {
        cells.push(GridPos::new(x, y));
        let (dx, dy) = DIRECTIONS[dir];
        x += dx;
        y += dy;
        walked += 1;
        if walked == segment_len {
            walked = 0;
            dir = (dir + 1) % DIRECTIONS.len();
            turns += 1;
            if turns % 2 == 0 {
                segment_len += 1;
            }
        }
    }
    cells
}
