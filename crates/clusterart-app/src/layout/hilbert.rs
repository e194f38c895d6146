//! Hilbert curve: slots in canonical order walk a Hilbert curve, so slots
//! that are adjacent in hostname order stay spatially close.

use clusterart_core::Resource;

use super::{canonical_order, GridPos};

pub(super) fn compute(resources: &[Resource]) -> Vec<GridPos> {
    let side = curve_side(resources.len() as u64);
    let mut positions = vec![GridPos::default(); resources.len()];
    for (rank, i) in canonical_order(resources).into_iter().enumerate() {
        let (x, y) = d2xy(side, rank as u64);
        positions[i] = GridPos::new(x as i32, y as i32);
    }
    positions
}

/// Smallest power of two whose square covers `count`.
pub(crate) fn curve_side(count: u64) -> u64 {
    let mut side = 1;
    while side * side < count {
        side *= 2;
    }
    side
}

/// Map distance `d` along a Hilbert curve of side `n` to `(x, y)`.
pub(crate) fn d2xy(n: u64, d: u64) -> (u64, u64) {
    let (mut x, mut y) = (0, 0);
    let mut t = d;
    let mut s = 1;
    while s < n {
        let rx = 1 & (t / 2);
        let ry = 1 & (t ^ rx);
        if ry == 0 {
            if rx == 1 {
                x = s - 1 - x;
                y = s - 1 - y;
            }
            std::mem::swap(&mut x, &mut y);
        }
        x += s * rx;
        y += s * ry;
        t /= 4;
        s *= 2;
    }
    (x, y)
}
