//! Layout strategies
//!
//! Each strategy maps the slot collection onto integer grid coordinates.
//! [`LayoutMode::compute`] is pure: it returns one [`GridPos`] per input
//! resource, in input order. [`LayoutMode::apply`] writes the result into
//! the resources' `x`/`y` fields.
//!
//! Strategies never rely on the caller's iteration order: anything that
//! depends on encounter order first imposes the canonical slot order
//! (hostname, GPUs before CPUs, index), so output is deterministic for a
//! fixed multiset of slots and grid size.
//!
//! Submodules:
//! - `linear`: hostname hierarchy raster
//! - `rack`: rack topology and hardware-group islands
//! - `territory`: user territories and job grouping
//! - `idle`: idle compression
//! - `hilbert`: Hilbert curve
//! - `spiral`: busiest-first Ulam spiral
//! - `radial`: hardware-group / host sunburst

mod hilbert;
mod idle;
mod linear;
mod radial;
mod rack;
mod spiral;
mod territory;

pub use rack::{parse_rack_position, FALLBACK_ROW};

use serde::{Deserialize, Serialize};

use clusterart_core::{canonical_cmp, Resource};

/// Target grid dimensions, in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSize {
    pub width: u32,
    pub height: u32,
}

impl GridSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// One computed grid position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// The nine layout strategies, in keyboard order (1-9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LayoutMode {
    #[default]
    Linear,
    Rack,
    HardwareIslands,
    UserTerritories,
    JobGroups,
    IdleCompression,
    Hilbert,
    Spiral,
    Radial,
}

impl LayoutMode {
    pub const ALL: [LayoutMode; 9] = [
        LayoutMode::Linear,
        LayoutMode::Rack,
        LayoutMode::HardwareIslands,
        LayoutMode::UserTerritories,
        LayoutMode::JobGroups,
        LayoutMode::IdleCompression,
        LayoutMode::Hilbert,
        LayoutMode::Spiral,
        LayoutMode::Radial,
    ];

    /// Resolve a 1-based mode index. Anything outside `1..=9` is `None`.
    pub fn from_index(index: u8) -> Option<Self> {
        let i = usize::from(index.checked_sub(1)?);
        Self::ALL.get(i).copied()
    }

    /// 1-based mode index.
    pub fn index(self) -> u8 {
        match self {
            LayoutMode::Linear => 1,
            LayoutMode::Rack => 2,
            LayoutMode::HardwareIslands => 3,
            LayoutMode::UserTerritories => 4,
            LayoutMode::JobGroups => 5,
            LayoutMode::IdleCompression => 6,
            LayoutMode::Hilbert => 7,
            LayoutMode::Spiral => 8,
            LayoutMode::Radial => 9,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            LayoutMode::Linear => "Hostname Hierarchy",
            LayoutMode::Rack => "Rack Topology",
            LayoutMode::HardwareIslands => "Hardware Islands",
            LayoutMode::UserTerritories => "User Territories",
            LayoutMode::JobGroups => "Job Grouping",
            LayoutMode::IdleCompression => "Idle Compression",
            LayoutMode::Hilbert => "Hilbert Curve",
            LayoutMode::Spiral => "Spiral",
            LayoutMode::Radial => "Radial Sunburst",
        }
    }

    /// Compute positions for `resources`, aligned with input order.
    pub fn compute(self, resources: &[Resource], grid: GridSize) -> Vec<GridPos> {
        if resources.is_empty() {
            return Vec::new();
        }
        let grid = GridSize::new(grid.width.max(1), grid.height.max(1));
        match self {
            LayoutMode::Linear => linear::compute(resources, grid),
            LayoutMode::Rack => rack::compute_racks(resources),
            LayoutMode::HardwareIslands => rack::compute_islands(resources),
            LayoutMode::UserTerritories => territory::compute(resources, grid, |r| r.occupant()),
            LayoutMode::JobGroups => territory::compute(resources, grid, |r| r.job_id.as_deref()),
            LayoutMode::IdleCompression => idle::compute(resources, grid),
            LayoutMode::Hilbert => hilbert::compute(resources),
            LayoutMode::Spiral => spiral::compute(resources),
            LayoutMode::Radial => radial::compute(resources, grid),
        }
    }

    /// Compute positions and write them into each resource's `x`/`y`.
    pub fn apply(self, resources: &mut [Resource], grid: GridSize) {
        let positions = self.compute(resources, grid);
        for (resource, pos) in resources.iter_mut().zip(positions) {
            resource.x = pos.x;
            resource.y = pos.y;
        }
    }
}

/// Indices of `resources` in canonical slot order.
pub(crate) fn canonical_order(resources: &[Resource]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..resources.len()).collect();
    order.sort_by(|&a, &b| canonical_cmp(&resources[a], &resources[b]));
    order
}

/// Raster-place `indices` into `positions`, `per_row` items per line starting
/// at line `y0`, leaving `stride - 1` empty columns between items.
///
/// Returns the number of lines used.
pub(crate) fn raster(
    indices: &[usize],
    positions: &mut [GridPos],
    per_row: u32,
    stride: u32,
    y0: i32,
) -> i32 {
    let per_row = per_row.max(1) as usize;
    for (k, &i) in indices.iter().enumerate() {
        let col = (k % per_row) as i32;
        let line = (k / per_row) as i32;
        positions[i] = GridPos::new(col * stride as i32, y0 + line);
    }
    indices.len().div_ceil(per_row) as i32
}
