//! Color strategies
//!
//! A [`ColorMode`] is the user's selection (1-9); [`ColorStrategy`] is the
//! resolved strategy with whatever it precomputed from the current resource
//! set. Strategies that must keep colors stable across refreshes (occupant,
//! host status) read and extend the session's [`ColorCaches`] instead of
//! holding their own state.
//!
//! Submodules:
//! - `cache`: identity caches
//! - `palette`: fixed palettes, heat map and string hashing
//! - `strategy`: the nine strategies and their legends

pub mod cache;
pub mod palette;
mod strategy;

pub use cache::{ColorCaches, IdentityCache};
pub use strategy::ColorStrategy;

use serde::{Deserialize, Serialize};

use clusterart_core::Color;

/// One legend row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendItem {
    pub label: String,
    pub color: Color,
    pub count: usize,
}

impl LegendItem {
    pub fn new(label: impl Into<String>, color: Color, count: usize) -> Self {
        Self {
            label: label.into(),
            color,
            count,
        }
    }
}

/// The nine color strategies, in keyboard order (1-9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ColorMode {
    #[default]
    Occupant,
    Hostname,
    Row,
    HardwareGroup,
    GpuType,
    Utilization,
    SlotStatus,
    HostStatus,
    FreeMemory,
}

impl ColorMode {
    pub const ALL: [ColorMode; 9] = [
        ColorMode::Occupant,
        ColorMode::Hostname,
        ColorMode::Row,
        ColorMode::HardwareGroup,
        ColorMode::GpuType,
        ColorMode::Utilization,
        ColorMode::SlotStatus,
        ColorMode::HostStatus,
        ColorMode::FreeMemory,
    ];

    /// Resolve a 1-based mode index. Anything outside `1..=9` is `None`.
    pub fn from_index(index: u8) -> Option<Self> {
        let i = usize::from(index.checked_sub(1)?);
        Self::ALL.get(i).copied()
    }

    /// 1-based mode index.
    pub fn index(self) -> u8 {
        match self {
            ColorMode::Occupant => 1,
            ColorMode::Hostname => 2,
            ColorMode::Row => 3,
            ColorMode::HardwareGroup => 4,
            ColorMode::GpuType => 5,
            ColorMode::Utilization => 6,
            ColorMode::SlotStatus => 7,
            ColorMode::HostStatus => 8,
            ColorMode::FreeMemory => 9,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ColorMode::Occupant => "By User",
            ColorMode::Hostname => "By Hostname",
            ColorMode::Row => "By Row",
            ColorMode::HardwareGroup => "By Hardware Group",
            ColorMode::GpuType => "By GPU Type",
            ColorMode::Utilization => "By Utilization",
            ColorMode::SlotStatus => "By Slot Status",
            ColorMode::HostStatus => "By Host Status",
            ColorMode::FreeMemory => "By Free Memory",
        }
    }

    /// Build the strategy for this mode. Call
    /// [`ColorStrategy::initialize`] before asking it for colors.
    pub fn strategy(self) -> ColorStrategy {
        ColorStrategy::for_mode(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_index_bounds() {
        assert_eq!(ColorMode::from_index(1), Some(ColorMode::Occupant));
        assert_eq!(ColorMode::from_index(9), Some(ColorMode::FreeMemory));
        assert_eq!(ColorMode::from_index(0), None);
        assert_eq!(ColorMode::from_index(10), None);
    }

    #[test]
    fn test_strategy_matches_mode() {
        for mode in ColorMode::ALL {
            assert_eq!(ColorMode::from_index(mode.index()), Some(mode));
            assert_eq!(mode.strategy().mode(), mode);
        }
    }
}
