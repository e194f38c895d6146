//! Property-based invariant tests for the layout strategies.
//!
//! 1. Every strategy is deterministic for a fixed multiset of slots
//! 2. Raster strategies never put two slots in one cell and stay inside the
//!    grid width
//! 3. The Hilbert layout is injective inside the curve square
//! 4. The spiral layout is translated to non-negative coordinates touching 0

use std::collections::{HashMap, HashSet};

use clusterart_app::{GridPos, GridSize, LayoutMode};
use clusterart_core::{Resource, SlotKind};
use proptest::prelude::*;

// ── Strategies ──────────────────────────────────────────────────────────

/// One host: (cpus, gpus, occupant per slot, job per slot, utilization)
fn host_strategy() -> impl Strategy<Value = (u32, u32, Vec<Option<u8>>, Vec<Option<u8>>, u8)> {
    (0u32..10, 0u32..5).prop_flat_map(|(cpus, gpus)| {
        let slots = (cpus + gpus) as usize;
        (
            Just(cpus),
            Just(gpus),
            prop::collection::vec(prop::option::of(0u8..6), slots),
            prop::collection::vec(prop::option::of(0u8..4), slots),
            0u8..=100,
        )
    })
}

fn resources_strategy() -> impl Strategy<Value = Vec<Resource>> {
    prop::collection::vec(host_strategy(), 0..12).prop_map(|hosts| {
        let mut resources = Vec::new();
        for (h, (cpus, gpus, occupants, jobs, util)) in hosts.into_iter().enumerate() {
            let hostname = format!("{}{:02}u{:02}", ["a", "b", "c"][h % 3], h / 3, h);
            let group = ["alpha", "beta"][h % 2];
            let kinds = (0..gpus)
                .map(|i| (SlotKind::Gpu, i))
                .chain((0..cpus).map(|i| (SlotKind::Cpu, i)));
            for (slot, (kind, index)) in kinds.enumerate() {
                let mut r = Resource::new(hostname.clone(), kind, index)
                    .with_hardware_group(group)
                    .with_utilization(f64::from(util));
                if let Some(user) = occupants[slot] {
                    r = r.with_occupant(format!("user{}", user));
                    if let Some(job) = jobs[slot] {
                        r = r.with_job(format!("job{}", job), None);
                    }
                }
                resources.push(r);
            }
        }
        resources
    })
}

fn grid_strategy() -> impl Strategy<Value = GridSize> {
    (1u32..40, 1u32..40).prop_map(|(w, h)| GridSize::new(w, h))
}

fn positions_by_slot(resources: &[Resource], positions: &[GridPos]) -> HashMap<String, GridPos> {
    resources
        .iter()
        .zip(positions)
        .map(|(r, p)| (format!("{}/{}/{}", r.hostname, r.kind.as_str(), r.index), *p))
        .collect()
}

const RASTER_MODES: [LayoutMode; 4] = [
    LayoutMode::Linear,
    LayoutMode::UserTerritories,
    LayoutMode::JobGroups,
    LayoutMode::IdleCompression,
];

// ═══════════════════════════════════════════════════════════════════════
// 1. Determinism
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn layouts_ignore_input_order(
        (resources, shuffled) in resources_strategy()
            .prop_flat_map(|r| (Just(r.clone()), Just(r).prop_shuffle())),
        grid in grid_strategy(),
    ) {
        for mode in LayoutMode::ALL {
            let a = positions_by_slot(&resources, &mode.compute(&resources, grid));
            let b = positions_by_slot(&shuffled, &mode.compute(&shuffled, grid));
            prop_assert_eq!(a, b, "{} depends on input order", mode.name());
        }
    }

    #[test]
    fn layouts_return_one_position_per_slot(
        resources in resources_strategy(),
        grid in grid_strategy(),
    ) {
        for mode in LayoutMode::ALL {
            prop_assert_eq!(mode.compute(&resources, grid).len(), resources.len());
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 2. Raster strategies: no overlap, inside grid width
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn raster_layouts_never_overlap(
        resources in resources_strategy(),
        grid in grid_strategy(),
    ) {
        for mode in RASTER_MODES {
            let positions = mode.compute(&resources, grid);
            let distinct: HashSet<GridPos> = positions.iter().copied().collect();
            prop_assert_eq!(distinct.len(), positions.len(), "{} overlaps", mode.name());
            for p in &positions {
                prop_assert!(p.x >= 0 && p.y >= 0);
                prop_assert!((p.x as u32) < grid.width, "{} exceeds width", mode.name());
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 3. Hilbert bijection
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn hilbert_is_injective_within_square(resources in resources_strategy()) {
        let positions = LayoutMode::Hilbert.compute(&resources, GridSize::new(1, 1));
        let mut side = 1i32;
        while ((side * side) as usize) < resources.len() {
            side *= 2;
        }
        let distinct: HashSet<GridPos> = positions.iter().copied().collect();
        prop_assert_eq!(distinct.len(), positions.len());
        for p in &positions {
            prop_assert!(p.x >= 0 && p.x < side && p.y >= 0 && p.y < side);
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 4. Spiral non-negativity
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn spiral_is_translated_to_origin(resources in resources_strategy()) {
        prop_assume!(!resources.is_empty());
        let positions = LayoutMode::Spiral.compute(&resources, GridSize::new(10, 10));
        prop_assert!(positions.iter().all(|p| p.x >= 0 && p.y >= 0));
        prop_assert_eq!(positions.iter().map(|p| p.x).min(), Some(0));
        prop_assert_eq!(positions.iter().map(|p| p.y).min(), Some(0));
        let distinct: HashSet<GridPos> = positions.iter().copied().collect();
        prop_assert_eq!(distinct.len(), positions.len());
    }
}
