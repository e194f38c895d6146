//! The nine color strategies.

use std::collections::{BTreeMap, HashMap};

use clusterart_core::{canonical_cmp, Color, Resource, SlotKind};

use super::cache::ColorCaches;
use super::palette::{self, DEFAULT_GRAY, IDLE, NO_GPU, OCCUPIED_GREEN, UNKNOWN_GPU};
use super::{ColorMode, LegendItem};

/// Utilization legend buckets, in percent.
const UTILIZATION_BUCKETS: [(f64, f64); 5] = [
    (0.0, 20.0),
    (20.0, 40.0),
    (40.0, 60.0),
    (60.0, 80.0),
    (80.0, 100.0),
];

const MEMORY_BUCKETS: usize = 5;

/// A color strategy together with what it precomputed from the resources.
#[derive(Debug, Clone, PartialEq)]
pub enum ColorStrategy {
    Occupant,
    Hostname,
    Row { rows: BTreeMap<String, Color> },
    HardwareGroup { groups: HashMap<&'static str, Color> },
    GpuType { types: BTreeMap<String, Color> },
    Utilization { min: f64, max: f64 },
    SlotStatus,
    HostStatus,
    FreeMemory { min: f64, max: f64 },
}

impl ColorStrategy {
    pub fn for_mode(mode: ColorMode) -> Self {
        match mode {
            ColorMode::Occupant => ColorStrategy::Occupant,
            ColorMode::Hostname => ColorStrategy::Hostname,
            ColorMode::Row => ColorStrategy::Row {
                rows: BTreeMap::new(),
            },
            ColorMode::HardwareGroup => ColorStrategy::HardwareGroup {
                groups: evenly_spaced(palette::KNOWN_HARDWARE_GROUPS.iter().copied())
                    .into_iter()
                    .collect(),
            },
            ColorMode::GpuType => ColorStrategy::GpuType {
                types: BTreeMap::new(),
            },
            ColorMode::Utilization => ColorStrategy::Utilization { min: 0.0, max: 0.0 },
            ColorMode::SlotStatus => ColorStrategy::SlotStatus,
            ColorMode::HostStatus => ColorStrategy::HostStatus,
            ColorMode::FreeMemory => ColorStrategy::FreeMemory { min: 0.0, max: 0.0 },
        }
    }

    pub fn mode(&self) -> ColorMode {
        match self {
            ColorStrategy::Occupant => ColorMode::Occupant,
            ColorStrategy::Hostname => ColorMode::Hostname,
            ColorStrategy::Row { .. } => ColorMode::Row,
            ColorStrategy::HardwareGroup { .. } => ColorMode::HardwareGroup,
            ColorStrategy::GpuType { .. } => ColorMode::GpuType,
            ColorStrategy::Utilization { .. } => ColorMode::Utilization,
            ColorStrategy::SlotStatus => ColorMode::SlotStatus,
            ColorStrategy::HostStatus => ColorMode::HostStatus,
            ColorStrategy::FreeMemory { .. } => ColorMode::FreeMemory,
        }
    }

    /// Precompute assignments for the current resource set.
    ///
    /// Occupant and host-status assignments go into `caches` and are never
    /// revoked; everything else is recomputed from scratch.
    pub fn initialize(&mut self, resources: &[Resource], caches: &mut ColorCaches) {
        match self {
            ColorStrategy::Occupant => {
                for r in sorted(resources) {
                    if let Some(occupant) = r.occupant() {
                        caches.occupants.assign(occupant, &palette::OCCUPANT);
                    }
                }
            }
            ColorStrategy::Row { rows } => {
                let names: BTreeMap<&str, ()> = resources.iter().map(|r| (r.row(), ())).collect();
                *rows = names
                    .into_keys()
                    .enumerate()
                    .map(|(i, row)| (row.to_string(), palette::ROW[i % palette::ROW.len()]))
                    .collect();
            }
            ColorStrategy::GpuType { types } => {
                let names: BTreeMap<&str, ()> = resources
                    .iter()
                    .filter(|r| r.kind == SlotKind::Gpu)
                    .filter_map(|r| r.gpu_type.as_deref())
                    .map(|t| (t, ()))
                    .collect();
                *types = evenly_spaced(names.into_keys())
                    .into_iter()
                    .map(|(name, color)| (name.to_string(), color))
                    .collect();
            }
            ColorStrategy::Utilization { min, max } => {
                (*min, *max) = bounds(resources.iter().map(Resource::utilization));
            }
            ColorStrategy::HostStatus => {
                for r in sorted(resources) {
                    if fixed_status_color(&r.host_status).is_none() {
                        caches
                            .statuses
                            .assign(&r.host_status, &palette::STATUS_SECONDARY);
                    }
                }
            }
            ColorStrategy::FreeMemory { min, max } => {
                (*min, *max) = bounds(resources.iter().map(Resource::memory_mb));
            }
            ColorStrategy::Hostname
            | ColorStrategy::HardwareGroup { .. }
            | ColorStrategy::SlotStatus => {}
        }
    }

    pub fn color(&self, resource: &Resource, caches: &ColorCaches) -> Color {
        match self {
            ColorStrategy::Occupant => match resource.occupant() {
                Some(occupant) => caches.occupants.get(occupant).unwrap_or(DEFAULT_GRAY),
                None => IDLE,
            },
            ColorStrategy::Hostname => palette::hashed(&resource.hostname),
            ColorStrategy::Row { rows } => rows.get(resource.row()).copied().unwrap_or(DEFAULT_GRAY),
            ColorStrategy::HardwareGroup { groups } => groups
                .get(resource.hardware_group.as_str())
                .copied()
                .unwrap_or(DEFAULT_GRAY),
            ColorStrategy::GpuType { types } => match resource.kind {
                SlotKind::Cpu => NO_GPU,
                SlotKind::Gpu => resource
                    .gpu_type
                    .as_deref()
                    .and_then(|t| types.get(t))
                    .copied()
                    .unwrap_or(UNKNOWN_GPU),
            },
            ColorStrategy::Utilization { min, max } => {
                palette::heat(normalize(resource.utilization(), *min, *max))
            }
            ColorStrategy::SlotStatus => {
                if resource.is_idle() {
                    IDLE
                } else {
                    OCCUPIED_GREEN
                }
            }
            ColorStrategy::HostStatus => status_color(&resource.host_status, caches),
            ColorStrategy::FreeMemory { max, .. } => memory_color(resource.memory_mb(), *max),
        }
    }

    /// Legend rows for the current resources.
    pub fn legend(&self, resources: &[Resource], caches: &ColorCaches) -> Vec<LegendItem> {
        match self {
            ColorStrategy::Occupant => {
                let mut items: Vec<LegendItem> = by_count(resources.iter().filter_map(Resource::occupant))
                    .into_iter()
                    .map(|(user, count)| {
                        let color = caches.occupants.get(user).unwrap_or(DEFAULT_GRAY);
                        LegendItem::new(user, color, count)
                    })
                    .collect();
                let idle = resources.iter().filter(|r| r.is_idle()).count();
                if idle > 0 {
                    items.push(LegendItem::new("Idle", IDLE, idle));
                }
                items
            }
            ColorStrategy::Hostname => tally(resources.iter().map(|r| r.hostname.as_str()))
                .into_iter()
                .map(|(host, count)| LegendItem::new(host, palette::hashed(host), count))
                .collect(),
            ColorStrategy::Row { rows } => tally(resources.iter().map(Resource::row))
                .into_iter()
                .map(|(row, count)| {
                    LegendItem::new(row, rows.get(row).copied().unwrap_or(DEFAULT_GRAY), count)
                })
                .collect(),
            ColorStrategy::HardwareGroup { groups } => {
                by_count(resources.iter().map(|r| r.hardware_group.as_str()))
                    .into_iter()
                    .map(|(group, count)| {
                        let color = groups.get(group).copied().unwrap_or(DEFAULT_GRAY);
                        LegendItem::new(group, color, count)
                    })
                    .collect()
            }
            ColorStrategy::GpuType { types } => {
                let gpu_types = resources
                    .iter()
                    .filter(|r| r.kind == SlotKind::Gpu)
                    .filter_map(|r| r.gpu_type.as_deref());
                let mut items: Vec<LegendItem> = tally(gpu_types)
                    .into_iter()
                    .map(|(t, count)| {
                        LegendItem::new(t, types.get(t).copied().unwrap_or(UNKNOWN_GPU), count)
                    })
                    .collect();
                let untyped = resources
                    .iter()
                    .filter(|r| r.kind == SlotKind::Gpu && r.gpu_type.is_none())
                    .count();
                if untyped > 0 {
                    items.push(LegendItem::new("Unknown", UNKNOWN_GPU, untyped));
                }
                let cpus = resources.iter().filter(|r| r.kind == SlotKind::Cpu).count();
                if cpus > 0 {
                    items.push(LegendItem::new("No GPU", NO_GPU, cpus));
                }
                items
            }
            ColorStrategy::Utilization { min, max } => {
                let mut counts = [0usize; UTILIZATION_BUCKETS.len()];
                for r in resources {
                    let bucket = (r.utilization().clamp(0.0, 100.0) / 20.0) as usize;
                    counts[bucket.min(counts.len() - 1)] += 1;
                }
                UTILIZATION_BUCKETS
                    .iter()
                    .zip(counts)
                    .map(|(&(lo, hi), count)| {
                        let mid = (lo + hi) / 2.0;
                        LegendItem::new(
                            format!("{:.0}-{:.0}%", lo, hi),
                            palette::heat(normalize(mid, *min, *max)),
                            count,
                        )
                    })
                    .collect()
            }
            ColorStrategy::SlotStatus => {
                let idle = resources.iter().filter(|r| r.is_idle()).count();
                vec![
                    LegendItem::new("Occupied", OCCUPIED_GREEN, resources.len() - idle),
                    LegendItem::new("Idle", IDLE, idle),
                ]
            }
            ColorStrategy::HostStatus => by_count(resources.iter().map(|r| r.host_status.as_str()))
                .into_iter()
                .map(|(status, count)| LegendItem::new(status, status_color(status, caches), count))
                .collect(),
            ColorStrategy::FreeMemory { min, max } => {
                let width = (max - min) / MEMORY_BUCKETS as f64;
                let mut counts = [0usize; MEMORY_BUCKETS];
                for r in resources {
                    let bucket = if width > 0.0 {
                        ((r.memory_mb() - min) / width) as usize
                    } else {
                        0
                    };
                    counts[bucket.min(MEMORY_BUCKETS - 1)] += 1;
                }
                counts
                    .into_iter()
                    .enumerate()
                    .map(|(i, count)| {
                        let lo = min + width * i as f64;
                        let hi = lo + width;
                        LegendItem::new(
                            format!("{:.1}-{:.1} GB", lo / 1024.0, hi / 1024.0),
                            memory_color((lo + hi) / 2.0, *max),
                            count,
                        )
                    })
                    .collect()
            }
        }
    }
}

fn sorted(resources: &[Resource]) -> Vec<&Resource> {
    let mut v: Vec<&Resource> = resources.iter().collect();
    v.sort_by(|a, b| canonical_cmp(a, b));
    v
}

/// `names` mapped to hues spread evenly around the color wheel.
fn evenly_spaced<'a>(names: impl Iterator<Item = &'a str>) -> Vec<(&'a str, Color)> {
    let names: Vec<&str> = names.collect();
    let n = names.len().max(1) as f64;
    names
        .into_iter()
        .enumerate()
        .map(|(i, name)| (name, Color::from_hsl(i as f64 * 360.0 / n, 0.7, 0.5)))
        .collect()
}

fn bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold(None, |acc: Option<(f64, f64)>, v| match acc {
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        None => Some((v, v)),
    })
    .unwrap_or((0.0, 0.0))
}

fn normalize(value: f64, min: f64, max: f64) -> f64 {
    if max > min {
        (value - min) / (max - min)
    } else {
        0.0
    }
}

/// Low free memory is hot (red), plenty is cool (blue).
fn memory_color(memory_mb: f64, max: f64) -> Color {
    if max <= 0.0 {
        return DEFAULT_GRAY;
    }
    palette::heat(1.0 - memory_mb / max)
}

fn fixed_status_color(status: &str) -> Option<Color> {
    palette::HOST_STATUS
        .iter()
        .find(|(name, _)| *name == status)
        .map(|(_, color)| *color)
}

fn status_color(status: &str, caches: &ColorCaches) -> Color {
    fixed_status_color(status)
        .or_else(|| caches.statuses.get(status))
        .unwrap_or(DEFAULT_GRAY)
}

/// Distinct keys with counts, in key order.
fn tally<'a>(keys: impl Iterator<Item = &'a str>) -> Vec<(&'a str, usize)> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for key in keys {
        *counts.entry(key).or_default() += 1;
    }
    counts.into_iter().collect()
}

/// Distinct keys with counts, largest first, ties in key order.
fn by_count<'a>(keys: impl Iterator<Item = &'a str>) -> Vec<(&'a str, usize)> {
    let mut counts = tally(keys);
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_slot(host: &str, index: u32, user: &str) -> Resource {
        Resource::new(host, SlotKind::Cpu, index).with_occupant(user)
    }

    fn color_of(mode: ColorMode, resources: &[Resource], caches: &mut ColorCaches) -> Vec<Color> {
        let mut strategy = mode.strategy();
        strategy.initialize(resources, caches);
        resources.iter().map(|r| strategy.color(r, caches)).collect()
    }

    #[test]
    fn test_occupant_color_stable_across_refresh() {
        let mut caches = ColorCaches::new();
        let first = vec![user_slot("h1", 0, "A"), user_slot("h1", 1, "B")];
        let c1 = color_of(ColorMode::Occupant, &first, &mut caches);

        let second = vec![user_slot("h1", 0, "B"), user_slot("h1", 1, "C")];
        let c2 = color_of(ColorMode::Occupant, &second, &mut caches);

        assert_eq!(c1[1], c2[0], "B keeps its color");
        assert_ne!(c2[1], c1[0], "A's palette slot is not reused for C");
        assert_eq!(c2[1], palette::OCCUPANT[2]);
    }

    #[test]
    fn test_occupant_idle_is_dark_gray() {
        let mut caches = ColorCaches::new();
        let resources = vec![Resource::new("h", SlotKind::Cpu, 0)];
        assert_eq!(color_of(ColorMode::Occupant, &resources, &mut caches), vec![IDLE]);
    }

    #[test]
    fn test_occupant_legend_by_count_idle_last() {
        let mut caches = ColorCaches::new();
        let resources = vec![
            Resource::new("h", SlotKind::Cpu, 0),
            user_slot("h", 1, "bob"),
            user_slot("h", 2, "amy"),
            user_slot("h", 3, "bob"),
        ];
        let mut s = ColorMode::Occupant.strategy();
        s.initialize(&resources, &mut caches);
        let labels: Vec<_> = s
            .legend(&resources, &caches)
            .into_iter()
            .map(|i| (i.label, i.count))
            .collect();
        assert_eq!(
            labels,
            vec![
                ("bob".to_string(), 2),
                ("amy".to_string(), 1),
                ("Idle".to_string(), 1)
            ]
        );
    }

    #[test]
    fn test_row_colors_round_robin() {
        let mut caches = ColorCaches::new();
        let resources: Vec<Resource> = (0..22)
            .map(|i| Resource::new(format!("r{:02}u01", i), SlotKind::Cpu, 0))
            .collect();
        let colors = color_of(ColorMode::Row, &resources, &mut caches);
        assert_eq!(colors[0], palette::ROW[0]);
        assert_eq!(colors[20], palette::ROW[0]);
        assert_eq!(colors[21], palette::ROW[1]);
    }

    #[test]
    fn test_hardware_group_unknown_is_gray() {
        let mut caches = ColorCaches::new();
        let resources = vec![
            Resource::new("h", SlotKind::Gpu, 0).with_hardware_group("8GPU H200"),
            Resource::new("h", SlotKind::Gpu, 1).with_hardware_group("Mystery Box"),
        ];
        let colors = color_of(ColorMode::HardwareGroup, &resources, &mut caches);
        assert_ne!(colors[0], DEFAULT_GRAY);
        assert_eq!(colors[1], DEFAULT_GRAY);
    }

    #[test]
    fn test_gpu_type_cpu_and_unknown() {
        let mut caches = ColorCaches::new();
        let resources = vec![
            Resource::new("h", SlotKind::Gpu, 0).with_gpu_type("H100"),
            Resource::new("h", SlotKind::Gpu, 1),
            Resource::new("h", SlotKind::Cpu, 0),
        ];
        let mut s = ColorMode::GpuType.strategy();
        s.initialize(&resources, &mut caches);
        assert_eq!(s.color(&resources[1], &caches), UNKNOWN_GPU);
        assert_eq!(s.color(&resources[2], &caches), NO_GPU);
        let labels: Vec<_> = s.legend(&resources, &caches).into_iter().map(|i| i.label).collect();
        assert_eq!(labels, vec!["H100", "Unknown", "No GPU"]);
    }

    #[test]
    fn test_utilization_scaled_to_observed_range() {
        let mut caches = ColorCaches::new();
        let resources = vec![
            user_slot("h", 0, "u").with_utilization(10.0),
            user_slot("h", 1, "u").with_utilization(50.0),
        ];
        let colors = color_of(ColorMode::Utilization, &resources, &mut caches);
        assert_eq!(colors[0], palette::heat(0.0));
        assert_eq!(colors[1], palette::heat(1.0));
    }

    #[test]
    fn test_utilization_legend_fixed_buckets() {
        let mut caches = ColorCaches::new();
        let resources = vec![
            user_slot("h", 0, "u").with_utilization(5.0),
            user_slot("h", 1, "u").with_utilization(100.0),
            user_slot("h", 2, "u").with_utilization(85.0),
        ];
        let mut s = ColorMode::Utilization.strategy();
        s.initialize(&resources, &mut caches);
        let legend = s.legend(&resources, &caches);
        assert_eq!(legend.len(), 5);
        assert_eq!(legend[0].label, "0-20%");
        assert_eq!(legend[0].count, 1);
        assert_eq!(legend[4].count, 2);
    }

    #[test]
    fn test_slot_status_binary() {
        let mut caches = ColorCaches::new();
        let resources = vec![user_slot("h", 0, "u"), Resource::new("h", SlotKind::Cpu, 1)];
        assert_eq!(
            color_of(ColorMode::SlotStatus, &resources, &mut caches),
            vec![OCCUPIED_GREEN, IDLE]
        );
    }

    #[test]
    fn test_host_status_secondary_cached() {
        let mut caches = ColorCaches::new();
        let first = vec![
            Resource::new("a", SlotKind::Cpu, 0).with_host_status("ok"),
            Resource::new("b", SlotKind::Cpu, 0).with_host_status("draining"),
        ];
        let c1 = color_of(ColorMode::HostStatus, &first, &mut caches);
        assert_eq!(c1[0], palette::HOST_STATUS[0].1);
        assert_eq!(c1[1], palette::STATUS_SECONDARY[0]);

        let second = vec![
            Resource::new("c", SlotKind::Cpu, 0).with_host_status("maint"),
            Resource::new("d", SlotKind::Cpu, 0).with_host_status("draining"),
        ];
        let c2 = color_of(ColorMode::HostStatus, &second, &mut caches);
        assert_eq!(c2[0], palette::STATUS_SECONDARY[1]);
        assert_eq!(c2[1], c1[1]);
    }

    #[test]
    fn test_free_memory_inverted() {
        let mut caches = ColorCaches::new();
        let mut low = Resource::new("a", SlotKind::Cpu, 0);
        low.load.memory_mb = Some(0.0);
        let mut high = Resource::new("b", SlotKind::Cpu, 0);
        high.load.memory_mb = Some(4096.0);
        let resources = vec![low, high];
        let mut s = ColorMode::FreeMemory.strategy();
        s.initialize(&resources, &mut caches);
        assert_eq!(s.color(&resources[0], &caches), palette::heat(1.0));
        assert_eq!(s.color(&resources[1], &caches), palette::heat(0.0));

        let legend = s.legend(&resources, &caches);
        assert_eq!(legend.len(), 5);
        assert_eq!(legend[0].label, "0.0-0.8 GB");
        assert_eq!(legend[0].count, 1);
        assert_eq!(legend[4].count, 1);
    }

    #[test]
    fn test_free_memory_unreported_is_gray() {
        let mut caches = ColorCaches::new();
        let resources = vec![Resource::new("a", SlotKind::Cpu, 0)];
        assert_eq!(
            color_of(ColorMode::FreeMemory, &resources, &mut caches),
            vec![DEFAULT_GRAY]
        );
    }
}
