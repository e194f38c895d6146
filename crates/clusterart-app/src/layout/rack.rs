//! Rack topology and hardware-group islands.
//!
//! Both arrange groups of hosts as "racks": one host per line, GPUs on the
//! left and CPUs immediately after, every host the same column width. Racks
//! are laid out in a grid whose column count approximates a square overall
//! shape; each line of racks is as tall as its tallest rack.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use clusterart_core::{Resource, SlotKind};

use super::{canonical_order, GridPos};

/// `<row>u<unit>`, e.g. `h04u08` is row `h04`, unit 8.
static RACK_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^([a-z]+\d+)u(\d+)$").expect("Invalid rack regex"));

/// Row for hostnames that do not follow the rack naming scheme.
pub const FALLBACK_ROW: &str = "other";

/// Blank cells between neighbouring racks, horizontally and vertically.
const RACK_GAP: i32 = 1;

/// Parse a hostname into its rack row and unit.
///
/// Hostnames that do not match fall into [`FALLBACK_ROW`] at unit 0.
pub fn parse_rack_position(hostname: &str) -> (String, u32) {
    RACK_PATTERN
        .captures(hostname)
        .and_then(|caps| {
            let unit = caps[2].parse().ok()?;
            Some((caps[1].to_string(), unit))
        })
        .unwrap_or_else(|| (FALLBACK_ROW.to_string(), 0))
}

/// Outer grouping key. The fallback group sorts after every named one.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum GroupKey {
    Named(String),
    Fallback,
}

#[derive(Debug, Default)]
struct HostSlots {
    gpus: Vec<usize>,
    cpus: Vec<usize>,
}

pub(super) fn compute_racks(resources: &[Resource]) -> Vec<GridPos> {
    compute_grouped(resources, |r| {
        let (row, unit) = parse_rack_position(&r.hostname);
        let key = if row == FALLBACK_ROW {
            GroupKey::Fallback
        } else {
            GroupKey::Named(row)
        };
        (key, unit)
    })
}

pub(super) fn compute_islands(resources: &[Resource]) -> Vec<GridPos> {
    compute_grouped(resources, |r| (GroupKey::Named(r.hardware_group.clone()), 0))
}

/// Shared rack arrangement. `key_of` yields the group and the in-group sort
/// unit for a slot; hosts with equal units are ordered by hostname.
fn compute_grouped(
    resources: &[Resource],
    key_of: impl Fn(&Resource) -> (GroupKey, u32),
) -> Vec<GridPos> {
    let mut groups: BTreeMap<GroupKey, BTreeMap<(u32, &str), HostSlots>> = BTreeMap::new();
    for i in canonical_order(resources) {
        let r = &resources[i];
        let (key, unit) = key_of(r);
        let host = groups
            .entry(key)
            .or_default()
            .entry((unit, r.hostname.as_str()))
            .or_default();
        match r.kind {
            SlotKind::Gpu => host.gpus.push(i),
            SlotKind::Cpu => host.cpus.push(i),
        }
    }

    let racks: Vec<Vec<HostSlots>> = groups
        .into_values()
        .map(|hosts| hosts.into_values().collect())
        .collect();

    let max_gpus = racks.iter().flatten().map(|h| h.gpus.len()).max().unwrap_or(0);
    let max_cpus = racks.iter().flatten().map(|h| h.cpus.len()).max().unwrap_or(0);
    let host_width = (max_gpus + max_cpus).max(1) as i32;

    let total_hosts: usize = racks.iter().map(Vec::len).sum();
    let avg_height = total_hosts as f64 / racks.len() as f64;
    let racks_per_row = ((racks.len() as f64 * avg_height / host_width as f64)
        .sqrt()
        .ceil() as usize)
        .clamp(1, racks.len());

    let mut positions = vec![GridPos::default(); resources.len()];
    let mut y0 = 0;
    for line in racks.chunks(racks_per_row) {
        for (col, rack) in line.iter().enumerate() {
            let x0 = col as i32 * (host_width + RACK_GAP);
            for (h, host) in rack.iter().enumerate() {
                let y = y0 + h as i32;
                for (j, &i) in host.gpus.iter().enumerate() {
                    positions[i] = GridPos::new(x0 + j as i32, y);
                }
                let cpu_x0 = x0 + host.gpus.len() as i32;
                for (j, &i) in host.cpus.iter().enumerate() {
                    positions[i] = GridPos::new(cpu_x0 + j as i32, y);
                }
            }
        }
        let line_height = line.iter().map(Vec::len).max().unwrap_or(0) as i32;
        y0 += line_height + RACK_GAP;
    }
    positions
}
