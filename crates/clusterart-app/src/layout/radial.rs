//! Radial sunburst: hardware groups split the circle into wedges sized by
//! slot count, hosts split their group's wedge the same way, and inside a
//! host wedge GPUs fill an inner band and CPUs an outer band.

use std::collections::BTreeMap;
use std::f64::consts::{FRAC_PI_2, TAU};

use clusterart_core::{Resource, SlotKind};

use super::{canonical_order, GridPos, GridSize};

/// Inner/outer radius of the GPU band, as fractions of the max radius.
const GPU_BAND: (f64, f64) = (0.30, 0.58);
/// Inner/outer radius of the CPU band.
const CPU_BAND: (f64, f64) = (0.61, 0.95);

#[derive(Default)]
struct HostWedge<'a> {
    hostname: &'a str,
    gpus: Vec<usize>,
    cpus: Vec<usize>,
}

impl HostWedge<'_> {
    fn len(&self) -> usize {
        self.gpus.len() + self.cpus.len()
    }
}

pub(super) fn compute(resources: &[Resource], grid: GridSize) -> Vec<GridPos> {
    // group -> host -> slots
    let mut tree: BTreeMap<&str, BTreeMap<&str, HostWedge>> = BTreeMap::new();
    for i in canonical_order(resources) {
        let r = &resources[i];
        let host = tree
            .entry(r.hardware_group.as_str())
            .or_default()
            .entry(r.hostname.as_str())
            .or_insert_with(|| HostWedge {
                hostname: &r.hostname,
                ..Default::default()
            });
        match r.kind {
            SlotKind::Gpu => host.gpus.push(i),
            SlotKind::Cpu => host.cpus.push(i),
        }
    }

    let mut groups: Vec<(&str, Vec<HostWedge>)> = tree
        .into_iter()
        .map(|(name, hosts)| {
            let mut hosts: Vec<HostWedge> = hosts.into_values().collect();
            hosts.sort_by(|a, b| b.len().cmp(&a.len()).then(a.hostname.cmp(b.hostname)));
            (name, hosts)
        })
        .collect();
    groups.sort_by(|a, b| group_total(&b.1).cmp(&group_total(&a.1)).then(a.0.cmp(b.0)));

    let total = resources.len() as f64;
    let geometry = Geometry {
        cx: grid.width as f64 / 2.0,
        cy: grid.height as f64 / 2.0,
        max_r: grid.width.min(grid.height) as f64 / 2.0,
    };

    let mut positions = vec![GridPos::default(); resources.len()];
    let mut angle = -FRAC_PI_2;
    for (_, hosts) in &groups {
        for host in hosts {
            let span = TAU * host.len() as f64 / total;
            geometry.fill_band(&host.gpus, angle, span, GPU_BAND, &mut positions);
            geometry.fill_band(&host.cpus, angle, span, CPU_BAND, &mut positions);
            angle += span;
        }
    }
    positions
}

fn group_total(hosts: &[HostWedge]) -> usize {
    hosts.iter().map(HostWedge::len).sum()
}

struct Geometry {
    cx: f64,
    cy: f64,
    max_r: f64,
}

impl Geometry {
    /// Pack `items` into concentric rings between the band radii, within the
    /// angular wedge `[start, start + span)`.
    fn fill_band(
        &self,
        items: &[usize],
        start: f64,
        span: f64,
        band: (f64, f64),
        positions: &mut [GridPos],
    ) {
        if items.is_empty() {
            return;
        }
        let (r0, r1) = (band.0 * self.max_r, band.1 * self.max_r);
        let mean_r = (r0 + r1) / 2.0;
        let capacity = ((span * mean_r).floor() as usize).max(1);
        let rings = items.len().div_ceil(capacity);
        let per_ring = items.len().div_ceil(rings);

        for (ring, chunk) in items.chunks(per_ring).enumerate() {
            let radius = r0 + (r1 - r0) * (ring as f64 + 0.5) / rings as f64;
            let cell = span / chunk.len() as f64;
            for (j, &i) in chunk.iter().enumerate() {
                let theta = start + cell * (j as f64 + 0.5);
                positions[i] = GridPos::new(
                    (self.cx + radius * theta.cos()).round() as i32,
                    (self.cy + radius * theta.sin()).round() as i32,
                );
            }
        }
    }
}
