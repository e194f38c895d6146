//! Render-ready view of the session
//!
//! A [`Frame`] is what a renderer consumes: every slot with its grid position
//! and color, plus the legend and display labels. Building one runs the active
//! layout and color strategy over the current resources.

use serde::Serialize;

use clusterart_core::{Color, SlotKind};

use crate::coloring::LegendItem;
use crate::layout::GridSize;
use crate::state::SessionState;

/// One slot as drawn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotView {
    pub hostname: String,
    pub kind: SlotKind,
    pub index: u32,
    pub occupant: Option<String>,
    pub x: i32,
    pub y: i32,
    pub color: Color,
}

#[derive(Debug, Clone, Serialize)]
pub struct Frame {
    pub layout: &'static str,
    pub color_mode: &'static str,
    pub historical: bool,
    pub timestamp: Option<i64>,
    pub timestamp_label: String,
    pub playing: bool,
    pub zoom_percent: u32,
    pub grid: GridSize,
    pub slots: Vec<SlotView>,
    pub legend: Vec<LegendItem>,
}

impl Frame {
    /// Lay out and color the session's resources.
    ///
    /// Writes positions into `state.resources` and grows the color identity
    /// caches as new occupants or statuses appear.
    pub fn build(state: &mut SessionState) -> Self {
        state.layout_mode.apply(&mut state.resources, state.grid);

        let mut strategy = state.color_mode.strategy();
        strategy.initialize(&state.resources, &mut state.color_caches);

        let slots = state
            .resources
            .iter()
            .map(|r| SlotView {
                hostname: r.hostname.clone(),
                kind: r.kind,
                index: r.index,
                occupant: r.occupant.clone(),
                x: r.x,
                y: r.y,
                color: strategy.color(r, &state.color_caches),
            })
            .collect();
        let legend = strategy.legend(&state.resources, &state.color_caches);

        let tt = &state.time_travel;
        Self {
            layout: state.layout_mode.name(),
            color_mode: state.color_mode.name(),
            historical: tt.mode,
            timestamp: if tt.mode { tt.timestamp } else { state.fetched_at },
            timestamp_label: state.timestamp_label(),
            playing: tt.playing,
            zoom_percent: state.canvas.zoom_percent(),
            grid: state.grid,
            slots,
            legend,
        }
    }
}
