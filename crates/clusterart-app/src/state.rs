//! Session state (Model in TEA pattern)
//!
//! One [`SessionState`] owns everything the UI shows: canvas geometry and
//! zoom, drag interaction, panel flags, active color/layout modes, the
//! time-travel slice, the current resources and the color identity caches.

use chrono::{DateTime, Utc};

use clusterart_core::{Resource, Snapshot};

use crate::coloring::{ColorCaches, ColorMode};
use crate::config::Settings;
use crate::layout::{GridSize, LayoutMode};
use crate::time_travel::TimeTravelState;

pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 10.0;

// ─────────────────────────────────────────────────────────────────────────────
// Canvas
// ─────────────────────────────────────────────────────────────────────────────

/// Canvas position, size and zoom, in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasView {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub zoom: f64,
}

impl Default for CanvasView {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 1600.0,
            height: 900.0,
            zoom: 1.0,
        }
    }
}

impl CanvasView {
    /// Zoom as a whole percentage for display.
    pub fn zoom_percent(&self) -> u32 {
        (self.zoom * 100.0).round() as u32
    }

    /// Multiply the zoom by `factor`, clamped to the allowed range.
    pub fn zoom_by(&mut self, factor: f64) {
        if factor.is_finite() && factor > 0.0 {
            self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        }
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        if zoom.is_finite() {
            self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        }
    }
}

/// Pointer drag in progress.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DragState {
    pub active: bool,
    /// Pointer position when the drag started.
    pub pointer_start: (f64, f64),
    /// Canvas position when the drag started.
    pub canvas_start: (f64, f64),
}

impl DragState {
    pub fn begin(&mut self, pointer: (f64, f64), canvas: &CanvasView) {
        self.active = true;
        self.pointer_start = pointer;
        self.canvas_start = (canvas.x, canvas.y);
    }

    /// Canvas position for the pointer now at `pointer`, if dragging.
    pub fn follow(&self, pointer: (f64, f64)) -> Option<(f64, f64)> {
        self.active.then(|| {
            (
                self.canvas_start.0 + pointer.0 - self.pointer_start.0,
                self.canvas_start.1 + pointer.1 - self.pointer_start.1,
            )
        })
    }

    pub fn end(&mut self) {
        self.active = false;
    }
}

/// Which collapsible panels are expanded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PanelState {
    pub legend_expanded: bool,
    pub help_expanded: bool,
    pub time_travel_expanded: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// Session
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SessionState {
    pub canvas: CanvasView,
    pub drag: DragState,
    pub panels: PanelState,

    pub color_mode: ColorMode,
    pub layout_mode: LayoutMode,
    pub grid: GridSize,

    pub time_travel: TimeTravelState,

    pub resources: Vec<Resource>,
    pub color_caches: ColorCaches,

    /// `fetchedAt` of the snapshot on display, when the payload carried one.
    pub fetched_at: Option<i64>,

    /// Bumped whenever `resources` is replaced.
    pub data_generation: u64,

    /// Most recent fetch failure, for display.
    pub last_error: Option<String>,
    /// Bumped on every recorded failure.
    pub error_generation: u64,

    should_quit: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::with_settings(&Settings::default())
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Initial state from settings. Out-of-range mode indices fall back to
    /// the defaults.
    pub fn with_settings(settings: &Settings) -> Self {
        Self {
            canvas: CanvasView::default(),
            drag: DragState::default(),
            panels: PanelState::default(),
            color_mode: ColorMode::from_index(settings.view.color_mode).unwrap_or_default(),
            layout_mode: LayoutMode::from_index(settings.view.layout_mode).unwrap_or_default(),
            grid: GridSize::new(settings.view.grid_width, settings.view.grid_height),
            time_travel: TimeTravelState::new(&settings.time_travel, Utc::now()),
            resources: Vec::new(),
            color_caches: ColorCaches::new(),
            fetched_at: None,
            data_generation: 0,
            last_error: None,
            error_generation: 0,
            should_quit: false,
        }
    }

    /// Select a color mode by 1-based index. Out-of-range indices are
    /// rejected and leave the current mode untouched.
    pub fn set_color_mode(&mut self, index: u8) -> bool {
        match ColorMode::from_index(index) {
            Some(mode) => {
                self.color_mode = mode;
                true
            }
            None => false,
        }
    }

    /// Select a layout mode by 1-based index; see [`Self::set_color_mode`].
    pub fn set_layout_mode(&mut self, index: u8) -> bool {
        match LayoutMode::from_index(index) {
            Some(mode) => {
                self.layout_mode = mode;
                true
            }
            None => false,
        }
    }

    /// Replace the resources with those built from `snapshot`.
    pub fn load_snapshot(&mut self, snapshot: &Snapshot) {
        self.resources = snapshot.to_resources();
        self.fetched_at = snapshot.fetched_at_unix();
        self.data_generation += 1;
        self.last_error = None;
    }

    pub fn record_error(&mut self, message: impl Into<String>) {
        self.last_error = Some(message.into());
        self.error_generation += 1;
    }

    /// Human-readable label for the time on display.
    pub fn timestamp_label(&self) -> String {
        let ts = if self.time_travel.mode {
            self.time_travel.timestamp
        } else {
            self.fetched_at
        };
        match ts.and_then(|t| DateTime::<Utc>::from_timestamp(t, 0)) {
            Some(dt) if self.time_travel.mode => dt.format("%Y-%m-%d %H:%M UTC").to_string(),
            Some(dt) => format!("Live ({})", dt.format("%Y-%m-%d %H:%M UTC")),
            None if self.time_travel.mode => "Historical".to_string(),
            None => "Live".to_string(),
        }
    }

    pub fn request_quit(&mut self) {
        self.should_quit = true;
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }
}
