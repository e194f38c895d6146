//! URL hash persistence.
//!
//! A lossy projection of [`SessionState`] into `key=value` pairs joined with
//! `&`:
//!
//! | key | value |
//! |---|---|
//! | `x`, `y`, `w`, `h` | canvas geometry, rounded |
//! | `zoom` | two decimals |
//! | `color`, `layout` | mode index 1-9 |
//! | `legend`, `help`, `tt` | panel flags, 0/1 |
//! | `speed` | playback multiplier |
//! | `ts` | historical timestamp; presence implies historical mode |
//! | `play` | `1` when playback is active (or pending restore) |
//! | `start` | explicitly chosen window start |
//!
//! Decoding never fails: every key is optional and malformed values are
//! skipped, leaving the current value in place.

use url::form_urlencoded;

use crate::coloring::ColorMode;
use crate::layout::LayoutMode;
use crate::state::SessionState;

/// Decoded hash. `None` means "keep the current value".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UrlState {
    pub x: Option<i64>,
    pub y: Option<i64>,
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub zoom: Option<f64>,
    pub color_mode: Option<ColorMode>,
    pub layout_mode: Option<LayoutMode>,
    pub legend_expanded: Option<bool>,
    pub help_expanded: Option<bool>,
    pub time_travel_expanded: Option<bool>,
    pub speed: Option<u32>,
    pub timestamp: Option<i64>,
    pub play: Option<bool>,
    pub window_start: Option<i64>,
}

fn flag(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value {
        "1" => Some(true),
        "0" => Some(false),
        _ => None,
    }
}

/// Encode the persisted subset of `state`, without a leading `#`.
pub fn encode(state: &SessionState) -> String {
    let canvas = &state.canvas;
    let tt = &state.time_travel;
    let mut out = form_urlencoded::Serializer::new(String::new());
    out.append_pair("x", &(canvas.x.round() as i64).to_string())
        .append_pair("y", &(canvas.y.round() as i64).to_string())
        .append_pair("w", &(canvas.width.round() as i64).to_string())
        .append_pair("h", &(canvas.height.round() as i64).to_string())
        .append_pair("zoom", &format!("{:.2}", canvas.zoom))
        .append_pair("color", &state.color_mode.index().to_string())
        .append_pair("layout", &state.layout_mode.index().to_string())
        .append_pair("legend", flag(state.panels.legend_expanded))
        .append_pair("help", flag(state.panels.help_expanded))
        .append_pair("tt", flag(state.panels.time_travel_expanded))
        .append_pair("speed", &tt.speed.to_string());

    if tt.mode {
        if let Some(ts) = tt.timestamp {
            out.append_pair("ts", &ts.to_string());
        }
    }
    if tt.playing || tt.play_on_load {
        out.append_pair("play", "1");
    }
    if let Some(start) = tt.window_start {
        out.append_pair("start", &start.to_string());
    }
    out.finish()
}

/// Decode a hash, with or without its leading `#`.
pub fn decode(hash: &str) -> UrlState {
    let hash = hash.strip_prefix('#').unwrap_or(hash);
    let mut url = UrlState::default();

    for (key, value) in form_urlencoded::parse(hash.as_bytes()) {
        let value = value.as_ref();
        match key.as_ref() {
            "x" => url.x = value.parse().ok().or(url.x),
            "y" => url.y = value.parse().ok().or(url.y),
            "w" => url.width = value.parse().ok().or(url.width),
            "h" => url.height = value.parse().ok().or(url.height),
            "zoom" => {
                url.zoom = value
                    .parse::<f64>()
                    .ok()
                    .filter(|z| z.is_finite())
                    .or(url.zoom)
            }
            "color" => {
                url.color_mode = value
                    .parse()
                    .ok()
                    .and_then(ColorMode::from_index)
                    .or(url.color_mode)
            }
            "layout" => {
                url.layout_mode = value
                    .parse()
                    .ok()
                    .and_then(LayoutMode::from_index)
                    .or(url.layout_mode)
            }
            "legend" => url.legend_expanded = parse_flag(value).or(url.legend_expanded),
            "help" => url.help_expanded = parse_flag(value).or(url.help_expanded),
            "tt" => url.time_travel_expanded = parse_flag(value).or(url.time_travel_expanded),
            "speed" => url.speed = value.parse().ok().filter(|s| *s > 0).or(url.speed),
            "ts" => url.timestamp = value.parse().ok().or(url.timestamp),
            "play" => url.play = parse_flag(value).or(url.play),
            "start" => url.window_start = value.parse().ok().or(url.window_start),
            _ => {}
        }
    }
    url
}

impl UrlState {
    /// Write every present field into `state`.
    ///
    /// A timestamp switches the session to historical mode at that time; the
    /// matching index is resolved once the timepoint index is loaded. A play
    /// flag is recorded as pending and honoured after that first load.
    pub fn apply_to(&self, state: &mut SessionState) {
        let canvas = &mut state.canvas;
        if let Some(x) = self.x {
            canvas.x = x as f64;
        }
        if let Some(y) = self.y {
            canvas.y = y as f64;
        }
        if let Some(w) = self.width {
            canvas.width = w as f64;
        }
        if let Some(h) = self.height {
            canvas.height = h as f64;
        }
        if let Some(zoom) = self.zoom {
            canvas.set_zoom(zoom);
        }
        if let Some(mode) = self.color_mode {
            state.color_mode = mode;
        }
        if let Some(mode) = self.layout_mode {
            state.layout_mode = mode;
        }
        if let Some(v) = self.legend_expanded {
            state.panels.legend_expanded = v;
        }
        if let Some(v) = self.help_expanded {
            state.panels.help_expanded = v;
        }
        if let Some(v) = self.time_travel_expanded {
            state.panels.time_travel_expanded = v;
        }

        let tt = &mut state.time_travel;
        if let Some(speed) = self.speed {
            tt.speed = speed;
        }
        if let Some(start) = self.window_start {
            tt.window_start = Some(start);
        }
        if let Some(ts) = self.timestamp {
            tt.mode = true;
            tt.timestamp = Some(ts);
        }
        if let Some(play) = self.play {
            tt.play_on_load = play && tt.mode;
        }
    }
}
