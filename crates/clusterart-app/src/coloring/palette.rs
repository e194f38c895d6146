//! Fixed palettes and reserved colors.

use clusterart_core::Color;

/// Idle slots, whatever the strategy.
pub const IDLE: Color = Color::from_hex(0x2a2a2a);

/// Fallback for keys no strategy knows about.
pub const DEFAULT_GRAY: Color = Color::from_hex(0x808080);

/// Occupied slots under slot-status coloring.
pub const OCCUPIED_GREEN: Color = Color::from_hex(0x2ecc71);

/// CPU slots under GPU-type coloring.
pub const NO_GPU: Color = Color::from_hex(0x3a3a4a);

/// GPU slots whose host does not report a GPU type.
pub const UNKNOWN_GPU: Color = Color::from_hex(0x6c6c6c);

/// Hand-picked, well-separated hues for occupants.
pub const OCCUPANT: [Color; 30] = [
    Color::from_hex(0xe6194b),
    Color::from_hex(0x3cb44b),
    Color::from_hex(0xffe119),
    Color::from_hex(0x4363d8),
    Color::from_hex(0xf58231),
    Color::from_hex(0x911eb4),
    Color::from_hex(0x46f0f0),
    Color::from_hex(0xf032e6),
    Color::from_hex(0xbcf60c),
    Color::from_hex(0xfabebe),
    Color::from_hex(0x008080),
    Color::from_hex(0xe6beff),
    Color::from_hex(0x9a6324),
    Color::from_hex(0xfffac8),
    Color::from_hex(0x800000),
    Color::from_hex(0xaaffc3),
    Color::from_hex(0x808000),
    Color::from_hex(0xffd8b1),
    Color::from_hex(0x000075),
    Color::from_hex(0xff6f61),
    Color::from_hex(0x6b5b95),
    Color::from_hex(0x88b04b),
    Color::from_hex(0xf7cac9),
    Color::from_hex(0x92a8d1),
    Color::from_hex(0x955251),
    Color::from_hex(0xb565a7),
    Color::from_hex(0x009b77),
    Color::from_hex(0xdd4124),
    Color::from_hex(0x45b8ac),
    Color::from_hex(0xefc050),
];

/// Round-robin palette for hostname rows.
pub const ROW: [Color; 20] = [
    Color::from_hex(0x1f77b4),
    Color::from_hex(0xff7f0e),
    Color::from_hex(0x2ca02c),
    Color::from_hex(0xd62728),
    Color::from_hex(0x9467bd),
    Color::from_hex(0x8c564b),
    Color::from_hex(0xe377c2),
    Color::from_hex(0x7f7f7f),
    Color::from_hex(0xbcbd22),
    Color::from_hex(0x17becf),
    Color::from_hex(0xaec7e8),
    Color::from_hex(0xffbb78),
    Color::from_hex(0x98df8a),
    Color::from_hex(0xff9896),
    Color::from_hex(0xc5b0d5),
    Color::from_hex(0xc49c94),
    Color::from_hex(0xf7b6d2),
    Color::from_hex(0xc7c7c7),
    Color::from_hex(0xdbdb8d),
    Color::from_hex(0x9edae5),
];

/// Host statuses reported by the scheduler, with their semantic colors.
pub const HOST_STATUS: [(&str, Color); 8] = [
    ("ok", Color::from_hex(0x27ae60)),
    ("closed_Full", Color::from_hex(0xe67e22)),
    ("closed_Excl", Color::from_hex(0xd35400)),
    ("closed_Adm", Color::from_hex(0x8e44ad)),
    ("closed_Busy", Color::from_hex(0xc0392b)),
    ("unavail", Color::from_hex(0x7f8c8d)),
    ("unreach", Color::from_hex(0x34495e)),
    ("unknown", Color::from_hex(0x555555)),
];

/// Statuses not in [`HOST_STATUS`] draw from here, first come first served.
pub const STATUS_SECONDARY: [Color; 8] = [
    Color::from_hex(0x16a085),
    Color::from_hex(0x2980b9),
    Color::from_hex(0xf1c40f),
    Color::from_hex(0xe84393),
    Color::from_hex(0x00cec9),
    Color::from_hex(0xfd79a8),
    Color::from_hex(0x6c5ce7),
    Color::from_hex(0xfab1a0),
];

/// Hardware groups known to the cluster, in hue order.
pub const KNOWN_HARDWARE_GROUPS: [&str; 10] = [
    "8GPU H200",
    "8GPU H100",
    "8GPU A100",
    "4GPU A100",
    "4GPU V100",
    "2GPU L40S",
    "4GPU RTX 8000",
    "CPU Large Memory",
    "CPU Standard",
    "Login",
];

/// Blue (0) through green and yellow to red (1).
pub fn heat(t: f64) -> Color {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    Color::from_hsl(240.0 * (1.0 - t), 0.8, 0.5)
}

/// Stable hue for an arbitrary string.
pub fn hashed(key: &str) -> Color {
    let hash = key
        .bytes()
        .fold(0i32, |h, b| h.wrapping_mul(31).wrapping_add(i32::from(b)));
    Color::from_hsl(f64::from(hash.unsigned_abs() % 360), 0.65, 0.55)
}
