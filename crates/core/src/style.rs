//! Fixed styling tables

/// Casualty ramp, from no casualties (near white) to the heaviest toll.
pub const CASUALTY_RAMP: [&str; 5] = ["#fcfafa", "#ffdede", "#fcb3b3", "#fc9090", "#fa7373"];
pub const CASUALTY_RADIUS_SCALE: f64 = 3.0;
pub const CASUALTY_WEIGHT: f64 = 2.0;

/// Magnitude rings, innermost first. Ring `i` of a record uses entry `i` of each table.
pub const RING_COLORS: [&str; 10] = [
    "#000000", "#1C1C1C", "#383838", "#545454", "#707070", "#8C8C8C", "#A8A8A8", "#C4C4C4",
    "#D0D0D0", "#DCDCDC",
];
pub const RING_WIDTHS: [f64; 10] = [3.7, 3.4, 3.1, 2.8, 2.5, 2.2, 1.9, 1.6, 1.3, 1.0];
pub const RING_RADII: [f64; 10] = [0.2, 0.5, 1.0, 1.5, 2.0, 2.5, 3.0, 3.5, 4.0, 4.5];
/// Read back to front: ring `i` takes `RING_OPACITIES[len - 1 - i]`.
pub const RING_OPACITIES: [f64; 10] = [1.0, 0.85, 0.8, 0.75, 0.7, 0.65, 0.6, 0.55, 0.5, 0.45];
pub const RING_RADIUS_SCALE: f64 = 6.0;

pub const DEPTH_RING_COLOR: &str = "blue";
pub const DEPTH_RING_RADIUS_PAD: f64 = 0.5;
pub const DEPTH_RING_RADIUS_SCALE: f64 = 3.0;
pub const DEPTH_RING_WEIGHT_SCALE: f64 = 0.5;
pub const DEPTH_RING_DASH: &str = "5, 5";

pub const MARKER_LATITUDE_OFFSET: f64 = 2.0;
pub const MARKER_RADIUS: f64 = 0.0001;
pub const MARKER_COLOR: &str = "gray";
pub const MARKER_OPACITY: f64 = 0.01;
/// Milliseconds the popup stays open.
pub const MARKER_POPUP_MILLIS: u32 = 2000;

pub fn casualty_color(index: i64) -> Option<&'static str> {
    usize::try_from(index)
        .ok()
        .and_then(|i| CASUALTY_RAMP.get(i).copied())
}

pub fn ring_opacity(ring: usize) -> Option<f64> {
    RING_OPACITIES.len().checked_sub(ring + 1).map(|i| RING_OPACITIES[i])
}
