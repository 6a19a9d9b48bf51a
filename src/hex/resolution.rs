/// Resolution used when a zoom level has no table entry.
pub const DEFAULT_RESOLUTION: u8 = 6;

const MIN_ZOOM: f64 = 2.0;
const MAX_ZOOM: f64 = 18.0;

/// Grid resolution for integer zooms 2..=18 (index 0 is zoom 2).
const RESOLUTIONS: [u8; 17] = [1, 2, 2, 3, 3, 4, 4, 5, 5, 6, 6, 7, 8, 9, 10, 11, 12];

/// Map a continuous zoom level to a grid resolution in `1..=12`.
/// Zoom is rounded to the nearest integer and clamped to `2..=18`; NaN behaves like 2.
pub fn resolution(zoom: f64) -> u8 {
    // f64::max/min discard NaN, so a NaN zoom lands on MIN_ZOOM.
    let z = zoom.round().max(MIN_ZOOM).min(MAX_ZOOM);
    RESOLUTIONS.get((z - MIN_ZOOM) as usize).copied().unwrap_or(DEFAULT_RESOLUTION)
}
