//! Spherical Web-Mercator math in "world pixel" space.
//!
//! World pixels span `[0, scale)` on both axes, where
//! `scale = tile_size_px * 2^zoom`. The origin is the north-west corner
//! (lon -180°, lat ~85.0511°) and y grows southwards, matching slippy-map tiles.

use std::f64::consts::PI;

use crate::tile::TileCoord;

/// Tile edge at zoom 0 used by the standard XYZ tile providers.
pub const DEFAULT_TILE_SIZE_PX: u32 = 256;

/// Highest zoom the integer tile math supports.
pub const MAX_TILE_ZOOM: u8 = 30;

/// Side length of the whole world in pixels at `zoom`.
pub fn world_size_px(tile_size_px: u32, zoom: u8) -> f64 {
    tile_size_px as f64 * 2f64.powi(zoom as i32)
}

pub fn lon_to_world_x(lon: f64, scale: f64) -> f64 {
    (lon + 180.0) / 360.0 * scale
}

/// Latitude must already be clamped to the Mercator range; poles are a
/// precondition violation.
pub fn lat_to_world_y(lat: f64, scale: f64) -> f64 {
    debug_assert!(
        lat.is_finite() && lat.abs() < 90.0,
        "latitude {lat} outside Web-Mercator domain"
    );
    let lat_rad = lat.to_radians();
    let merc = (lat_rad.tan() + 1.0 / lat_rad.cos()).ln();
    (1.0 - merc / PI) / 2.0 * scale
}

pub fn world_x_to_lon(x: f64, scale: f64) -> f64 {
    x / scale * 360.0 - 180.0
}

pub fn world_y_to_lat(y: f64, scale: f64) -> f64 {
    let n = PI * (1.0 - 2.0 * y / scale);
    n.sinh().atan().to_degrees()
}

/// Slippy-map tile containing `(lat, lon)` at `zoom`.
///
/// `x` wraps modulo `2^zoom` so longitudes past ±180° land on the opposite
/// edge. `y` never wraps; it is clamped to the valid row range in release
/// builds and asserted in debug builds.
pub fn geo_to_tile(lat: f64, lon: f64, zoom: u8) -> TileCoord {
    debug_assert!(zoom <= MAX_TILE_ZOOM, "zoom {zoom} too deep for tile math");
    let n = TileCoord::tiles_per_axis(zoom) as i64;
    let scale = n as f64;

    let x = lon_to_world_x(lon, scale).floor() as i64;
    let y = lat_to_world_y(lat, scale).floor() as i64;
    debug_assert!((0..n).contains(&y), "tile row {y} outside [0, {n})");

    TileCoord::new(zoom, x.rem_euclid(n) as u32, y.clamp(0, n - 1) as u32)
}
