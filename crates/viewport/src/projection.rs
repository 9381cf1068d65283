//! Geographic ⇄ screen conversion for one viewport snapshot.
//!
//! A [`Projection`] captures center, zoom and tile size at the moment it is
//! built. It never outlives a viewport change: callers ask the
//! [`ViewportState`](crate::ViewportState) for a fresh one after every
//! mutation.

use foundation::math::{
    geo_to_tile, lat_to_world_y, lon_to_world_x, world_size_px, world_x_to_lon, world_y_to_lat,
};
use foundation::{LatLon, ScreenPosition, TileCoord};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Projection {
    tile_size_px: u32,
    zoom: u8,
    scale: f64,
    center: LatLon,
    center_px: [f64; 2],
}

impl Projection {
    pub fn new(tile_size_px: u32, zoom: u8, center: LatLon) -> Self {
        let scale = world_size_px(tile_size_px, zoom);
        let center_px = [
            lon_to_world_x(center.lon, scale),
            lat_to_world_y(center.lat, scale),
        ];
        Self {
            tile_size_px,
            zoom,
            scale,
            center,
            center_px,
        }
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn center(&self) -> LatLon {
        self.center
    }

    /// World size in pixels at the current zoom.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Absolute Mercator pixel position, origin at the north-west corner.
    pub fn world_px(&self, p: LatLon) -> [f64; 2] {
        [lon_to_world_x(p.lon, self.scale), lat_to_world_y(p.lat, self.scale)]
    }

    /// Offset of `(lat, lon)` from the viewport center, north up.
    pub fn geo_to_screen(&self, lat: f64, lon: f64) -> ScreenPosition {
        let [px, py] = self.world_px(LatLon::new(lat, lon));
        ScreenPosition::new(px - self.center_px[0], self.center_px[1] - py)
    }

    /// Exact inverse of [`geo_to_screen`](Self::geo_to_screen).
    ///
    /// The longitude is not wrapped: offsets past the world edge yield values
    /// beyond ±180°. Use [`LatLon::normalized`] when storing the result.
    pub fn screen_to_geo(&self, pos: ScreenPosition) -> LatLon {
        let px = self.center_px[0] + pos.x;
        let py = self.center_px[1] - pos.y;
        LatLon::new(world_y_to_lat(py, self.scale), world_x_to_lon(px, self.scale))
    }

    pub fn geo_to_tile(&self, lat: f64, lon: f64) -> TileCoord {
        geo_to_tile(lat, lon, self.zoom)
    }

    /// Tiles covering a viewport of `size_px` around the center, row-major
    /// from the north-west. Columns wrap across the antimeridian; rows stop
    /// at the poles.
    pub fn visible_tiles(&self, size_px: [u32; 2]) -> Vec<TileCoord> {
        let tile = self.tile_size_px as f64;
        let n = TileCoord::tiles_per_axis(self.zoom) as i64;
        let half_w = size_px[0] as f64 * 0.5;
        let half_h = size_px[1] as f64 * 0.5;

        let x0 = ((self.center_px[0] - half_w) / tile).floor() as i64;
        let x1 = ((self.center_px[0] + half_w) / tile).ceil() as i64 - 1;
        let y0 = ((self.center_px[1] - half_h) / tile).floor() as i64;
        let y1 = ((self.center_px[1] + half_h) / tile).ceil() as i64 - 1;

        let x1 = x1.max(x0).min(x0 + n - 1);
        let y0 = y0.clamp(0, n - 1);
        let y1 = y1.clamp(y0, n - 1);

        let mut out = Vec::with_capacity(((x1 - x0 + 1) * (y1 - y0 + 1)) as usize);
        for y in y0..=y1 {
            for x in x0..=x1 {
                out.push(TileCoord::new(self.zoom, x.rem_euclid(n) as u32, y as u32));
            }
        }
        out
    }
}
