use serde::{Deserialize, Serialize};

use crate::math::mercator::{MAX_TILE_ZOOM, world_x_to_lon, world_y_to_lat};

/// Tile coordinate in ZXY scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    pub z: u8,
    pub x: u32,
    pub y: u32,
}

impl TileCoord {
    pub fn new(z: u8, x: u32, y: u32) -> Self {
        Self { z, x, y }
    }

    /// Number of tiles along one axis at this zoom (2^z), with `z` capped at
    /// [`MAX_TILE_ZOOM`].
    pub fn tiles_per_axis(z: u8) -> u32 {
        1u32 << z.min(MAX_TILE_ZOOM)
    }

    pub fn is_valid(&self) -> bool {
        let n = Self::tiles_per_axis(self.z);
        self.z <= MAX_TILE_ZOOM && self.x < n && self.y < n
    }

    /// Geographic bounds of this tile in WGS84 (lon_min, lat_min, lon_max, lat_max).
    /// Only meaningful for tiles where [`Self::is_valid`] holds.
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        let n = Self::tiles_per_axis(self.z) as f64;
        let (x, y) = (self.x as f64, self.y as f64);
        let lon_min = world_x_to_lon(x, n);
        let lon_max = world_x_to_lon(x + 1.0, n);
        // Row 0 is the northern edge.
        let lat_max = world_y_to_lat(y, n);
        let lat_min = world_y_to_lat(y + 1.0, n);
        (lon_min, lat_min, lon_max, lat_max)
    }
}

impl std::fmt::Display for TileCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.z, self.x, self.y)
    }
}
