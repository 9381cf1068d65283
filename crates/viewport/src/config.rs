use foundation::math::{DEFAULT_TILE_SIZE_PX, MAX_TILE_ZOOM};
use serde::{Deserialize, Serialize};

/// Static projection settings shared by every viewport of a map.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewportConfig {
    /// Tile edge in pixels at zoom 0; must match the background tile provider.
    pub tile_size_px: u32,
    pub min_zoom: u8,
    pub max_zoom: u8,
}

impl ViewportConfig {
    /// Normalizes the bounds so `min_zoom <= max_zoom <= MAX_TILE_ZOOM`.
    pub fn new(tile_size_px: u32, min_zoom: u8, max_zoom: u8) -> Self {
        let max_zoom = max_zoom.min(MAX_TILE_ZOOM);
        Self {
            tile_size_px: tile_size_px.max(1),
            min_zoom: min_zoom.min(max_zoom),
            max_zoom,
        }
    }

    pub fn clamp_zoom(&self, zoom: i32) -> u8 {
        zoom.clamp(self.min_zoom as i32, self.max_zoom as i32) as u8
    }
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            tile_size_px: DEFAULT_TILE_SIZE_PX,
            min_zoom: 4,
            max_zoom: 18,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ViewportConfig;

    #[test]
    fn new_orders_inverted_bounds() {
        let cfg = ViewportConfig::new(0, 20, 10);
        assert_eq!(cfg.tile_size_px, 1);
        assert_eq!(cfg.min_zoom, 10);
        assert_eq!(cfg.max_zoom, 10);
    }

    #[test]
    fn clamp_zoom_handles_negative_and_huge() {
        let cfg = ViewportConfig::default();
        assert_eq!(cfg.clamp_zoom(-3), 4);
        assert_eq!(cfg.clamp_zoom(99), 18);
        assert_eq!(cfg.clamp_zoom(7), 7);
    }
}
