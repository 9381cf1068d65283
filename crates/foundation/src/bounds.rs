use crate::screen::ScreenPosition;

/// Axis-aligned rectangle in center-relative screen pixels.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ScreenRect {
    pub min: [f64; 2],
    pub max: [f64; 2],
}

impl ScreenRect {
    pub fn new(min: [f64; 2], max: [f64; 2]) -> Self {
        ScreenRect { min, max }
    }

    /// Viewport of `size_px` centered on the origin, grown by `margin_px` on
    /// every side.
    pub fn around_center(size_px: [u32; 2], margin_px: f64) -> Self {
        let half_w = size_px[0] as f64 * 0.5 + margin_px;
        let half_h = size_px[1] as f64 * 0.5 + margin_px;
        ScreenRect::new([-half_w, -half_h], [half_w, half_h])
    }

    /// Edges are inclusive.
    pub fn contains(&self, p: ScreenPosition) -> bool {
        p.x >= self.min[0] && p.x <= self.max[0] && p.y >= self.min[1] && p.y <= self.max[1]
    }
}
