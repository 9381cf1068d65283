use foundation::{LatLon, ScreenPosition};
use runtime::EventBus;
use serde::Serialize;

use crate::config::ViewportConfig;
use crate::projection::Projection;

pub const DEFAULT_VIEWPORT_SIZE_PX: [u32; 2] = [1280, 720];

/// Change notification emitted by [`ViewportState`].
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViewportEvent {
    CenterChanged { revision: u64, center: LatLon },
    ZoomChanged { revision: u64, zoom: u8 },
}

/// Center, zoom and size of one map view.
///
/// Out-of-range input is corrected, never rejected: latitude is clamped to
/// ±85°, longitude wrapped into (-180°, 180°], zoom clamped to the configured
/// bounds. Every effective mutation emits events on the internal bus; no-op
/// mutations emit nothing.
#[derive(Debug)]
pub struct ViewportState {
    config: ViewportConfig,
    center: LatLon,
    zoom: u8,
    size_px: [u32; 2],
    bus: EventBus<ViewportEvent>,
}

impl ViewportState {
    /// A non-finite `center` falls back to (0, 0).
    pub fn new(config: ViewportConfig, center: LatLon, zoom: i32) -> Self {
        let center = if center.lat.is_finite() && center.lon.is_finite() {
            center.normalized()
        } else {
            LatLon::new(0.0, 0.0)
        };
        Self {
            config,
            center,
            zoom: config.clamp_zoom(zoom),
            size_px: DEFAULT_VIEWPORT_SIZE_PX,
            bus: EventBus::new(),
        }
    }

    pub fn with_size(mut self, size_px: [u32; 2]) -> Self {
        self.size_px = size_px;
        self
    }

    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }

    pub fn center(&self) -> LatLon {
        self.center
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn size_px(&self) -> [u32; 2] {
        self.size_px
    }

    pub fn set_size(&mut self, size_px: [u32; 2]) {
        self.size_px = size_px;
    }

    pub fn projection(&self) -> Projection {
        Projection::new(self.config.tile_size_px, self.zoom, self.center)
    }

    /// Moves the center and optionally the zoom in one mutation. A
    /// non-finite coordinate leaves the center where it is.
    pub fn set_center(&mut self, lat: f64, lon: f64, zoom: Option<i32>) {
        let center = (lat.is_finite() && lon.is_finite())
            .then(|| LatLon::new(lat, lon).normalized());
        let zoom = zoom.map(|z| self.config.clamp_zoom(z));
        self.apply(center, zoom);
    }

    /// Returns false when the zoom was already at the clamped target.
    pub fn set_zoom(&mut self, zoom: i32) -> bool {
        let zoom = self.config.clamp_zoom(zoom);
        self.apply(None, Some(zoom))
    }

    pub fn zoom_in(&mut self) -> bool {
        self.set_zoom(self.zoom as i32 + 1)
    }

    pub fn zoom_out(&mut self) -> bool {
        self.set_zoom(self.zoom as i32 - 1)
    }

    /// Moves the center by `delta_px` screen pixels at the current zoom.
    ///
    /// `delta_px` follows [`ScreenPosition`] axes (east and north positive),
    /// so the map content appears to move the opposite way. A drag gesture
    /// passes the negated pointer delta.
    pub fn pan(&mut self, delta_px: ScreenPosition) -> bool {
        if !delta_px.is_finite() {
            return false;
        }
        let target = self.projection().screen_to_geo(delta_px).normalized();
        self.apply(Some(target), None)
    }

    pub fn events(&self) -> &[ViewportEvent] {
        self.bus.events()
    }

    pub fn drain_events(&mut self) -> Vec<ViewportEvent> {
        self.bus.drain()
    }

    fn apply(&mut self, center: Option<LatLon>, zoom: Option<u8>) -> bool {
        let center = center.filter(|c| *c != self.center);
        let zoom = zoom.filter(|z| *z != self.zoom);
        if center.is_none() && zoom.is_none() {
            return false;
        }

        let revision = self.bus.next_revision();
        if let Some(center) = center {
            self.center = center;
            self.bus
                .emit(ViewportEvent::CenterChanged { revision, center });
        }
        if let Some(zoom) = zoom {
            self.zoom = zoom;
            self.bus.emit(ViewportEvent::ZoomChanged { revision, zoom });
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::{ViewportEvent, ViewportState};
    use crate::config::ViewportConfig;
    use foundation::{LatLon, ScreenPosition};

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    fn madrid() -> ViewportState {
        ViewportState::new(ViewportConfig::default(), LatLon::new(40.4168, -3.7038), 6)
    }

    #[test]
    fn set_center_clamps_wraps_and_bounds_zoom() {
        let mut vp = madrid();
        vp.set_center(95.0, 200.0, Some(99));
        assert_eq!(vp.center().lat, 85.0);
        assert_close(vp.center().lon, -160.0, 1e-12);
        assert_eq!(vp.zoom(), 18);
    }

    #[test]
    fn construction_is_clamped_and_silent() {
        let vp = ViewportState::new(ViewportConfig::default(), LatLon::new(-91.0, -540.0), 1);
        assert_eq!(vp.center(), LatLon::new(-85.0, 180.0));
        assert_eq!(vp.zoom(), 4);
        assert!(vp.events().is_empty());
    }

    #[test]
    fn non_finite_center_is_ignored() {
        let mut vp = madrid();
        let before = vp.center();
        vp.set_center(f64::NAN, 0.0, None);
        vp.set_center(10.0, f64::INFINITY, Some(9));
        assert_eq!(vp.center(), before);
        assert_eq!(vp.zoom(), 9);
        assert_eq!(vp.drain_events().len(), 1);
        // Still projectable.
        let p = vp.projection().geo_to_screen(before.lat, before.lon);
        assert!(p.is_finite());

        let vp = ViewportState::new(ViewportConfig::default(), LatLon::new(f64::NAN, 3.0), 6);
        assert_eq!(vp.center(), LatLon::new(0.0, 0.0));
    }

    #[test]
    fn zoom_is_noop_at_bounds() {
        let mut vp = madrid();
        assert!(vp.set_zoom(18));
        assert!(!vp.zoom_in());
        assert_eq!(vp.zoom(), 18);
        assert!(vp.set_zoom(4));
        assert!(!vp.zoom_out());
        assert_eq!(vp.zoom(), 4);
        vp.drain_events();
        assert!(!vp.set_zoom(-10));
        assert!(vp.events().is_empty());
    }

    #[test]
    fn zoom_steps_by_one() {
        let mut vp = madrid();
        assert!(vp.zoom_in());
        assert_eq!(vp.zoom(), 7);
        assert!(vp.zoom_out());
        assert!(vp.zoom_out());
        assert_eq!(vp.zoom(), 5);
    }

    #[test]
    fn set_center_with_zoom_shares_revision() {
        let mut vp = madrid();
        vp.set_center(41.0, 2.0, Some(8));
        let events = vp.drain_events();
        assert_eq!(
            events,
            vec![
                ViewportEvent::CenterChanged {
                    revision: 1,
                    center: LatLon::new(41.0, 2.0)
                },
                ViewportEvent::ZoomChanged {
                    revision: 1,
                    zoom: 8
                },
            ]
        );
        vp.set_center(41.0, 2.0, Some(8));
        assert!(vp.events().is_empty());
    }

    #[test]
    fn pan_moves_center_by_pixel_delta() {
        let mut vp = madrid();
        let before = vp.projection();
        assert!(vp.pan(ScreenPosition::new(100.0, -50.0)));

        // The old center now sits opposite to the pan direction.
        let old_center = LatLon::new(40.4168, -3.7038);
        let s = vp.projection().geo_to_screen(old_center.lat, old_center.lon);
        assert_close(s.x, -100.0, 1e-6);
        assert_close(s.y, 50.0, 1e-6);
        assert_eq!(before.zoom(), vp.zoom());
        assert!(matches!(
            vp.events(),
            [ViewportEvent::CenterChanged { revision: 1, .. }]
        ));
    }

    #[test]
    fn pan_wraps_across_antimeridian() {
        let mut vp = ViewportState::new(ViewportConfig::default(), LatLon::new(0.0, 179.0), 4);
        // 2 degrees east at z4: 4096 px world / 360 * 2.
        let dx = 4096.0 / 360.0 * 2.0;
        vp.pan(ScreenPosition::new(dx, 0.0));
        assert_close(vp.center().lon, -179.0, 1e-9);
    }

    #[test]
    fn pan_clamps_latitude() {
        let mut vp = ViewportState::new(ViewportConfig::default(), LatLon::new(84.0, 0.0), 4);
        vp.pan(ScreenPosition::new(0.0, 100_000.0));
        assert_eq!(vp.center().lat, 85.0);
    }

    #[test]
    fn pan_ignores_non_finite_delta() {
        let mut vp = madrid();
        assert!(!vp.pan(ScreenPosition::new(f64::NAN, 0.0)));
        assert_eq!(vp.center(), LatLon::new(40.4168, -3.7038));
    }
}
