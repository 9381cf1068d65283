use serde::{Deserialize, Serialize};

/// Latitude bound applied to every viewport center.
///
/// Slightly inside the Web-Mercator limit (~85.0511°) so the projection never
/// approaches its singularity.
pub const MAX_CENTER_LATITUDE: f64 = 85.0;

/// Geographic position in WGS84 degrees.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Clamped latitude, wrapped longitude.
    pub fn normalized(self) -> Self {
        Self::new(clamp_latitude(self.lat), wrap_longitude(self.lon))
    }

    /// Arithmetic mean over `points`, computed in degrees.
    pub fn mean(points: impl IntoIterator<Item = LatLon>) -> Option<LatLon> {
        let mut sum_lat = 0.0;
        let mut sum_lon = 0.0;
        let mut count = 0usize;
        for p in points {
            sum_lat += p.lat;
            sum_lon += p.lon;
            count += 1;
        }
        if count == 0 {
            return None;
        }
        let n = count as f64;
        Some(LatLon::new(sum_lat / n, sum_lon / n))
    }
}

pub fn clamp_latitude(lat: f64) -> f64 {
    lat.clamp(-MAX_CENTER_LATITUDE, MAX_CENTER_LATITUDE)
}

/// Wraps a longitude into `(-180, 180]`.
pub fn wrap_longitude(lon: f64) -> f64 {
    let wrapped = (lon + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped <= -180.0 { 180.0 } else { wrapped }
}
