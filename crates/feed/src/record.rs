use chrono::{DateTime, NaiveDateTime, Utc};
use foundation::LatLon;
use serde::{Deserialize, Serialize};

pub const ACTIVE_STATUS: &str = "active";
pub const UNKNOWN_SENSE: &str = "unknown";
pub const UNKNOWN_ELAPSED: &str = "unknown";

pub const UNKNOWN_ROAD: &str = "Unknown road";
pub const UNKNOWN_REGION: &str = "Unknown region";
pub const UNKNOWN_PROVINCE: &str = "Unknown province";
pub const UNKNOWN_MUNICIPALITY: &str = "Unknown municipality";
pub const DEFAULT_CAUSE: &str = "V16 beacon";

const NAIVE_TIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// One emergency beacon as published by the provider.
///
/// Immutable once decoded; a refresh replaces the whole list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeaconRecord {
    pub id: String,
    pub situation_id: String,
    pub status: String,
    pub lat: f64,
    pub lon: f64,
    pub road_name: String,
    /// Kilometer marker along the road.
    pub km: f64,
    /// Raw direction token, `"unknown"` when absent.
    pub sense: String,
    pub orientation: String,
    pub region: String,
    pub province: String,
    pub municipality: String,
    pub cause: String,
    pub subcause: String,
    pub road_type: String,
    /// Provider timestamp as received; see [`BeaconRecord::activated_at`].
    pub activation_time: String,
}

impl BeaconRecord {
    pub fn position(&self) -> LatLon {
        LatLon::new(self.lat, self.lon)
    }

    pub fn is_active(&self) -> bool {
        self.status.trim().eq_ignore_ascii_case(ACTIVE_STATUS)
    }

    pub fn sense_label(&self) -> &'static str {
        sense_label(&self.sense)
    }

    /// RFC 3339 first, then naive ISO-like forms read as UTC.
    pub fn activated_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.activation_time.trim();
        if raw.is_empty() {
            return None;
        }
        if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
            return Some(t.with_timezone(&Utc));
        }
        NAIVE_TIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            .map(|t| t.and_utc())
    }

    /// Human-readable time since activation, or `"unknown"` when the
    /// timestamp does not parse or lies in the future.
    pub fn elapsed_label(&self, now: DateTime<Utc>) -> String {
        let Some(at) = self.activated_at() else {
            return UNKNOWN_ELAPSED.to_string();
        };
        let secs = (now - at).num_seconds();
        if secs < 0 {
            return UNKNOWN_ELAPSED.to_string();
        }
        let minutes = secs / 60;
        let hours = minutes / 60;
        let days = hours / 24;
        if hours == 0 {
            format!("{minutes} min")
        } else if days == 0 {
            format!("{hours} h {} min", minutes % 60)
        } else {
            format!("{days} d {} h", hours % 24)
        }
    }
}

/// Maps a direction token to a display label (case-insensitive).
pub fn sense_label(token: &str) -> &'static str {
    match token.trim().to_ascii_uppercase().as_str() {
        "POSITIVE" => "Increasing kilometers",
        "NEGATIVE" => "Decreasing kilometers",
        "BOTH" => "Both directions",
        _ => "Unknown direction",
    }
}
