//! First-vertex extraction from the provider's embedded line geometry.
//!
//! The geometry arrives as text shaped like
//! `{"type":"LineString","coordinates":[[lon,lat],...]}` or a bare nested
//! array. Only the first `[lon, lat]` pair is used as the beacon position.

use foundation::LatLon;
use serde_json::Value;

use crate::error::GeometryError;

/// Locates the first `[[` (or, failing that, `[`), reads up to the next `]`
/// and parses `lon,lat` with `.` as the decimal separator. Extra values
/// after the first two (altitude) are ignored.
pub fn first_coordinate(geometry: &str) -> Result<LatLon, GeometryError> {
    let start = match geometry.find("[[") {
        Some(i) => i + 2,
        None => geometry.find('[').ok_or(GeometryError::NoBracket)? + 1,
    };
    let rest = &geometry[start..];
    let end = rest.find(']').ok_or(GeometryError::Unterminated)?;

    let parts: Vec<&str> = rest[..end]
        .split(',')
        .map(|p| p.trim_matches(|c: char| c == '[' || c.is_whitespace()))
        .collect();
    if parts.len() < 2 {
        return Err(GeometryError::WrongArity(parts.len()));
    }

    let lon = parse_coordinate(parts[0])?;
    let lat = parse_coordinate(parts[1])?;
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return Err(GeometryError::OutOfRange);
    }
    Ok(LatLon::new(lat, lon))
}

/// Accepts the geometry either as an embedded string or as inline JSON.
pub fn first_coordinate_in(value: Option<&Value>) -> Result<LatLon, GeometryError> {
    match value {
        None | Some(Value::Null) => Err(GeometryError::Missing),
        Some(Value::String(text)) if text.trim().is_empty() => Err(GeometryError::Missing),
        Some(Value::String(text)) => first_coordinate(text),
        Some(other) => first_coordinate(&other.to_string()),
    }
}

fn parse_coordinate(raw: &str) -> Result<f64, GeometryError> {
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        Ok(_) => Err(GeometryError::OutOfRange),
        Err(_) => Err(GeometryError::Number(raw.to_string())),
    }
}
