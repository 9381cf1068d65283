use serde_json::Value;

use crate::codec::deobfuscate;
use crate::error::{DecodeError, RecordError, SkippedRecord};
use crate::geometry::first_coordinate_in;
use crate::record::{
    ACTIVE_STATUS, BeaconRecord, DEFAULT_CAUSE, UNKNOWN_MUNICIPALITY, UNKNOWN_PROVINCE,
    UNKNOWN_REGION, UNKNOWN_ROAD, UNKNOWN_SENSE,
};
use crate::wire::{SituationRecord, SituationsPayload};

/// Outcome of one successful decode, including the records that were dropped.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DecodeReport {
    pub beacons: Vec<BeaconRecord>,
    pub skipped: Vec<SkippedRecord>,
}

/// Raw provider bytes to beacon records.
pub fn decode(raw: &[u8]) -> Result<Vec<BeaconRecord>, DecodeError> {
    decode_report(raw).map(|report| report.beacons)
}

pub fn decode_report(raw: &[u8]) -> Result<DecodeReport, DecodeError> {
    let text = deobfuscate(raw)?;
    parse_situations(&text)
}

/// Parses already deobfuscated JSON text.
///
/// A `null` or absent record list is an empty batch. Elements that are not
/// situation objects, or whose geometry cannot be read, are dropped and
/// reported; the rest of the batch survives.
pub fn parse_situations(text: &str) -> Result<DecodeReport, DecodeError> {
    let payload: SituationsPayload = serde_json::from_str(text)
        .map_err(|e| DecodeError::MalformedStructure(e.to_string()))?;

    let mut report = DecodeReport::default();
    for value in payload.situations_records.unwrap_or_default() {
        match beacon_from_value(value) {
            Ok(beacon) => report.beacons.push(beacon),
            Err(skipped) => {
                tracing::debug!(
                    id = skipped.id.as_deref().unwrap_or("-"),
                    error = %skipped.error,
                    "dropping situation record"
                );
                report.skipped.push(skipped);
            }
        }
    }
    Ok(report)
}

fn beacon_from_value(value: Value) -> Result<BeaconRecord, SkippedRecord> {
    // Field types are lenient, so only non-object elements fail here.
    let situation: SituationRecord =
        serde_json::from_value(value).map_err(|e| SkippedRecord {
            id: None,
            error: RecordError::Shape(e.to_string()),
        })?;
    beacon_from_situation(situation)
}

fn beacon_from_situation(s: SituationRecord) -> Result<BeaconRecord, SkippedRecord> {
    let position = first_coordinate_in(s.geometry.as_ref()).map_err(|error| SkippedRecord {
        id: s.id.clone().or_else(|| s.situation_id.clone()),
        error: error.into(),
    })?;

    Ok(BeaconRecord {
        id: s.id.unwrap_or_default(),
        situation_id: s.situation_id.unwrap_or_default(),
        status: s.status.unwrap_or_else(|| ACTIVE_STATUS.to_string()),
        lat: position.lat,
        lon: position.lon,
        road_name: s.road_name.unwrap_or_else(|| UNKNOWN_ROAD.to_string()),
        km: s.km.unwrap_or(0.0),
        sense: s.sense.unwrap_or_else(|| UNKNOWN_SENSE.to_string()),
        orientation: s.orientation.unwrap_or_default(),
        region: s
            .autonomous_community
            .unwrap_or_else(|| UNKNOWN_REGION.to_string()),
        province: s.province.unwrap_or_else(|| UNKNOWN_PROVINCE.to_string()),
        municipality: s
            .municipality
            .unwrap_or_else(|| UNKNOWN_MUNICIPALITY.to_string()),
        cause: s.cause.unwrap_or_else(|| DEFAULT_CAUSE.to_string()),
        subcause: s.subcause.unwrap_or_default(),
        road_type: s.road_type.unwrap_or_default(),
        activation_time: s.activation_time.unwrap_or_default(),
    })
}
