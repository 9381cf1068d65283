use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Top-level provider document.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SituationsPayload {
    /// Kept as raw values so one malformed element does not sink the batch.
    #[serde(default)]
    pub situations_records: Option<Vec<Value>>,
}

/// One situation as sent by the provider. Every field is optional; identifiers
/// and the kilometer marker may arrive as strings or numbers.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SituationRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub situation_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: Option<String>,
    #[serde(default)]
    pub geometry: Option<Value>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub road_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub km: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub sense: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub orientation: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub autonomous_community: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub province: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub municipality: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub cause: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub subcause: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub road_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub activation_time: Option<String>,
}

/// Strings and scalars become text; blank strings count as absent.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let text = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => return Ok(None),
    };
    let trimmed = text.trim();
    if trimmed.is_empty() {
        Ok(None)
    } else {
        Ok(Some(trimmed.to_string()))
    }
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite()))
}

#[cfg(test)]
mod tests {
    use super::{SituationRecord, SituationsPayload};

    #[test]
    fn numbers_and_strings_both_accepted() {
        let rec: SituationRecord =
            serde_json::from_str(r#"{"id": 17, "km": "12.5", "situationId": " s-1 "}"#).unwrap();
        assert_eq!(rec.id.as_deref(), Some("17"));
        assert_eq!(rec.km, Some(12.5));
        assert_eq!(rec.situation_id.as_deref(), Some("s-1"));
    }

    #[test]
    fn blank_and_null_are_absent() {
        let rec: SituationRecord =
            serde_json::from_str(r#"{"roadName": "  ", "province": null, "km": "n/a"}"#).unwrap();
        assert!(rec.road_name.is_none());
        assert!(rec.province.is_none());
        assert!(rec.km.is_none());
    }

    #[test]
    fn null_and_missing_list() {
        let p: SituationsPayload = serde_json::from_str(r#"{"situationsRecords": null}"#).unwrap();
        assert!(p.situations_records.is_none());
        let p: SituationsPayload = serde_json::from_str("{}").unwrap();
        assert!(p.situations_records.is_none());
    }
}
