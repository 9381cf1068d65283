use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use feed::{BeaconRecord, BeaconStore, RefreshOutcome};
use foundation::LatLon;
use layers::ClusterEngine;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use viewport::{ViewportState, DEFAULT_VIEWPORT_SIZE_PX};

use crate::refresh::{refresh_once, RefreshError};
use crate::AppState;

/// Largest accepted viewport edge, in pixels.
const MAX_VIEWPORT_EDGE_PX: u32 = 8192;

type ApiResult = Result<Json<Value>, (StatusCode, Json<Value>)>;

fn api_error(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "error": message.into() })))
}

#[derive(Debug, Default, Deserialize)]
pub struct GroupsQuery {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub zoom: Option<i32>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// A record plus the labels a popup shows.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BeaconView<'a> {
    #[serde(flatten)]
    record: &'a BeaconRecord,
    active: bool,
    sense_label: &'static str,
    elapsed: String,
}

impl<'a> BeaconView<'a> {
    fn new(record: &'a BeaconRecord, now: DateTime<Utc>) -> Self {
        Self {
            record,
            active: record.is_active(),
            sense_label: record.sense_label(),
            elapsed: record.elapsed_label(now),
        }
    }
}

pub async fn healthz() -> &'static str {
    "ok"
}

pub async fn get_beacons(State(state): State<AppState>) -> Json<Value> {
    let store = state.store.read();
    Json(beacons_body(&store, Utc::now()))
}

pub async fn get_groups(
    State(state): State<AppState>,
    Query(query): Query<GroupsQuery>,
) -> ApiResult {
    let viewport = viewport_for(&query, &state)
        .map_err(|msg| api_error(StatusCode::BAD_REQUEST, msg))?;
    let store = state.store.read();
    Ok(Json(groups_body(&store, &state.engine, &viewport)))
}

pub async fn post_refresh(State(state): State<AppState>) -> ApiResult {
    match refresh_once(&state).await {
        Ok(outcome) => {
            let generation = state.store.read().generation();
            let body = match outcome {
                RefreshOutcome::Replaced { count, skipped } => json!({
                    "outcome": "replaced",
                    "count": count,
                    "skipped": skipped,
                    "generation": generation,
                }),
                RefreshOutcome::Unchanged => json!({
                    "outcome": "unchanged",
                    "generation": generation,
                }),
            };
            Ok(Json(body))
        }
        Err(err) => Err(api_error(status_for(&err), err.to_string())),
    }
}

pub async fn get_stats(State(state): State<AppState>) -> Json<Value> {
    let store = state.store.read();
    Json(json!({
        "stats": store.stats(),
        "generation": store.generation(),
        "lastError": store.last_error(),
        "refreshing": state.gate.is_busy(),
        "upstream": state.upstream.as_ref().map(|u| u.url().to_string()),
    }))
}

fn status_for(err: &RefreshError) -> StatusCode {
    match err {
        RefreshError::InFlight => StatusCode::CONFLICT,
        RefreshError::Disabled => StatusCode::SERVICE_UNAVAILABLE,
        RefreshError::Upstream(_) => StatusCode::BAD_GATEWAY,
        RefreshError::Decode(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

/// Build the viewport a `/api/groups` query describes. Missing fields fall
/// back to the service defaults; zoom and latitude are clamped.
pub fn viewport_for(query: &GroupsQuery, state: &AppState) -> Result<ViewportState, String> {
    let center = LatLon::new(
        query.lat.unwrap_or(state.default_center.lat),
        query.lon.unwrap_or(state.default_center.lon),
    );
    if !center.lat.is_finite() || !center.lon.is_finite() {
        return Err("lat and lon must be finite".to_string());
    }
    let size_px = [
        query.width.unwrap_or(DEFAULT_VIEWPORT_SIZE_PX[0]),
        query.height.unwrap_or(DEFAULT_VIEWPORT_SIZE_PX[1]),
    ];
    if size_px.iter().any(|&e| e == 0 || e > MAX_VIEWPORT_EDGE_PX) {
        return Err(format!(
            "width and height must be between 1 and {MAX_VIEWPORT_EDGE_PX}"
        ));
    }

    let mut viewport = ViewportState::new(state.viewport, state.default_center, state.default_zoom)
        .with_size(size_px);
    viewport.set_center(center.lat, center.lon, query.zoom);
    Ok(viewport)
}

fn beacons_body(store: &BeaconStore, now: DateTime<Utc>) -> Value {
    let beacons: Vec<BeaconView<'_>> = store
        .records()
        .iter()
        .map(|r| BeaconView::new(r, now))
        .collect();
    json!({
        "generation": store.generation(),
        "count": beacons.len(),
        "beacons": beacons,
    })
}

fn groups_body(store: &BeaconStore, engine: &ClusterEngine, viewport: &ViewportState) -> Value {
    let groups = engine.cluster(store.records(), viewport);
    let tiles = viewport.projection().visible_tiles(viewport.size_px());
    json!({
        "center": viewport.center(),
        "zoom": viewport.zoom(),
        "size": viewport.size_px(),
        "generation": store.generation(),
        "tiles": tiles,
        "groups": groups,
    })
}
