mod api;
mod config;
mod refresh;
mod upstream;

use std::sync::Arc;

use axum::http::Method;
use axum::routing::{get, post};
use axum::Router;
use feed::BeaconStore;
use foundation::LatLon;
use layers::ClusterEngine;
use parking_lot::RwLock;
use runtime::RefreshGate;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use viewport::ViewportConfig;

use crate::config::ServiceConfig;
use crate::upstream::UpstreamClient;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RwLock<BeaconStore>>,
    pub gate: RefreshGate,
    pub upstream: Option<Arc<UpstreamClient>>,
    pub engine: Arc<ClusterEngine>,
    pub viewport: ViewportConfig,
    pub default_center: LatLon,
    pub default_zoom: i32,
}

impl AppState {
    pub fn new(config: &ServiceConfig, upstream: Option<Arc<UpstreamClient>>) -> Self {
        Self {
            store: Arc::new(RwLock::new(BeaconStore::new())),
            gate: RefreshGate::new(),
            upstream,
            engine: Arc::new(ClusterEngine::new(config.clusters)),
            viewport: config.viewport,
            default_center: config.default_center.normalized(),
            default_zoom: config.default_zoom,
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(err) = run().await {
        error!("{err}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServiceConfig::from_env()?;

    let upstream = match config.upstream_url.as_deref() {
        Some(url) => Some(Arc::new(UpstreamClient::new(url, config.http_timeout)?)),
        None => {
            warn!("BEACON_UPSTREAM_URL not set, polling disabled");
            None
        }
    };

    let state = AppState::new(&config, upstream);
    if state.upstream.is_some() {
        tokio::spawn(refresh::poll_forever(state.clone(), config.poll_every));
    }

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    info!(
        addr = %config.addr,
        poll_secs = config.poll_every.as_secs(),
        "beacon server listening"
    );
    axum::serve(listener, router(state)).await?;
    Ok(())
}

fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST]);

    Router::new()
        .route("/healthz", get(api::healthz))
        .route("/api/beacons", get(api::get_beacons))
        .route("/api/groups", get(api::get_groups))
        .route("/api/refresh", post(api::post_refresh))
        .route("/api/stats", get(api::get_stats))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
