use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use foundation::LatLon;
use layers::ClusterConfig;
use viewport::ViewportConfig;

/// Service settings, read once at startup from `BEACON_*` environment
/// variables.
#[derive(Clone, Debug)]
pub struct ServiceConfig {
    pub addr: SocketAddr,
    /// Polling is disabled when unset.
    pub upstream_url: Option<String>,
    pub poll_every: Duration,
    pub http_timeout: Duration,
    pub viewport: ViewportConfig,
    pub clusters: ClusterConfig,
    pub default_center: LatLon,
    pub default_zoom: i32,
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let raw_addr = lookup("BEACON_ADDR").unwrap_or_else(|| "127.0.0.1:9200".to_string());
        let addr: SocketAddr = raw_addr
            .parse()
            .map_err(|e| format!("invalid BEACON_ADDR {raw_addr:?}: {e}"))?;

        let upstream_url = lookup("BEACON_UPSTREAM_URL")
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty());

        let viewport = ViewportConfig::new(
            parse_or(&lookup, "BEACON_TILE_SIZE", 256u32),
            parse_or(&lookup, "BEACON_MIN_ZOOM", 4u8),
            parse_or(&lookup, "BEACON_MAX_ZOOM", 18u8),
        );
        let defaults = ClusterConfig::default();
        let clusters = ClusterConfig {
            radius_px: parse_or(&lookup, "BEACON_CLUSTER_RADIUS_PX", defaults.radius_px),
            min_cluster_size: parse_or(
                &lookup,
                "BEACON_MIN_CLUSTER_SIZE",
                defaults.min_cluster_size,
            ),
            cluster_below_zoom: parse_or(
                &lookup,
                "BEACON_CLUSTER_MAX_ZOOM",
                defaults.cluster_below_zoom,
            ),
            visible_margin_px: parse_or(
                &lookup,
                "BEACON_VISIBLE_MARGIN_PX",
                defaults.visible_margin_px,
            ),
        };

        Ok(Self {
            addr,
            upstream_url,
            poll_every: Duration::from_secs(parse_or(&lookup, "BEACON_POLL_SECS", 60u64).max(1)),
            http_timeout: Duration::from_secs(
                parse_or(&lookup, "BEACON_HTTP_TIMEOUT_SECS", 20u64).max(1),
            ),
            viewport,
            clusters,
            default_center: LatLon::new(
                parse_or(&lookup, "BEACON_CENTER_LAT", 40.4168),
                parse_or(&lookup, "BEACON_CENTER_LON", -3.7038),
            ),
            default_zoom: parse_or(&lookup, "BEACON_ZOOM", 6),
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> T {
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
