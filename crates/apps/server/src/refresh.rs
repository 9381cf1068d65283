use std::fmt;
use std::time::Duration;

use feed::{DecodeError, RefreshOutcome};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::upstream::UpstreamError;
use crate::AppState;

#[derive(Debug)]
pub enum RefreshError {
    /// Another refresh holds the gate.
    InFlight,
    /// No upstream URL configured.
    Disabled,
    Upstream(UpstreamError),
    Decode(DecodeError),
}

impl fmt::Display for RefreshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefreshError::InFlight => write!(f, "a refresh is already in flight"),
            RefreshError::Disabled => write!(f, "no upstream configured"),
            RefreshError::Upstream(e) => write!(f, "upstream fetch failed: {e}"),
            RefreshError::Decode(e) => write!(f, "payload rejected: {e}"),
        }
    }
}

impl std::error::Error for RefreshError {}

/// Fetch once and swap the stored list. At most one refresh runs at a time;
/// overlapping callers are rejected rather than queued.
pub async fn refresh_once(state: &AppState) -> Result<RefreshOutcome, RefreshError> {
    let Some(upstream) = state.upstream.as_ref() else {
        return Err(RefreshError::Disabled);
    };
    let Some(_guard) = state.gate.try_begin() else {
        state.store.write().record_rejected();
        return Err(RefreshError::InFlight);
    };

    let raw = match upstream.fetch().await {
        Ok(raw) => raw,
        Err(err) => {
            warn!(url = upstream.url(), "beacon fetch failed: {err}");
            state.store.write().record_transport_failure(err.to_string());
            return Err(RefreshError::Upstream(err));
        }
    };

    let outcome = state
        .store
        .write()
        .apply(&raw)
        .map_err(RefreshError::Decode)?;
    match outcome {
        RefreshOutcome::Replaced { count, skipped } => {
            info!(count, skipped, bytes = raw.len(), "beacon list replaced")
        }
        RefreshOutcome::Unchanged => debug!("beacon payload unchanged"),
    }
    Ok(outcome)
}

pub async fn poll_forever(state: AppState, every: Duration) {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        ticker.tick().await;
        if let Err(RefreshError::InFlight) = refresh_once(&state).await {
            debug!("poll tick skipped, refresh in flight");
        }
    }
}
