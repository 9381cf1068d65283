use serde::Serialize;

use crate::decode::decode_report;
use crate::error::DecodeError;
use crate::record::BeaconRecord;

/// What a successful [`BeaconStore::apply`] did.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The list was swapped wholesale.
    Replaced { count: usize, skipped: usize },
    /// Payload identical to the last applied one; nothing decoded.
    Unchanged,
}

/// Running refresh counters, exposed to the calling layer as-is.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct RefreshStats {
    pub succeeded: u64,
    pub unchanged: u64,
    pub failed: u64,
    pub rejected_in_flight: u64,
    pub skipped_records: u64,
    pub total: usize,
    pub active: usize,
}

/// Current beacon list plus its refresh bookkeeping.
///
/// Failures never touch the list: a bad payload or a transport error leaves
/// the last good batch in place.
#[derive(Debug, Default)]
pub struct BeaconStore {
    records: Vec<BeaconRecord>,
    generation: u64,
    digest: Option<String>,
    last_error: Option<String>,
    stats: RefreshStats,
}

pub fn payload_digest(raw: &[u8]) -> String {
    blake3::hash(raw).to_hex().to_string()
}

impl BeaconStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[BeaconRecord] {
        &self.records
    }

    /// Bumped on every replacement; 0 until the first successful refresh.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn stats(&self) -> RefreshStats {
        self.stats
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn apply(&mut self, raw: &[u8]) -> Result<RefreshOutcome, DecodeError> {
        let digest = payload_digest(raw);
        if self.digest.as_deref() == Some(digest.as_str()) {
            self.stats.unchanged += 1;
            self.last_error = None;
            return Ok(RefreshOutcome::Unchanged);
        }

        let report = match decode_report(raw) {
            Ok(report) => report,
            Err(err) => {
                tracing::warn!(
                    stage = err.stage(),
                    error = %err,
                    retained = self.records.len(),
                    "beacon refresh failed; keeping previous list"
                );
                self.stats.failed += 1;
                self.last_error = Some(err.to_string());
                return Err(err);
            }
        };

        let count = report.beacons.len();
        let skipped = report.skipped.len();
        self.records = report.beacons;
        self.generation += 1;
        self.digest = Some(digest);
        self.last_error = None;
        self.stats.succeeded += 1;
        self.stats.skipped_records += skipped as u64;
        self.stats.total = count;
        self.stats.active = self.records.iter().filter(|b| b.is_active()).count();
        Ok(RefreshOutcome::Replaced { count, skipped })
    }

    /// Counts a fetch that never produced a payload.
    pub fn record_transport_failure(&mut self, message: impl Into<String>) {
        self.stats.failed += 1;
        self.last_error = Some(message.into());
    }

    /// Counts a refresh turned away because another one was running.
    pub fn record_rejected(&mut self) {
        self.stats.rejected_in_flight += 1;
    }
}
