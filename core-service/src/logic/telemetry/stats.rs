//! Process-wide triage counters
//!
//! Append-only atomic increments, safe from concurrent requests.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use super::local_store;

static ANALYSES_RUN: AtomicU64 = AtomicU64::new(0);
static DEGRADED_VERDICTS: AtomicU64 = AtomicU64::new(0);
static LEDGER_RECORDS: AtomicU64 = AtomicU64::new(0);
static RECORDING_FAILURES: AtomicU64 = AtomicU64::new(0);

/// Snapshot of the counters
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct TriageStats {
    pub analyses_run: u64,
    pub degraded_verdicts: u64,
    pub ledger_records: u64,
    pub local_records: u64,
    pub recording_failures: u64,
}

pub fn analysis_completed(degraded: bool) {
    ANALYSES_RUN.fetch_add(1, Ordering::SeqCst);
    if degraded {
        DEGRADED_VERDICTS.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn ledger_recorded() {
    LEDGER_RECORDS.fetch_add(1, Ordering::SeqCst);
}

pub fn recording_failed() {
    RECORDING_FAILURES.fetch_add(1, Ordering::SeqCst);
}

pub fn snapshot() -> TriageStats {
    TriageStats {
        analyses_run: ANALYSES_RUN.load(Ordering::SeqCst),
        degraded_verdicts: DEGRADED_VERDICTS.load(Ordering::SeqCst),
        ledger_records: LEDGER_RECORDS.load(Ordering::SeqCst),
        local_records: local_store::events_stored(),
        recording_failures: RECORDING_FAILURES.load(Ordering::SeqCst),
    }
}
