//! Recording Gateway
//!
//! Decides where a security event is durably recorded:
//!
//! ```text
//! ProbeLedger --available--> WriteLedger --accepted--> Done(success, ledger)
//!      |                          |
//!      +--unavailable-------------+--failed--> WriteLocal --ok--> Done(success, local)
//!                                                  |
//!                                                  +--failed--> Done(error, none)
//! ```
//!
//! Every external step is time-bounded. `record` never fails.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;

use super::types::{Backend, RecordStatus, RecordingResult};
use crate::config::Config;
use crate::logic::ledger::{self, LedgerClient, LedgerError};
use crate::logic::telemetry::stats;
use crate::logic::telemetry::{LocalStore, SecurityEvent, StoreError};

// ============================================================================
// STATE MACHINE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    ProbeLedger,
    WriteLedger,
    WriteLocal,
    Done(RecordStatus, Backend),
}

#[derive(Debug, thiserror::Error)]
enum LocalWriteError {
    #[error("local write timed out after {0:?}")]
    Timeout(Duration),

    #[error("local write task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

// ============================================================================
// GATEWAY
// ============================================================================

pub struct RecordingGateway {
    ledger: Arc<dyn LedgerClient>,
    store: LocalStore,
    probe_timeout: Duration,
    write_timeout: Duration,
    local_timeout: Duration,
}

impl RecordingGateway {
    /// Gateway with the default bounds (5s probe, 30s ledger write, 10s local write)
    pub fn new(ledger: Arc<dyn LedgerClient>, store: LocalStore) -> Self {
        use crate::constants::{
            DEFAULT_LEDGER_PROBE_TIMEOUT, DEFAULT_LEDGER_WRITE_TIMEOUT, DEFAULT_LOCAL_WRITE_TIMEOUT,
        };

        Self {
            ledger,
            store,
            probe_timeout: Duration::from_secs(DEFAULT_LEDGER_PROBE_TIMEOUT),
            write_timeout: Duration::from_secs(DEFAULT_LEDGER_WRITE_TIMEOUT),
            local_timeout: Duration::from_secs(DEFAULT_LOCAL_WRITE_TIMEOUT),
        }
    }

    pub fn with_timeouts(mut self, probe: Duration, write: Duration, local: Duration) -> Self {
        self.probe_timeout = probe;
        self.write_timeout = write;
        self.local_timeout = local;
        self
    }

    /// Ledger client, local store and bounds from configuration
    pub fn from_config(config: &Config) -> Self {
        let ledger = ledger::build_client(&config.ledger);
        let store = LocalStore::new(config.local_events_dir.clone());
        tracing::info!(
            backend = ledger.name(),
            local_dir = %store.dir().display(),
            "Recording gateway ready"
        );

        Self::new(ledger, store).with_timeouts(
            Duration::from_secs(config.ledger.probe_timeout_secs),
            Duration::from_secs(config.ledger.write_timeout_secs),
            Duration::from_secs(config.local_write_timeout_secs),
        )
    }

    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    /// Record one event. Always reaches a terminal state.
    pub async fn record(&self, event: &SecurityEvent) -> RecordingResult {
        let mut step = Step::ProbeLedger;

        loop {
            step = match step {
                Step::ProbeLedger => {
                    if self.probe_ledger().await {
                        Step::WriteLedger
                    } else {
                        tracing::warn!(
                            event_id = %event.event_id,
                            backend = self.ledger.name(),
                            "Ledger unavailable, falling back to local store"
                        );
                        Step::WriteLocal
                    }
                }
                Step::WriteLedger => {
                    if self.write_ledger(event).await {
                        stats::ledger_recorded();
                        Step::Done(RecordStatus::Success, Backend::Ledger)
                    } else {
                        Step::WriteLocal
                    }
                }
                Step::WriteLocal => match self.write_local(event).await {
                    Ok(path) => {
                        tracing::info!(
                            event_id = %event.event_id,
                            path = %path.display(),
                            "Event recorded locally"
                        );
                        Step::Done(RecordStatus::Success, Backend::Local)
                    }
                    Err(e) => {
                        tracing::error!(event_id = %event.event_id, "Local recording failed: {}", e);
                        stats::recording_failed();
                        Step::Done(RecordStatus::Error, Backend::None)
                    }
                },
                Step::Done(status, backend) => {
                    return RecordingResult {
                        status,
                        event_id: event.event_id.clone(),
                        backend,
                    };
                }
            };
        }
    }

    async fn probe_ledger(&self) -> bool {
        match timeout(self.probe_timeout, self.ledger.probe()).await {
            Ok(available) => available,
            Err(_) => {
                tracing::warn!(
                    backend = self.ledger.name(),
                    "Ledger probe timed out after {:?}",
                    self.probe_timeout
                );
                false
            }
        }
    }

    async fn write_ledger(&self, event: &SecurityEvent) -> bool {
        let outcome = timeout(self.write_timeout, self.ledger.write(event))
            .await
            .unwrap_or_else(|_| Err(LedgerError::Timeout(self.write_timeout)));

        match outcome {
            Ok(write) if write.accepted => {
                tracing::info!(
                    event_id = %event.event_id,
                    backend = self.ledger.name(),
                    "Event recorded on ledger"
                );
                true
            }
            Ok(write) => {
                tracing::warn!(
                    event_id = %event.event_id,
                    output_len = write.raw_output.len(),
                    "Ledger did not acknowledge event, falling back to local store"
                );
                false
            }
            Err(e) => {
                tracing::warn!(event_id = %event.event_id, "Ledger write failed: {}", e);
                false
            }
        }
    }

    /// Blocking file write on the blocking pool, bounded by `local_timeout`.
    async fn write_local(&self, event: &SecurityEvent) -> Result<PathBuf, LocalWriteError> {
        let store = self.store.clone();
        let event_id = event.event_id.clone();
        let event = event.clone();
        let task = tokio::task::spawn_blocking(move || store.write(&event));

        match timeout(self.local_timeout, task).await {
            Ok(joined) => Ok(joined??),
            Err(_) => self.local_write_after_timeout(&event_id),
        }
    }

    /// A write that outlived its bound may still have landed. A file on disk
    /// is reported as stored; a write finishing after this check is not.
    fn local_write_after_timeout(&self, event_id: &str) -> Result<PathBuf, LocalWriteError> {
        if self.store.contains(event_id) {
            tracing::warn!(
                event_id,
                "Local write exceeded {:?} but the event is on disk",
                self.local_timeout
            );
            return Ok(self.store.path_for(event_id)?);
        }
        Err(LocalWriteError::Timeout(self.local_timeout))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::ledger::{LedgerError, LedgerWrite};
    use crate::logic::threat::{Criticality, LogRecord, Verdict};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockLedger {
        available: bool,
        probe_delay: Duration,
        write_delay: Duration,
        accept: bool,
        writes: AtomicUsize,
    }

    impl MockLedger {
        fn new(available: bool, accept: bool) -> Self {
            Self {
                available,
                probe_delay: Duration::ZERO,
                write_delay: Duration::ZERO,
                accept,
                writes: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl LedgerClient for MockLedger {
        fn name(&self) -> &'static str {
            "mock"
        }

        async fn probe(&self) -> bool {
            tokio::time::sleep(self.probe_delay).await;
            self.available
        }

        async fn write(&self, _event: &SecurityEvent) -> Result<LedgerWrite, LedgerError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.write_delay).await;
            Ok(LedgerWrite {
                accepted: self.accept,
                raw_output: if self.accept { "status:200".into() } else { "endorsement failure".into() },
            })
        }
    }

    struct FailingLedger;

    #[async_trait]
    impl LedgerClient for FailingLedger {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn probe(&self) -> bool {
            true
        }

        async fn write(&self, _event: &SecurityEvent) -> Result<LedgerWrite, LedgerError> {
            Err(LedgerError::Io(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "peer died")))
        }
    }

    fn event() -> SecurityEvent {
        let verdict = Verdict {
            is_anomaly: true,
            criticality: Criticality::Critique,
            action_prioritaire: "Bloquer l'IP".to_string(),
            justification: "trafic anormal".to_string(),
            actions: vec!["Bloquer l'IP".to_string()],
            confidence: 0.96,
        };
        SecurityEvent::new(&LogRecord::new("Failed password for root"), "Anomalie : oui", &verdict)
    }

    fn gateway(ledger: Arc<dyn LedgerClient>, dir: &std::path::Path) -> RecordingGateway {
        RecordingGateway::new(ledger, LocalStore::new(dir)).with_timeouts(
            Duration::from_millis(200),
            Duration::from_secs(1),
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn test_unavailable_ledger_falls_back_locally() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = Arc::new(MockLedger::new(false, true));
        let gw = gateway(ledger.clone(), dir.path());
        let ev = event();

        let result = gw.record(&ev).await;
        assert_eq!(result.status, RecordStatus::Success);
        assert_eq!(result.backend, Backend::Local);
        assert_eq!(result.event_id, ev.event_id);
        assert!(gw.store().contains(&ev.event_id));
        assert_eq!(ledger.writes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_slow_probe_counts_as_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let mut mock = MockLedger::new(true, true);
        mock.probe_delay = Duration::from_secs(10);
        let gw = gateway(Arc::new(mock), dir.path());

        let result = gw.record(&event()).await;
        assert_eq!(result.backend, Backend::Local);
        assert!(result.is_success());
    }

    #[tokio::test]
    async fn test_accepted_write_stays_on_ledger() {
        let dir = tempfile::tempdir().unwrap();
        let gw = gateway(Arc::new(MockLedger::new(true, true)), dir.path());
        let ev = event();

        let result = gw.record(&ev).await;
        assert_eq!(result.status, RecordStatus::Success);
        assert_eq!(result.backend, Backend::Ledger);
        // Written exactly once: nothing local
        assert!(!gw.store().contains(&ev.event_id));
    }

    #[tokio::test]
    async fn test_unacknowledged_write_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = Arc::new(MockLedger::new(true, false));
        let gw = gateway(ledger.clone(), dir.path());
        let ev = event();

        let result = gw.record(&ev).await;
        assert_eq!(result.backend, Backend::Local);
        assert_eq!(ledger.writes.load(Ordering::SeqCst), 1);
        assert!(gw.store().contains(&ev.event_id));
    }

    #[tokio::test]
    async fn test_ledger_error_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let gw = gateway(Arc::new(FailingLedger), dir.path());

        let result = gw.record(&event()).await;
        assert_eq!(result.backend, Backend::Local);
        assert!(result.is_success());
    }

    #[tokio::test]
    async fn test_local_failure_is_the_only_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocked");
        std::fs::write(&blocker, b"x").unwrap();
        let gw = gateway(Arc::new(MockLedger::new(false, false)), &blocker);

        let result = gw.record(&event()).await;
        assert_eq!(result.status, RecordStatus::Error);
        assert_eq!(result.backend, Backend::None);
    }

    #[tokio::test]
    async fn test_slow_ledger_write_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let mut mock = MockLedger::new(true, true);
        mock.write_delay = Duration::from_secs(10);
        let ledger = Arc::new(mock);
        let gw = gateway(ledger.clone(), dir.path());
        let ev = event();

        let result = gw.record(&ev).await;
        assert_eq!(result.status, RecordStatus::Success);
        assert_eq!(result.backend, Backend::Local);
        assert_eq!(ledger.writes.load(Ordering::SeqCst), 1);
        assert!(gw.store().contains(&ev.event_id));
    }

    #[test]
    fn test_local_timeout_with_file_on_disk_is_stored() {
        let dir = tempfile::tempdir().unwrap();
        let gw = gateway(Arc::new(MockLedger::new(false, false)), dir.path());
        let ev = event();
        // The detached write landed before the bound was checked
        let written = gw.store().write(&ev).unwrap();

        let path = gw.local_write_after_timeout(&ev.event_id).unwrap();
        assert_eq!(path, written);
    }

    #[test]
    fn test_local_timeout_without_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let gw = gateway(Arc::new(MockLedger::new(false, false)), dir.path());
        let ev = event();

        let err = gw.local_write_after_timeout(&ev.event_id).unwrap_err();
        assert!(matches!(err, LocalWriteError::Timeout(d) if d == Duration::from_secs(5)));
        assert!(!gw.store().contains(&ev.event_id));
    }
}
