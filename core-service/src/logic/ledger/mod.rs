//! Ledger Module - Tamper-evident event backends
//!
//! The recording gateway only talks to the `LedgerClient` trait.
//! Transports are picked from configuration:
//!
//! # Components
//! - `fabric.rs`: Hyperledger Fabric `peer` CLI (argument vector, no shell)
//! - `http.rs`: HTTP ledger gateway
//! - `file.rs`: Append-only JSONL file
//! - `DisabledLedger`: always unavailable, everything falls back locally

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::{LedgerBackend, LedgerConfig};
use crate::logic::telemetry::SecurityEvent;

pub mod fabric;
pub mod file;
pub mod http;

pub use fabric::FabricLedger;
pub use file::FileLedger;
pub use http::HttpLedger;

// ============================================================================
// TYPES
// ============================================================================

/// Outcome of a completed ledger write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerWrite {
    /// Backend explicitly acknowledged the event
    pub accepted: bool,
    /// Raw backend output, kept for diagnostics
    pub raw_output: String,
}

/// Ledger transport errors
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("ledger call timed out after {0:?}")]
    Timeout(Duration),

    #[error("ledger I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ledger HTTP error: {0}")]
    Http(String),

    #[error("ledger serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("ledger not configured: {0}")]
    NotConfigured(String),
}

// ============================================================================
// CLIENT TRAIT
// ============================================================================

/// Narrow interface to a ledger backend
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Short transport name for logs
    fn name(&self) -> &'static str;

    /// Liveness check. Errors mean "unavailable".
    async fn probe(&self) -> bool;

    /// Submit one event
    async fn write(&self, event: &SecurityEvent) -> Result<LedgerWrite, LedgerError>;
}

/// No ledger configured
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledLedger;

#[async_trait]
impl LedgerClient for DisabledLedger {
    fn name(&self) -> &'static str {
        "none"
    }

    async fn probe(&self) -> bool {
        false
    }

    async fn write(&self, _event: &SecurityEvent) -> Result<LedgerWrite, LedgerError> {
        Err(LedgerError::NotConfigured("ledger backend is disabled".to_string()))
    }
}

// ============================================================================
// FACTORY
// ============================================================================

/// Build the configured ledger client. Misconfiguration disables the ledger.
pub fn build_client(config: &LedgerConfig) -> Arc<dyn LedgerClient> {
    tracing::debug!(backend = config.backend.as_str(), "Building ledger client");
    match config.backend {
        LedgerBackend::Fabric => Arc::new(FabricLedger::new(
            config.fabric.clone(),
            config.accept_marker.clone(),
        )),
        LedgerBackend::Http => {
            let Some(url) = config.http_url.as_deref() else {
                tracing::warn!("LEDGER_BACKEND=http without LEDGER_HTTP_URL, ledger disabled");
                return Arc::new(DisabledLedger);
            };
            match HttpLedger::new(
                url,
                &config.accept_marker,
                Duration::from_secs(config.write_timeout_secs),
            ) {
                Ok(client) => Arc::new(client),
                Err(e) => {
                    tracing::warn!("HTTP ledger init failed: {} - ledger disabled", e);
                    Arc::new(DisabledLedger)
                }
            }
        }
        LedgerBackend::File => Arc::new(FileLedger::new(config.file_path.clone())),
        LedgerBackend::None => Arc::new(DisabledLedger),
    }
}
