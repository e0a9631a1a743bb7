//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! `config.rs` reads the environment and falls back to these values.

use std::path::PathBuf;

/// Default Ollama-compatible stage service URL
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Default model used by every analysis stage
pub const DEFAULT_OLLAMA_MODEL: &str = "tinyllama";

/// Upper bound for a single stage invocation (seconds)
pub const DEFAULT_STAGE_TIMEOUT: u64 = 120;

/// Ledger liveness probe bound (seconds)
pub const DEFAULT_LEDGER_PROBE_TIMEOUT: u64 = 5;

/// Ledger write bound (seconds)
pub const DEFAULT_LEDGER_WRITE_TIMEOUT: u64 = 30;

/// Local fallback write bound (seconds)
pub const DEFAULT_LOCAL_WRITE_TIMEOUT: u64 = 10;

/// Marker a ledger response must contain for a write to count as accepted
pub const DEFAULT_LEDGER_ACCEPT_MARKER: &str = "status:200";

/// Default Fabric channel / chaincode
pub const DEFAULT_FABRIC_CHANNEL: &str = "mychannel";
pub const DEFAULT_FABRIC_CHAINCODE: &str = "security_logs";
pub const DEFAULT_FABRIC_ORDERER: &str = "localhost:7050";
pub const DEFAULT_FABRIC_ORDERER_HOST: &str = "orderer.example.com";

/// Max characters of log / analysis / remediation kept in a recorded event
pub const EXCERPT_MAX_CHARS: usize = 500;

/// Characters of narrative tail returned as the analysis summary
pub const SUMMARY_MAX_CHARS: usize = 800;

/// Max actions rendered to callers
pub const MAX_RENDERED_ACTIONS: usize = 4;

/// App name (used for the data directory)
pub const APP_NAME: &str = "log-triage";

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default directory for the local fallback store
pub fn default_local_events_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
        .join("security_events")
}

/// Default path for the JSONL file ledger
pub fn default_ledger_file() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
        .join("ledger.jsonl")
}
