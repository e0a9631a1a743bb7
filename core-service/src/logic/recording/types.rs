//! Recording outcome types

use serde::{Deserialize, Serialize};

/// Final status of a recording attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    Success,
    Error,
}

impl RecordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::Success => "success",
            RecordStatus::Error => "error",
        }
    }
}

/// Where the event ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Ledger,
    Local,
    None,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Ledger => "ledger",
            Backend::Local => "local",
            Backend::None => "none",
        }
    }
}

/// Returned to the caller, never persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordingResult {
    pub status: RecordStatus,
    pub event_id: String,
    pub backend: Backend,
}

impl RecordingResult {
    pub fn is_success(&self) -> bool {
        self.status == RecordStatus::Success
    }
}

impl std::fmt::Display for RecordingResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} via {} ({})",
            self.status.as_str(),
            self.backend.as_str(),
            self.event_id
        )
    }
}
