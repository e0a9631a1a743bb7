//! Local Fallback Store
//!
//! One JSON file per security event, named by `event_id`.
//! Files are created exclusively and never rewritten, so concurrent
//! writers with distinct ids never conflict.

use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use super::event::{excerpt, SecurityEvent};
use crate::constants::EXCERPT_MAX_CHARS;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Event file extension
const EVENT_EXT: &str = "json";

/// Total events written to the local store in this process
static EVENTS_STORED: AtomicU64 = AtomicU64::new(0);

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("invalid event id: {0:?}")]
    InvalidId(String),

    #[error("local store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("local store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// ============================================================================
// RECORD FORMAT
// ============================================================================

/// On-disk shape of a locally stored event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalRecord {
    pub event_id: String,
    pub timestamp: String,
    pub log: String,
    pub analysis: String,
    pub remediation: String,
    pub criticality: String,
}

impl From<&SecurityEvent> for LocalRecord {
    fn from(event: &SecurityEvent) -> Self {
        Self {
            event_id: event.event_id.clone(),
            timestamp: event.timestamp.clone(),
            log: excerpt(&event.log_excerpt, EXCERPT_MAX_CHARS),
            analysis: excerpt(&event.analysis_excerpt, EXCERPT_MAX_CHARS),
            remediation: excerpt(&event.remediation_excerpt, EXCERPT_MAX_CHARS),
            criticality: event.criticality.as_str().to_string(),
        }
    }
}

// ============================================================================
// STORE
// ============================================================================

/// Directory of event files
#[derive(Debug, Clone)]
pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File path for an event id. Ids that could escape the directory are rejected.
    pub fn path_for(&self, event_id: &str) -> Result<PathBuf, StoreError> {
        let valid = !event_id.is_empty()
            && event_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StoreError::InvalidId(event_id.to_string()));
        }
        Ok(self.dir.join(format!("{}.{}", event_id, EVENT_EXT)))
    }

    /// Write an event. Fails if a file for this id already exists.
    pub fn write(&self, event: &SecurityEvent) -> Result<PathBuf, StoreError> {
        let path = self.path_for(&event.event_id)?;
        fs::create_dir_all(&self.dir)?;

        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)?;

        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &LocalRecord::from(event))?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        // Flush for durability
        writer.get_ref().sync_all()?;

        EVENTS_STORED.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(event_id = %event.event_id, path = %path.display(), "Stored event locally");
        Ok(path)
    }

    /// Read a stored event back
    pub fn load(&self, event_id: &str) -> Result<LocalRecord, StoreError> {
        let path = self.path_for(event_id)?;
        let data = fs::read(path)?;
        Ok(serde_json::from_slice(&data)?)
    }

    /// Whether a file exists for this id
    pub fn contains(&self, event_id: &str) -> bool {
        self.path_for(event_id)
            .map(|p| p.exists())
            .unwrap_or(false)
    }
}

/// Total events written locally in this process
pub fn events_stored() -> u64 {
    EVENTS_STORED.load(Ordering::SeqCst)
}

// ============================================================================
// TESTS
// ============================================================================
