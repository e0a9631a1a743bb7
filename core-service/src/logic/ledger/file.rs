//! Append-only JSONL ledger
//!
//! One event per line. Lines are only ever appended.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

use super::{LedgerClient, LedgerError, LedgerWrite};
use crate::logic::telemetry::SecurityEvent;

pub struct FileLedger {
    path: PathBuf,
}

impl FileLedger {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn ensure_parent(&self) -> std::io::Result<()> {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent).await,
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl LedgerClient for FileLedger {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn probe(&self) -> bool {
        if let Err(e) = self.ensure_parent().await {
            tracing::debug!("File ledger unavailable at {}: {}", self.path.display(), e);
            return false;
        }
        // An existing directory at the ledger path cannot be appended to
        !self.path.is_dir()
    }

    async fn write(&self, event: &SecurityEvent) -> Result<LedgerWrite, LedgerError> {
        self.ensure_parent().await?;

        let mut line = event.to_jsonl()?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        file.sync_data().await?;

        Ok(LedgerWrite {
            accepted: true,
            raw_output: format!("appended {}", event.event_id),
        })
    }
}
