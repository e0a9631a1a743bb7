//! HTTP Ledger Gateway Client
//!
//! Talks to a ledger gateway exposing `GET /health` and `POST /events`.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use super::{LedgerClient, LedgerError, LedgerWrite};
use crate::logic::telemetry::SecurityEvent;

/// Request body for `POST /events`
#[derive(Debug, Serialize)]
struct RecordEventRequest<'a> {
    event_id: &'a str,
    timestamp: &'a str,
    log: &'a str,
    analysis: &'a str,
    remediation: &'a str,
    criticality: &'a str,
}

impl<'a> From<&'a SecurityEvent> for RecordEventRequest<'a> {
    fn from(event: &'a SecurityEvent) -> Self {
        Self {
            event_id: &event.event_id,
            timestamp: &event.timestamp,
            log: &event.log_excerpt,
            analysis: &event.analysis_excerpt,
            remediation: &event.remediation_excerpt,
            criticality: event.criticality.as_str(),
        }
    }
}

pub struct HttpLedger {
    base_url: String,
    accept_marker: String,
    http_client: reqwest::Client,
}

impl HttpLedger {
    pub fn new(base_url: &str, accept_marker: &str, timeout: Duration) -> Result<Self, LedgerError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LedgerError::Http(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            accept_marker: accept_marker.to_string(),
            http_client,
        })
    }
}

#[async_trait]
impl LedgerClient for HttpLedger {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn probe(&self) -> bool {
        let url = format!("{}/health", self.base_url);
        match self.http_client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!("HTTP ledger probe failed: {}", e);
                false
            }
        }
    }

    async fn write(&self, event: &SecurityEvent) -> Result<LedgerWrite, LedgerError> {
        let url = format!("{}/events", self.base_url);

        let response = self
            .http_client
            .post(&url)
            .json(&RecordEventRequest::from(event))
            .send()
            .await
            .map_err(|e| LedgerError::Http(e.to_string()))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            tracing::warn!("HTTP ledger rejected event ({}): {}", status.as_u16(), body);
        }

        Ok(LedgerWrite {
            accepted: status.is_success() && body.contains(&self.accept_marker),
            raw_output: body,
        })
    }
}
