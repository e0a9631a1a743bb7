//! Security Event Types
//!
//! Immutable, timestamped record of a high-severity verdict.
//! Created once by the orchestrator, written once to exactly one backend.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::EXCERPT_MAX_CHARS;
use crate::logic::threat::{Criticality, LogRecord, Verdict};

/// Sequence shared by every event created in this process
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

// ============================================================================
// SECURITY EVENT (Main struct)
// ============================================================================

/// Security event handed to the recording gateway
///
/// Events should never be modified after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityEvent {
    /// Unique event ID (time + sequence + random suffix)
    pub event_id: String,
    /// Creation time, ISO-8601 UTC
    pub timestamp: String,
    /// First characters of the analysed log
    pub log_excerpt: String,
    /// First characters of the analyst stage output
    pub analysis_excerpt: String,
    /// Recommended remediation
    pub remediation_excerpt: String,
    pub criticality: Criticality,
}

impl SecurityEvent {
    /// Create an event for a verdict, stamped with the log's arrival time
    pub fn new(log: &LogRecord, analysis: &str, verdict: &Verdict) -> Self {
        Self::at(log.received_at(), log.text(), analysis, verdict)
    }

    /// Create an event with an explicit creation time
    pub fn at(now: DateTime<Utc>, log_text: &str, analysis: &str, verdict: &Verdict) -> Self {
        let remediation = if verdict.actions.is_empty() {
            verdict.action_prioritaire.clone()
        } else {
            verdict.actions.join("; ")
        };

        Self {
            event_id: next_event_id(now),
            timestamp: now.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            log_excerpt: excerpt(log_text, EXCERPT_MAX_CHARS),
            analysis_excerpt: excerpt(analysis, EXCERPT_MAX_CHARS),
            remediation_excerpt: remediation,
            criticality: verdict.criticality,
        }
    }

    /// Convert to JSONL line (for append-only ledgers)
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

// ============================================================================
// HELPERS
// ============================================================================

/// `event_<unix secs>_<seq>_<8 hex>`; the sequence separates events created
/// in the same second, the suffix separates process restarts.
pub fn next_event_id(now: DateTime<Utc>) -> String {
    let seq = EVENT_SEQ.fetch_add(1, Ordering::SeqCst);
    let suffix = Uuid::new_v4().simple().to_string();
    format!("event_{}_{:04}_{}", now.timestamp(), seq, &suffix[..8])
}

/// First `max_chars` characters of `text` (char boundary safe)
pub fn excerpt(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn high_verdict() -> Verdict {
        Verdict {
            is_anomaly: true,
            criticality: Criticality::Haute,
            action_prioritaire: "Bloquer l'IP".to_string(),
            justification: "force brute".to_string(),
            actions: vec!["Bloquer l'IP".to_string(), "Alerter le SOC".to_string()],
            confidence: 0.96,
        }
    }

    #[test]
    fn test_event_fields() {
        let now = DateTime::parse_from_rfc3339("2026-01-30T11:00:05Z")
            .unwrap()
            .with_timezone(&Utc);
        let event = SecurityEvent::at(now, "Failed password", "Anomalie : oui", &high_verdict());

        assert!(event.event_id.starts_with("event_1769770805_"));
        assert_eq!(event.timestamp, "2026-01-30T11:00:05Z");
        assert_eq!(event.remediation_excerpt, "Bloquer l'IP; Alerter le SOC");
        assert_eq!(event.criticality, Criticality::Haute);
    }

    #[test]
    fn test_excerpts_are_bounded() {
        let long_log = "é".repeat(2000);
        let event = SecurityEvent::new(&LogRecord::new(long_log.as_str()), &long_log, &high_verdict());
        assert_eq!(event.log_excerpt.chars().count(), EXCERPT_MAX_CHARS);
        assert_eq!(event.analysis_excerpt.chars().count(), EXCERPT_MAX_CHARS);
    }

    #[test]
    fn test_remediation_falls_back_to_priority_action() {
        let mut verdict = high_verdict();
        verdict.actions.clear();
        let event = SecurityEvent::new(&LogRecord::new("log"), "analysis", &verdict);
        assert_eq!(event.remediation_excerpt, "Bloquer l'IP");
    }

    #[test]
    fn test_event_is_stamped_with_log_arrival() {
        let log = LogRecord::new("Failed password for root");
        std::thread::sleep(std::time::Duration::from_millis(1100));
        let event = SecurityEvent::new(&log, "Anomalie : oui", &high_verdict());

        let received = log.received_at();
        assert_eq!(event.timestamp, received.format("%Y-%m-%dT%H:%M:%SZ").to_string());
        assert!(event
            .event_id
            .starts_with(&format!("event_{}_", received.timestamp())));
        assert_eq!(event.log_excerpt, "Failed password for root");
    }

    #[test]
    fn test_ids_unique_within_same_second() {
        let now = Utc::now();
        let ids: HashSet<String> = (0..500).map(|_| next_event_id(now)).collect();
        assert_eq!(ids.len(), 500);
        assert!(ids.iter().all(|id| id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')));
    }
}
