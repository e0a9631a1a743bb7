//! Verdict Types
//!
//! Core types for triage results.
//! No logic here - data structures only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// CRITICALITY
// ============================================================================

/// Severity tier of a verdict (`basse < moyenne < haute < critique`)
///
/// `Inconnue` is the failure sentinel and is only produced when the
/// staged pipeline could not complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Criticality {
    Basse,
    Moyenne,
    Haute,
    Critique,
    Inconnue,
}

impl Criticality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Criticality::Basse => "basse",
            Criticality::Moyenne => "moyenne",
            Criticality::Haute => "haute",
            Criticality::Critique => "critique",
            Criticality::Inconnue => "inconnue",
        }
    }

    /// Position in the severity order, `None` for the sentinel
    pub fn rank(&self) -> Option<u8> {
        match self {
            Criticality::Basse => Some(0),
            Criticality::Moyenne => Some(1),
            Criticality::Haute => Some(2),
            Criticality::Critique => Some(3),
            Criticality::Inconnue => None,
        }
    }

    /// `haute` or `critique`
    pub fn is_high(&self) -> bool {
        matches!(self, Criticality::Haute | Criticality::Critique)
    }
}

impl std::fmt::Display for Criticality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// LOG RECORD
// ============================================================================

/// Raw log text as received at the boundary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRecord {
    text: String,
    received_at: DateTime<Utc>,
}

impl LogRecord {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            received_at: Utc::now(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn received_at(&self) -> DateTime<Utc> {
        self.received_at
    }
}

// ============================================================================
// VERDICT
// ============================================================================

/// Structured triage result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub is_anomaly: bool,
    pub criticality: Criticality,
    pub action_prioritaire: String,
    pub justification: String,
    pub actions: Vec<String>,
    /// 0.0 - 1.0
    pub confidence: f32,
}

impl Verdict {
    /// Result returned when a pipeline stage failed
    pub fn degraded() -> Self {
        Self {
            is_anomaly: false,
            criticality: Criticality::Inconnue,
            action_prioritaire: super::rules::UNKNOWN_ACTION.to_string(),
            justification: String::new(),
            actions: Vec::new(),
            confidence: 0.0,
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.criticality == Criticality::Inconnue
    }

    /// High-severity anomalies are durably recorded
    pub fn requires_recording(&self) -> bool {
        self.is_anomaly && self.criticality.is_high()
    }
}
