//! Pipeline Types
//!
//! Stage roles, the stage service seam, the per-request narrative and the
//! analysis report returned to the boundary.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::logic::recording::RecordingResult;
use crate::logic::threat::Verdict;

// ============================================================================
// STAGE ROLES
// ============================================================================

/// The three stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StageRole {
    Analyst,
    Remediator,
    Validator,
}

impl StageRole {
    pub const ALL: [StageRole; 3] = [StageRole::Analyst, StageRole::Remediator, StageRole::Validator];

    pub fn as_str(&self) -> &'static str {
        match self {
            StageRole::Analyst => "analyst",
            StageRole::Remediator => "remediator",
            StageRole::Validator => "validator",
        }
    }

    /// System prompt describing who the stage is
    pub fn persona(&self) -> &'static str {
        match self {
            StageRole::Analyst => {
                "Tu es un analyste SOC expérimenté, expert en sécurité réseau, \
                 spécialisé dans les logs SSH, firewall et authentification."
            }
            StageRole::Remediator => {
                "Tu es un expert en réponse aux incidents. Tu maîtrises iptables, \
                 les firewalls, le blocage d'IP et les bonnes pratiques de sécurité."
            }
            StageRole::Validator => {
                "Tu es le responsable sécurité senior. Tu vérifies la cohérence et \
                 l'urgence des recommandations et tu prends la décision finale."
            }
        }
    }
}

impl std::fmt::Display for StageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// STAGE SERVICE
// ============================================================================

/// Failure of a single stage call. Never retried.
#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error("stage timed out after {0:?}")]
    Timeout(Duration),

    #[error("stage service unreachable: {0}")]
    Unreachable(String),

    #[error("stage service returned HTTP {code}: {body}")]
    Status { code: u16, body: String },

    #[error("malformed stage output: {0}")]
    Malformed(String),
}

/// Prompt sent to one stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagePrompt {
    pub system: String,
    pub prompt: String,
}

/// Anything that can turn a stage prompt into text
#[async_trait]
pub trait AnalysisStage: Send + Sync {
    async fn run(&self, role: StageRole, prompt: &StagePrompt) -> Result<String, StageError>;
}

// ============================================================================
// NARRATIVE
// ============================================================================

/// Ordered stage outputs for one request. Append-only.
#[derive(Debug, Clone, Default)]
pub struct Narrative {
    outputs: Vec<(StageRole, String)>,
}

impl Narrative {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, role: StageRole, output: String) {
        self.outputs.push((role, output));
    }

    pub fn output(&self, role: StageRole) -> Option<&str> {
        self.outputs
            .iter()
            .find(|(r, _)| *r == role)
            .map(|(_, text)| text.as_str())
    }

    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    /// Outputs concatenated in stage order
    pub fn text(&self) -> String {
        self.outputs
            .iter()
            .map(|(_, text)| text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Last `max_chars` characters of the narrative, trimmed
    pub fn summary(&self, max_chars: usize) -> String {
        let text = self.text();
        let total = text.chars().count();
        let tail: String = text.chars().skip(total.saturating_sub(max_chars)).collect();
        tail.trim().to_string()
    }
}

// ============================================================================
// ANALYSIS REPORT
// ============================================================================

/// Result of one orchestrator run
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub verdict: Verdict,
    pub summary: String,
    pub recording: Option<RecordingResult>,
}

impl Analysis {
    pub fn degraded() -> Self {
        Self {
            verdict: Verdict::degraded(),
            summary: String::new(),
            recording: None,
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.verdict.is_degraded()
    }
}
