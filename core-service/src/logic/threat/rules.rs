//! Triage Rules & Markers
//!
//! Markers the extractor looks for, keyword tables for the rule-based
//! classifier, and fixed confidence values.
//! No classify/extract logic here - only constants.

// ============================================================================
// NARRATIVE MARKERS (matched on the lowercased narrative)
// ============================================================================

/// The only marker that may set `is_anomaly`
pub const ANOMALY_MARKER: &str = "anomalie : oui";

/// Explicit criticality markers, highest first
pub const CRITICALITY_CRITIQUE: &str = "criticité : critique";
pub const CRITICALITY_HAUTE: &str = "criticité : haute";
pub const CRITICALITY_MOYENNE: &str = "criticité : moyenne";

/// Risk descriptors that map to `haute` when no criticality marker exists
pub const RISK_HIGH_MARKERS: [&str; 2] = ["risque : critique", "risque : élevé"];

/// Labels the stage prompts ask for (used to detect contract drift)
pub const CONTRACT_LABELS: [&str; 5] = [
    "anomalie :",
    "risque :",
    "criticité :",
    "action prioritaire :",
    "justification :",
];

/// Placeholder when no priority action could be extracted
pub const UNKNOWN_ACTION: &str = "Action non identifiée";

/// Relaxed action fallback: text before the colon must be longer than this
pub const RELAXED_ACTION_MIN_CHARS: usize = 20;

// ============================================================================
// CONFIDENCE
// ============================================================================

/// Confidence reported for verdicts extracted from a full narrative
pub const PIPELINE_CONFIDENCE: f32 = 0.96;

/// Confidence of the keyword path (fixed, signals an approximate result)
pub const SIMPLE_CONFIDENCE: f32 = 0.75;

// ============================================================================
// RULE-BASED KEYWORDS (case-insensitive substrings)
// ============================================================================

pub const ANOMALY_KEYWORDS: [&str; 10] = [
    "failed password",
    "invalid user",
    "brute force",
    "port scan",
    "sql injection",
    "denied",
    "refused",
    "attack",
    "error",
    "critical",
];

/// Keywords raising criticality to `critique`
pub const CRITIQUE_KEYWORDS: [&str; 2] = ["critical", "attack"];

/// Keywords raising criticality to `haute` (authentication abuse)
pub const AUTH_FAILURE_KEYWORDS: [&str; 2] = ["failed password", "invalid user"];

/// Keywords raising criticality to `moyenne`
pub const MOYENNE_KEYWORDS: [&str; 2] = ["error", "denied"];

/// Keywords selecting the port scan action set
pub const PORT_SCAN_KEYWORDS: [&str; 1] = ["port scan"];

// ============================================================================
// ACTION TABLE
// ============================================================================

pub const BLOCK_SOURCE_IP: &str = "Bloquer l'IP source";

pub const AUTH_FAILURE_ACTIONS: [&str; 3] = [
    BLOCK_SOURCE_IP,
    "Activer le bannissement adaptatif (fail2ban)",
    "Augmenter le délai d'authentification",
];

pub const PORT_SCAN_ACTIONS: [&str; 2] = [BLOCK_SOURCE_IP, "Alerter le SOC"];
