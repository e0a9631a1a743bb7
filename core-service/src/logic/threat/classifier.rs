//! Rule-Based Classifier
//!
//! Keyword-driven verdict, no external dependencies.
//! Used when the staged pipeline is disabled, and as the cheap path.
//! Input: raw log text
//! Output: Verdict with a fixed confidence

use super::rules::{
    ANOMALY_KEYWORDS, AUTH_FAILURE_ACTIONS, AUTH_FAILURE_KEYWORDS, CRITIQUE_KEYWORDS,
    MOYENNE_KEYWORDS, PORT_SCAN_ACTIONS, PORT_SCAN_KEYWORDS, SIMPLE_CONFIDENCE, UNKNOWN_ACTION,
};
use super::types::{Criticality, Verdict};

// ============================================================================
// MAIN CLASSIFICATION FUNCTION
// ============================================================================

/// Quick verdict from keywords only
pub fn classify_simple(log_text: &str) -> Verdict {
    let lower = log_text.to_lowercase();
    let contains_any = |keywords: &[&str]| keywords.iter().any(|k| lower.contains(k));

    let matched: Vec<&str> = ANOMALY_KEYWORDS
        .iter()
        .copied()
        .filter(|k| lower.contains(k))
        .collect();
    let is_anomaly = !matched.is_empty();

    let criticality = if contains_any(&CRITIQUE_KEYWORDS[..]) {
        Criticality::Critique
    } else if contains_any(&AUTH_FAILURE_KEYWORDS[..]) {
        Criticality::Haute
    } else if contains_any(&MOYENNE_KEYWORDS[..]) {
        Criticality::Moyenne
    } else {
        Criticality::Basse
    };

    // Action table, one entry per matched category, duplicates dropped
    let mut actions: Vec<String> = Vec::new();
    let mut push_all = |list: &[&str]| {
        for action in list {
            if !actions.iter().any(|a| a == action) {
                actions.push(action.to_string());
            }
        }
    };
    if contains_any(&AUTH_FAILURE_KEYWORDS[..]) {
        push_all(&AUTH_FAILURE_ACTIONS[..]);
    }
    if contains_any(&PORT_SCAN_KEYWORDS[..]) {
        push_all(&PORT_SCAN_ACTIONS[..]);
    }

    let action_prioritaire = actions
        .first()
        .cloned()
        .unwrap_or_else(|| UNKNOWN_ACTION.to_string());
    let justification = if is_anomaly {
        format!("Mots-clés détectés : {}", matched.join(", "))
    } else {
        String::new()
    };

    Verdict {
        is_anomaly,
        criticality,
        action_prioritaire,
        justification,
        actions,
        confidence: SIMPLE_CONFIDENCE,
    }
}

// ============================================================================
// TESTS
// ============================================================================
