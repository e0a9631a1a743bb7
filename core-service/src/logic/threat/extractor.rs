//! Verdict Extractor
//!
//! Turns the accumulated stage narrative into a typed `Verdict`.
//! Pure and deterministic: same narrative, same verdict.
//!
//! Field rules (first match wins within each field):
//! - `is_anomaly`: only the literal "anomalie : oui" marker
//! - `criticality`: explicit criticité markers, then risk descriptors, then `basse`
//! - `action_prioritaire` / `justification`: first labelled line
//! - `actions`: strict "N. Action - text:" lines, relaxed fallback only if none

use once_cell::sync::Lazy;
use regex::Regex;

use super::rules::{
    ANOMALY_MARKER, CONTRACT_LABELS, CRITICALITY_CRITIQUE, CRITICALITY_HAUTE,
    CRITICALITY_MOYENNE, PIPELINE_CONFIDENCE, RELAXED_ACTION_MIN_CHARS, RISK_HIGH_MARKERS,
    UNKNOWN_ACTION,
};
use super::types::{Criticality, Verdict};

// ============================================================================
// PATTERNS
// ============================================================================

static STRICT_ACTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)^\s*\d+\.\s*action\s*-\s*([^:\n]+?)\s*:").expect("strict action pattern")
});

static RELAXED_ACTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*\d+\.\s*([^:\n]+):").expect("relaxed action pattern")
});

static NUMBERED_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*\d+\.").expect("numbered line pattern"));

// Labels count only at the start of a line; bullets and `**` may precede them
static PRIORITY_ACTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[\s*#-]*action prioritaire[\s*]*:\s*(.*)$").expect("priority action pattern")
});

static JUSTIFICATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[\s*#-]*justification[\s*]*:\s*(.*)$").expect("justification pattern")
});

// ============================================================================
// EXTRACTION
// ============================================================================

/// Which action pattern produced the action list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionPattern {
    Strict,
    Relaxed,
    None,
}

/// Extract a verdict from a narrative
pub fn extract(narrative: &str) -> Verdict {
    let lower = narrative.to_lowercase();
    let (actions, _) = extract_actions(narrative);

    Verdict {
        is_anomaly: lower.contains(ANOMALY_MARKER),
        criticality: extract_criticality(&lower),
        action_prioritaire: first_labelled(&PRIORITY_ACTION, narrative)
            .unwrap_or_else(|| UNKNOWN_ACTION.to_string()),
        justification: first_labelled(&JUSTIFICATION, narrative).unwrap_or_default(),
        actions,
        confidence: PIPELINE_CONFIDENCE,
    }
}

/// Criticality from an already-lowercased narrative. Never `Inconnue`.
fn extract_criticality(lower: &str) -> Criticality {
    if lower.contains(CRITICALITY_CRITIQUE) {
        Criticality::Critique
    } else if lower.contains(CRITICALITY_HAUTE) {
        Criticality::Haute
    } else if lower.contains(CRITICALITY_MOYENNE) {
        Criticality::Moyenne
    } else if RISK_HIGH_MARKERS.iter().any(|m| lower.contains(m)) {
        Criticality::Haute
    } else {
        Criticality::Basse
    }
}

/// Rest of the first line carrying `pattern`'s label, if non-empty
fn first_labelled(pattern: &Regex, narrative: &str) -> Option<String> {
    narrative.lines().find_map(|line| {
        let caps = pattern.captures(line)?;
        let rest = caps
            .get(1)?
            .as_str()
            .trim_matches(|c: char| c.is_whitespace() || c == '*');
        if rest.is_empty() {
            None
        } else {
            Some(rest.to_string())
        }
    })
}

/// Numbered action lines. The relaxed pattern runs only when the strict
/// one found nothing; the two result sets are never merged.
pub fn extract_actions(narrative: &str) -> (Vec<String>, ActionPattern) {
    let strict: Vec<String> = STRICT_ACTION
        .captures_iter(narrative)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if !strict.is_empty() {
        return (strict, ActionPattern::Strict);
    }

    let relaxed: Vec<String> = RELAXED_ACTION
        .captures_iter(narrative)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().trim())
        .filter(|s| s.chars().count() > RELAXED_ACTION_MIN_CHARS)
        .map(str::to_string)
        .collect();
    if !relaxed.is_empty() {
        return (relaxed, ActionPattern::Relaxed);
    }

    (Vec::new(), ActionPattern::None)
}

/// Number of numbered lines ("N. ...") in the narrative
pub fn numbered_line_count(narrative: &str) -> usize {
    NUMBERED_LINE.find_iter(narrative).count()
}

/// Contract labels absent from the narrative
pub fn missing_labels(narrative: &str) -> Vec<&'static str> {
    let lower = narrative.to_lowercase();
    CONTRACT_LABELS
        .iter()
        .copied()
        .filter(|label| !lower.contains(label))
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO_C: &str = "Anomalie : oui\nType : scan\nRisque : élevé\n...\nCriticité : critique\nAction prioritaire : Bloquer l'IP\nJustification : trafic anormal";

    #[test]
    fn test_scenario_full_narrative() {
        let v = extract(SCENARIO_C);
        assert!(v.is_anomaly);
        assert_eq!(v.criticality, Criticality::Critique);
        assert_eq!(v.action_prioritaire, "Bloquer l'IP");
        assert_eq!(v.justification, "trafic anormal");
        assert_eq!(v.confidence, PIPELINE_CONFIDENCE);
    }

    #[test]
    fn test_anomaly_marker_is_case_insensitive() {
        for text in ["ANOMALIE : OUI", "blah anomalie : Oui blah", "x\nAnomalie : oui, scan"] {
            assert!(extract(text).is_anomaly, "marker not found in {:?}", text);
        }
    }

    #[test]
    fn test_anomaly_requires_exact_marker() {
        // Alarming words alone never set the flag
        let v = extract("Attaque critique détectée, risque : élevé, suspect\nAnomalie: oui");
        assert!(!v.is_anomaly);
        assert!(!extract("Anomalie : non").is_anomaly);
    }

    #[test]
    fn test_criticality_priority_order() {
        let v = extract("Criticité : moyenne\nCriticité : haute\nCriticité : critique");
        assert_eq!(v.criticality, Criticality::Critique);

        let v = extract("Criticité : moyenne\nCriticité : haute");
        assert_eq!(v.criticality, Criticality::Haute);

        let v = extract("CRITICITÉ : MOYENNE");
        assert_eq!(v.criticality, Criticality::Moyenne);
    }

    #[test]
    fn test_risk_descriptor_fallback() {
        assert_eq!(extract("Risque : critique").criticality, Criticality::Haute);
        assert_eq!(extract("risque : élevé").criticality, Criticality::Haute);
        assert_eq!(extract("Risque : faible").criticality, Criticality::Basse);
        // Explicit marker beats the risk descriptor
        assert_eq!(
            extract("Risque : critique\nCriticité : moyenne").criticality,
            Criticality::Moyenne
        );
    }

    #[test]
    fn test_never_inconnue() {
        for text in ["", "???", "criticité : inconnue", "Criticité : extrême", "\u{0}\u{1}"] {
            let c = extract(text).criticality;
            assert!(c.rank().is_some(), "{:?} gave {:?}", text, c);
        }
    }

    #[test]
    fn test_missing_labels_use_defaults() {
        let v = extract("Le log semble normal.");
        assert!(!v.is_anomaly);
        assert_eq!(v.criticality, Criticality::Basse);
        assert_eq!(v.action_prioritaire, UNKNOWN_ACTION);
        assert_eq!(v.justification, "");
        assert!(v.actions.is_empty());
    }

    #[test]
    fn test_first_labelled_line_wins() {
        let v = extract("Action prioritaire :\nAction prioritaire : Isoler le serveur\nAction prioritaire : Redémarrer");
        assert_eq!(v.action_prioritaire, "Isoler le serveur");
    }

    #[test]
    fn test_markdown_emphasis_is_trimmed() {
        let v = extract("**Action prioritaire :** Bloquer 91.200.12.74\n**Justification :** force brute");
        assert_eq!(v.action_prioritaire, "Bloquer 91.200.12.74");
        assert_eq!(v.justification, "force brute");
    }

    #[test]
    fn test_labels_mid_sentence_are_ignored() {
        let narrative = "Explication : la justification : absente du log\n\
                         1. Action - Bloquer l'IP: c'est l'action prioritaire : immédiate\n\
                         Criticité : haute\n\
                         Action prioritaire : Bloquer 91.200.12.74\n\
                         Justification : force brute";
        let v = extract(narrative);
        assert_eq!(v.action_prioritaire, "Bloquer 91.200.12.74");
        assert_eq!(v.justification, "force brute");
    }

    #[test]
    fn test_bulleted_and_bold_labels() {
        let v = extract("- **Action prioritaire** : Isoler l'hôte\n* Justification: exfiltration");
        assert_eq!(v.action_prioritaire, "Isoler l'hôte");
        assert_eq!(v.justification, "exfiltration");
    }

    #[test]
    fn test_strict_actions() {
        let narrative = "1. Action - Bloquer l'IP: stoppe l'attaque\n2. Action - Alerter l'admin: suivi\n3. Vérifier manuellement les règles du pare-feu: utile";
        let (actions, pattern) = extract_actions(narrative);
        assert_eq!(pattern, ActionPattern::Strict);
        assert_eq!(actions, vec!["Bloquer l'IP", "Alerter l'admin"]);
    }

    #[test]
    fn test_relaxed_fallback_only_when_strict_empty() {
        let narrative = "1. Bloquer l'adresse IP source sur le pare-feu: urgent\n2. Court: ignoré\n3. Activer la surveillance renforcée des connexions: utile";
        let (actions, pattern) = extract_actions(narrative);
        assert_eq!(pattern, ActionPattern::Relaxed);
        assert_eq!(
            actions,
            vec![
                "Bloquer l'adresse IP source sur le pare-feu",
                "Activer la surveillance renforcée des connexions"
            ]
        );
    }

    #[test]
    fn test_no_numbered_actions() {
        let (actions, pattern) = extract_actions("Bloquer l'IP: maintenant");
        assert!(actions.is_empty());
        assert_eq!(pattern, ActionPattern::None);
    }

    #[test]
    fn test_actions_not_capped_during_extraction() {
        let narrative = (1..=6)
            .map(|i| format!("{}. Action - Mesure numéro {}: raison", i, i))
            .collect::<Vec<_>>()
            .join("\n");
        let v = extract(&narrative);
        assert_eq!(v.actions.len(), 6);
        assert!(v.actions.len() <= numbered_line_count(&narrative));
    }

    #[test]
    fn test_actions_bounded_by_numbered_lines() {
        for text in [SCENARIO_C, "1. a: b\n2. Action - x:", "1. Une action suffisamment longue: ok\nfin"] {
            let v = extract(text);
            assert!(v.actions.len() <= numbered_line_count(text));
        }
    }

    #[test]
    fn test_missing_labels() {
        assert!(missing_labels(SCENARIO_C).is_empty());
        let missing = missing_labels("Anomalie : oui");
        assert!(missing.contains(&"criticité :"));
        assert!(!missing.contains(&"anomalie :"));
    }
}
