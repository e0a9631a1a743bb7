//! Stage prompts
//!
//! Each prompt spells out the line format the verdict extractor reads.
//! Stages only see prior stage outputs, never their inputs.

use super::types::{Narrative, StagePrompt, StageRole};

const ANALYST_FORMAT: &str = "\
Réponds en français, exactement avec ces lignes :
Anomalie : oui|non
Type : <type d'anomalie ou normal>
Risque : faible|moyen|élevé|critique
Explication : <pourquoi>";

const REMEDIATOR_FORMAT: &str = "\
Réponds en français avec 2 à 4 actions classées par priorité, une par ligne :
1. Action - <action technique>: <justification>
2. Action - <action technique>: <justification>";

const VALIDATOR_FORMAT: &str = "\
Réponds en français, exactement avec ces lignes :
Criticité : basse|moyenne|haute|critique
Action prioritaire : <une seule action>
Justification : <pourquoi cette priorité>";

/// Build the prompt for `role`. Only the analyst sees the raw log.
pub fn for_stage(role: StageRole, log_text: &str, narrative: &Narrative) -> StagePrompt {
    let analysis = narrative.output(StageRole::Analyst).unwrap_or_default();

    let prompt = match role {
        StageRole::Analyst => format!(
            "Analyse attentivement ce log de sécurité :\n\n{}\n\n\
             Identifie s'il y a une anomalie, de quel type, le niveau de risque \
             et explique pourquoi.\n\n{}",
            log_text, ANALYST_FORMAT
        ),
        StageRole::Remediator => format!(
            "Voici l'analyse d'un log de sécurité :\n\n{}\n\n\
             En te basant sur cette analyse, propose des actions techniques précises \
             pour corriger ou atténuer la menace (ex : bloquer une IP, alerter \
             l'administrateur, modifier une règle firewall).\n\n{}",
            analysis, REMEDIATOR_FORMAT
        ),
        StageRole::Validator => format!(
            "Analyse :\n\n{}\n\nActions proposées :\n\n{}\n\n\
             Valide l'ensemble. Donne la criticité finale, l'action prioritaire \
             et une justification.\n\n{}",
            analysis,
            narrative.output(StageRole::Remediator).unwrap_or_default(),
            VALIDATOR_FORMAT
        ),
    };

    StagePrompt {
        system: role.persona().to_string(),
        prompt,
    }
}
