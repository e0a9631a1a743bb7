//! Stage Orchestrator
//!
//! Runs Analyst -> Remediator -> Validator sequentially, extracts the
//! verdict from the combined narrative and records high-severity anomalies.
//! A failed stage aborts the run with the degraded verdict.

use std::sync::Arc;

use super::prompts;
use super::types::{Analysis, AnalysisStage, Narrative, StageError, StageRole};
use crate::constants::SUMMARY_MAX_CHARS;
use crate::logic::recording::RecordingGateway;
use crate::logic::telemetry::{stats, SecurityEvent};
use crate::logic::threat::{self, LogRecord};

pub struct Orchestrator {
    stage: Arc<dyn AnalysisStage>,
    gateway: Arc<RecordingGateway>,
}

impl Orchestrator {
    pub fn new(stage: Arc<dyn AnalysisStage>, gateway: Arc<RecordingGateway>) -> Self {
        Self { stage, gateway }
    }

    pub fn gateway(&self) -> &RecordingGateway {
        &self.gateway
    }

    /// Analyze one log. Stage failures never escape as errors.
    pub async fn analyze(&self, log: &LogRecord) -> Analysis {
        let narrative = match self.run_stages(log.text()).await {
            Ok(narrative) => narrative,
            Err((role, e)) => {
                tracing::warn!(stage = %role, "Stage failed, returning degraded verdict: {}", e);
                stats::analysis_completed(true);
                return Analysis::degraded();
            }
        };

        let text = narrative.text();
        let missing = threat::missing_labels(&text);
        if !missing.is_empty() {
            tracing::warn!(?missing, "Narrative does not follow the line format");
        }

        let verdict = threat::extract(&text);
        stats::analysis_completed(false);
        tracing::info!(
            is_anomaly = verdict.is_anomaly,
            criticality = %verdict.criticality,
            actions = verdict.actions.len(),
            "Verdict extracted"
        );

        let recording = if verdict.requires_recording() {
            let analysis = narrative.output(StageRole::Analyst).unwrap_or_default();
            let event = SecurityEvent::new(log, analysis, &verdict);
            Some(self.gateway.record(&event).await)
        } else {
            None
        };

        Analysis {
            verdict,
            summary: narrative.summary(SUMMARY_MAX_CHARS),
            recording,
        }
    }

    async fn run_stages(&self, log_text: &str) -> Result<Narrative, (StageRole, StageError)> {
        let mut narrative = Narrative::new();

        for role in StageRole::ALL {
            let prompt = prompts::for_stage(role, log_text, &narrative);
            let output = self
                .stage
                .run(role, &prompt)
                .await
                .map_err(|e| (role, e))?;

            if output.trim().is_empty() {
                return Err((role, StageError::Malformed("empty output".to_string())));
            }
            narrative.append(role, output);
        }

        Ok(narrative)
    }
}
