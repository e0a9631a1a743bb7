//! Analysis boundary
//!
//! Validates `{"log": "..."}` requests, runs the configured engine and
//! renders `{success, result}` or `{error, details}`. Only malformed input
//! is rejected; degraded verdicts are successful responses.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::config::Config;
use crate::constants::MAX_RENDERED_ACTIONS;
use crate::error::{ErrorBody, InputError};
use crate::logic::pipeline::{Analysis, OllamaStage, Orchestrator};
use crate::logic::recording::{RecordingGateway, RecordingResult};
use crate::logic::telemetry::stats;
use crate::logic::threat::{classify_simple, Criticality, LogRecord};

// ============================================================================
// ENGINE
// ============================================================================

/// Which analysis path serves requests
pub enum TriageEngine {
    /// Three-stage pipeline with recording
    Pipeline(Orchestrator),
    /// Keyword classifier, no external calls
    RuleBased,
}

impl TriageEngine {
    /// Pipeline when enabled and the stage client builds, rule-based otherwise
    pub fn from_config(config: &Config) -> Self {
        if !config.pipeline_enabled {
            tracing::info!("Staged pipeline disabled, using rule-based classifier");
            return TriageEngine::RuleBased;
        }

        match OllamaStage::new(&config.stage) {
            Ok(stage) => {
                tracing::info!(url = %config.stage.url, model = stage.model(), "Staged pipeline enabled");
                let gateway = RecordingGateway::from_config(config);
                TriageEngine::Pipeline(Orchestrator::new(Arc::new(stage), Arc::new(gateway)))
            }
            Err(e) => {
                tracing::warn!("Stage client init failed: {} - using rule-based classifier", e);
                TriageEngine::RuleBased
            }
        }
    }

    pub fn mode(&self) -> &'static str {
        match self {
            TriageEngine::Pipeline(_) => "pipeline",
            TriageEngine::RuleBased => "rule_based",
        }
    }

    pub async fn run(&self, log: &LogRecord) -> Analysis {
        match self {
            TriageEngine::Pipeline(orchestrator) => orchestrator.analyze(log).await,
            TriageEngine::RuleBased => {
                let verdict = classify_simple(log.text());
                stats::analysis_completed(false);
                Analysis {
                    summary: verdict.justification.clone(),
                    verdict,
                    recording: None,
                }
            }
        }
    }
}

// ============================================================================
// RESPONSE TYPES
// ============================================================================

/// Verdict as rendered to callers
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeResult {
    pub is_anomaly: bool,
    pub criticality: Criticality,
    pub action_prioritaire: String,
    pub justification: String,
    /// At most 4, in extraction order
    pub actions: Vec<String>,
    pub confidence: f32,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recording: Option<RecordingResult>,
    pub mode: &'static str,
}

impl AnalyzeResult {
    pub fn render(analysis: Analysis, mode: &'static str) -> Self {
        let Analysis {
            verdict,
            summary,
            recording,
        } = analysis;

        let mut actions = verdict.actions;
        actions.truncate(MAX_RENDERED_ACTIONS);

        Self {
            is_anomaly: verdict.is_anomaly,
            criticality: verdict.criticality,
            action_prioritaire: verdict.action_prioritaire,
            justification: verdict.justification,
            actions,
            confidence: verdict.confidence,
            summary,
            recording,
            mode,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ApiResponse {
    Success { success: bool, result: AnalyzeResult },
    Rejected(ErrorBody),
}

impl ApiResponse {
    pub fn is_rejected(&self) -> bool {
        matches!(self, ApiResponse::Rejected(_))
    }
}

// ============================================================================
// HANDLERS
// ============================================================================

/// Validate a request body. Rejects before any stage runs.
pub fn parse_request(body: &str) -> Result<LogRecord, InputError> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| InputError::MalformedBody(e.to_string()))?;

    let Value::Object(fields) = value else {
        return Err(InputError::MalformedBody("expected a JSON object".to_string()));
    };

    match fields.get("log") {
        None | Some(Value::Null) => Err(InputError::MissingLog),
        Some(Value::String(text)) if text.trim().is_empty() => Err(InputError::EmptyLog),
        Some(Value::String(text)) => Ok(LogRecord::new(text.as_str())),
        Some(_) => Err(InputError::NotText),
    }
}

/// Request body for raw CLI input. Only a JSON object carrying a `log` key
/// is taken as a request; anything else, JSON log lines included, is the log.
pub fn stdin_request(input: &str) -> Result<String, serde_json::Error> {
    if let Ok(Value::Object(fields)) = serde_json::from_str::<Value>(input) {
        if fields.contains_key("log") {
            return Ok(input.trim().to_string());
        }
    }
    serde_json::to_string(&serde_json::json!({ "log": input }))
}

/// Handle one analysis request
pub async fn handle(engine: &TriageEngine, body: &str) -> ApiResponse {
    let log = match parse_request(body) {
        Ok(log) => log,
        Err(e) => {
            tracing::warn!("Rejected analysis request: {}", e);
            return ApiResponse::Rejected(e.body());
        }
    };

    tracing::info!(mode = engine.mode(), log_len = log.text().len(), "Analyzing log");
    let analysis = engine.run(&log).await;

    ApiResponse::Success {
        success: true,
        result: AnalyzeResult::render(analysis, engine.mode()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::threat::Verdict;

    #[test]
    fn test_parse_request_rejections() {
        assert!(matches!(parse_request("not json"), Err(InputError::MalformedBody(_))));
        assert!(matches!(parse_request("[1, 2]"), Err(InputError::MalformedBody(_))));
        assert_eq!(parse_request("{}").unwrap_err(), InputError::MissingLog);
        assert_eq!(parse_request(r#"{"log": null}"#).unwrap_err(), InputError::MissingLog);
        assert_eq!(parse_request(r#"{"log": 42}"#).unwrap_err(), InputError::NotText);
        assert_eq!(parse_request(r#"{"log": "  \n "}"#).unwrap_err(), InputError::EmptyLog);

        let log = parse_request(r#"{"log": "sshd: Failed password"}"#).unwrap();
        assert_eq!(log.text(), "sshd: Failed password");
    }

    #[test]
    fn test_stdin_request_wraps_json_log_lines() {
        let line = r#"{"level":"error","msg":"Failed password for invalid user admin from 91.200.12.74"}"#;
        let body = stdin_request(line).unwrap();
        assert_eq!(parse_request(&body).unwrap().text(), line);

        let raw = "sshd[2345]: Failed password for root\n";
        assert_eq!(parse_request(&stdin_request(raw).unwrap()).unwrap().text(), raw);

        // Not an object, or not valid JSON at all
        assert_eq!(parse_request(&stdin_request("[1, 2]").unwrap()).unwrap().text(), "[1, 2]");
        assert_eq!(parse_request(&stdin_request("{broken").unwrap()).unwrap().text(), "{broken");
    }

    #[test]
    fn test_stdin_request_passes_requests_through() {
        let request = "  {\"log\": \"Accepted password for alice\"}\n";
        assert_eq!(stdin_request(request).unwrap(), r#"{"log": "Accepted password for alice"}"#);

        // An explicit empty log is still rejected downstream
        let body = stdin_request(r#"{"log": ""}"#).unwrap();
        assert_eq!(parse_request(&body).unwrap_err(), InputError::EmptyLog);
    }

    #[tokio::test]
    async fn test_json_log_line_is_analyzed() {
        let line = r#"{"level":"error","msg":"Failed password for invalid user admin from 91.200.12.74"}"#;
        let response = handle(&TriageEngine::RuleBased, &stdin_request(line).unwrap()).await;
        assert!(!response.is_rejected());

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["result"]["is_anomaly"], true);
        assert_eq!(json["result"]["criticality"], "haute");
    }

    #[test]
    fn test_render_caps_actions() {
        let verdict = Verdict {
            is_anomaly: true,
            criticality: Criticality::Haute,
            action_prioritaire: "a".to_string(),
            justification: String::new(),
            actions: (1..=6).map(|i| format!("action {}", i)).collect(),
            confidence: 0.96,
        };
        let result = AnalyzeResult::render(
            Analysis {
                verdict,
                summary: "s".to_string(),
                recording: None,
            },
            "pipeline",
        );
        assert_eq!(result.actions, vec!["action 1", "action 2", "action 3", "action 4"]);

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["criticality"], "haute");
        assert!(json.get("recording").is_none());
    }

    #[tokio::test]
    async fn test_rule_based_handle() {
        let engine = TriageEngine::RuleBased;
        let body = serde_json::json!({
            "log": "Failed password for invalid user admin from 91.200.12.74 port 22"
        })
        .to_string();

        let response = handle(&engine, &body).await;
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["result"]["is_anomaly"], true);
        assert_eq!(json["result"]["criticality"], "haute");
        assert_eq!(json["result"]["mode"], "rule_based");
    }

    #[tokio::test]
    async fn test_rejection_envelope() {
        let response = handle(&TriageEngine::RuleBased, r#"{"log": ""}"#).await;
        assert!(response.is_rejected());
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["error"], "Field 'log' is empty");
        assert!(json.get("success").is_none());
    }

    #[test]
    fn test_disabled_pipeline_uses_rules() {
        let config = Config {
            pipeline_enabled: false,
            ..Default::default()
        };
        assert_eq!(TriageEngine::from_config(&config).mode(), "rule_based");
    }
}
