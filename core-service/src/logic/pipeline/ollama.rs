//! Ollama Stage Service
//!
//! Runs a stage against an Ollama-compatible `POST /api/generate`.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::types::{AnalysisStage, StageError, StagePrompt, StageRole};
use crate::config::StageConfig;

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    system: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

pub struct OllamaStage {
    base_url: String,
    model: String,
    timeout: Duration,
    http_client: reqwest::Client,
}

impl OllamaStage {
    pub fn new(config: &StageConfig) -> Result<Self, StageError> {
        Self::with_timeout(
            &config.url,
            &config.model,
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn with_timeout(base_url: &str, model: &str, timeout: Duration) -> Result<Self, StageError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StageError::Unreachable(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            timeout,
            http_client,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn classify(&self, err: reqwest::Error) -> StageError {
        if err.is_timeout() {
            StageError::Timeout(self.timeout)
        } else if err.is_decode() {
            StageError::Malformed(err.to_string())
        } else {
            StageError::Unreachable(err.to_string())
        }
    }
}

#[async_trait]
impl AnalysisStage for OllamaStage {
    async fn run(&self, role: StageRole, prompt: &StagePrompt) -> Result<String, StageError> {
        let url = format!("{}/api/generate", self.base_url);
        let request = GenerateRequest {
            model: &self.model,
            system: &prompt.system,
            prompt: &prompt.prompt,
            stream: false,
        };

        tracing::debug!(stage = %role, prompt_len = prompt.prompt.len(), "Calling stage service");

        let response = self
            .http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StageError::Status {
                code: status.as_u16(),
                body,
            });
        }

        let body = response.text().await.map_err(|e| self.classify(e))?;
        let parsed: GenerateResponse =
            serde_json::from_str(&body).map_err(|e| StageError::Malformed(e.to_string()))?;

        let output = parsed.response.trim();
        if output.is_empty() {
            return Err(StageError::Malformed(format!("{} returned an empty response", role)));
        }

        tracing::debug!(stage = %role, output_len = output.len(), "Stage completed");
        Ok(output.to_string())
    }
}
