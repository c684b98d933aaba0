//! Ollama-style `/api/generate` backend.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use super::backend::{BackendInfo, GenerateRequest, ModelBackend};
use crate::config::{LlmConfig, SchemaMode};
use crate::error::BackendError;

const PROBE_PROMPT: &str = "Respond with a simple JSON: {\"test\": \"hello\"}";
const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

pub struct OllamaBackend {
    config: LlmConfig,
    client: reqwest::Client,
}

impl OllamaBackend {
    pub fn new(config: LlmConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder().build().map_err(|e| {
            BackendError::Unavailable(format!("Failed to create HTTP client: {}", e))
        })?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    /// Request body for `request`. Sampling options are copied from the
    /// configuration; an attached schema goes under `options.json_schema`.
    pub fn build_payload(&self, request: &GenerateRequest) -> Value {
        let mut options: Map<String, Value> = self.config.options.clone();
        let mut payload = json!({
            "model": self.config.model,
            "prompt": request.prompt,
            "stream": false,
        });

        if let Some(schema) = &request.schema {
            options.insert("json_schema".to_string(), schema.clone());
            match self.config.schema_mode {
                SchemaMode::JsonSchema => payload["type"] = json!("json_schema"),
                SchemaMode::Format => payload["format"] = json!("json"),
            }
        }
        payload["options"] = Value::Object(options);
        payload
    }

    fn probe_payload(&self) -> Value {
        let schema = json!({
            "type": "object",
            "properties": {"test": {"type": "string"}},
            "required": ["test"],
        });
        let mut payload = json!({
            "model": self.config.model,
            "prompt": PROBE_PROMPT,
            "stream": false,
            "options": {"json_schema": schema},
        });
        match self.config.schema_mode {
            SchemaMode::JsonSchema => payload["type"] = json!("json_schema"),
            SchemaMode::Format => payload["format"] = json!("json"),
        }
        payload
    }

    async fn post(&self, payload: &Value, timeout: Duration) -> Result<String, BackendError> {
        let response = self
            .client
            .post(&self.config.api_url)
            .json(payload)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| BackendError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status(status.as_u16()));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))?;
        Ok(body.response.trim().to_string())
    }
}

#[async_trait]
impl ModelBackend for OllamaBackend {
    async fn generate(&self, request: &GenerateRequest) -> Result<String, BackendError> {
        let payload = self.build_payload(request);
        debug!(
            model = %self.config.model,
            url = %self.config.api_url,
            prompt_len = request.prompt.len(),
            schema = request.schema.is_some(),
            "calling model backend"
        );

        let text = self
            .post(&payload, Duration::from_secs(self.config.timeout))
            .await?;
        debug!(response_len = text.len(), "model backend responded");
        Ok(text)
    }

    async fn supports_json_schema(&self) -> bool {
        match self.post(&self.probe_payload(), PROBE_TIMEOUT).await {
            Ok(text) => serde_json::from_str::<Value>(&text).is_ok(),
            Err(e) => {
                warn!(model = %self.config.model, error = %e, "JSON schema probe failed");
                false
            }
        }
    }

    fn info(&self) -> BackendInfo {
        BackendInfo {
            provider: self.config.provider.clone(),
            model: self.config.model.clone(),
            endpoint: Some(self.config.api_url.clone()),
        }
    }
}
