use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::BackendError;

/// One generation call.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GenerateRequest {
    pub prompt: String,
    /// Output schema the backend should enforce, when it can
    pub schema: Option<Value>,
}

impl GenerateRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            schema: None,
        }
    }

    pub fn with_schema(mut self, schema: Value) -> Self {
        self.schema = Some(schema);
        self
    }
}

/// Descriptive metadata about a backend, for logs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendInfo {
    pub provider: String,
    pub model: String,
    pub endpoint: Option<String>,
}

/// A language model that turns a prompt into raw text.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    /// Generate raw text. One call, no retries.
    async fn generate(&self, request: &GenerateRequest) -> Result<String, BackendError>;

    /// Whether the backend honors an attached output schema. Failures to
    /// find out count as `false`.
    async fn supports_json_schema(&self) -> bool;

    fn info(&self) -> BackendInfo;
}
