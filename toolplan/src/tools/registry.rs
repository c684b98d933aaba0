//! Tool registries
//!
//! A registry lists the tools a plan may reference and invokes them by name.
//! [`StaticToolRegistry`] keeps everything in process; [`JsonRpcToolRegistry`]
//! talks to a remote server speaking `tools/list` and `tools/call`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::descriptor::RawToolEntry;
use crate::error::RegistryError;

/// Source of tool metadata and the means to invoke tools.
#[async_trait]
pub trait ToolRegistry: Send + Sync {
    async fn list_tools(&self) -> Result<Vec<RawToolEntry>, RegistryError>;

    async fn call_tool(&self, name: &str, arguments: Value) -> Result<Value, RegistryError>;
}

/// Handler invoked by [`StaticToolRegistry`]. An `Err` string becomes
/// [`RegistryError::ToolFailed`].
pub type ToolHandler = Arc<dyn Fn(&Value) -> Result<Value, String> + Send + Sync>;

/// In-memory registry.
#[derive(Default, Clone)]
pub struct StaticToolRegistry {
    tools: Vec<RawToolEntry>,
    handlers: HashMap<String, ToolHandler>,
}

impl StaticToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register metadata only. Calling the tool fails with `UnknownTool`.
    pub fn with_tool(mut self, tool: RawToolEntry) -> Self {
        self.insert_entry(tool);
        self
    }

    pub fn with_handler<F>(mut self, tool: RawToolEntry, handler: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.handlers.insert(tool.name.clone(), Arc::new(handler));
        self.insert_entry(tool);
        self
    }

    /// Re-registering a name replaces the entry in place.
    fn insert_entry(&mut self, tool: RawToolEntry) {
        match self.tools.iter_mut().find(|t| t.name == tool.name) {
            Some(existing) => *existing = tool,
            None => self.tools.push(tool),
        }
    }
}

impl std::fmt::Debug for StaticToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticToolRegistry")
            .field("tools", &self.tools.iter().map(|t| &t.name).collect::<Vec<_>>())
            .finish()
    }
}

#[async_trait]
impl ToolRegistry for StaticToolRegistry {
    async fn list_tools(&self) -> Result<Vec<RawToolEntry>, RegistryError> {
        Ok(self.tools.clone())
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> Result<Value, RegistryError> {
        let handler = self
            .handlers
            .get(name)
            .ok_or_else(|| RegistryError::UnknownTool(name.to_string()))?;
        handler(&arguments).map_err(|message| RegistryError::ToolFailed {
            tool: name.to_string(),
            message,
        })
    }
}

/// Registry backed by a JSON-RPC 2.0 endpoint.
#[derive(Debug, Clone)]
pub struct JsonRpcToolRegistry {
    client: reqwest::Client,
    url: String,
    next_id: Arc<AtomicU64>,
}

impl JsonRpcToolRegistry {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, RegistryError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RegistryError::Transport(e.to_string()))?;
        Ok(Self::with_client(url, client))
    }

    pub fn with_client(url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            client,
            url: url.into(),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn request_body(&self, method: &str, params: Value) -> Value {
        json!({
            "jsonrpc": "2.0",
            "id": self.next_id.fetch_add(1, Ordering::Relaxed),
            "method": method,
            "params": params,
        })
    }

    async fn make_request(&self, method: &str, params: Value) -> Result<Value, RegistryError> {
        let body = self.request_body(method, params);
        debug!(url = %self.url, method, "tool registry request");

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| RegistryError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(
                url = %self.url,
                method,
                status = status.as_u16(),
                "tool registry returned error status"
            );
            return Err(RegistryError::Status(status.as_u16()));
        }

        let envelope: Value = response
            .json()
            .await
            .map_err(|e| RegistryError::Decode(e.to_string()))?;
        unwrap_response(envelope)
    }
}

#[async_trait]
impl ToolRegistry for JsonRpcToolRegistry {
    async fn list_tools(&self) -> Result<Vec<RawToolEntry>, RegistryError> {
        let result = self.make_request("tools/list", json!({})).await?;
        parse_tool_listing(result)
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> Result<Value, RegistryError> {
        self.make_request(
            "tools/call",
            json!({ "name": name, "arguments": arguments }),
        )
        .await
    }
}

/// Extract `result` from a JSON-RPC envelope, mapping `error` objects.
pub(crate) fn unwrap_response(envelope: Value) -> Result<Value, RegistryError> {
    let Value::Object(mut envelope) = envelope else {
        return Err(RegistryError::Decode(
            "response is not a JSON object".to_string(),
        ));
    };

    if let Some(error) = envelope.remove("error") {
        if !error.is_null() {
            let code = error.get("code").and_then(Value::as_i64).unwrap_or(-32603);
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_string();
            return Err(RegistryError::Rpc { code, message });
        }
    }

    envelope
        .remove("result")
        .ok_or_else(|| RegistryError::Decode("response has neither result nor error".to_string()))
}

/// A listing is either a bare array or `{ "tools": [...] }`.
pub(crate) fn parse_tool_listing(result: Value) -> Result<Vec<RawToolEntry>, RegistryError> {
    let tools = match result {
        Value::Array(_) => result,
        Value::Object(mut obj) => obj
            .remove("tools")
            .ok_or_else(|| RegistryError::Decode("tool listing has no `tools` field".to_string()))?,
        other => {
            return Err(RegistryError::Decode(format!(
                "unexpected tool listing: {}",
                other
            )))
        }
    };
    serde_json::from_value(tools).map_err(|e| RegistryError::Decode(e.to_string()))
}
