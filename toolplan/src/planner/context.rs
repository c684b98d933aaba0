//! Context providers
//!
//! Optional free text appended to the system prompt. Providers are handed to
//! the engine explicitly; nothing here searches the filesystem on its own.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;
use crate::tools::ToolDescriptor;

/// Contributes prompt context for a reasoning call.
pub trait ContextProvider: Send + Sync {
    /// Context text for this tool list and query, or `None` to contribute
    /// nothing.
    fn context(&self, tools: &[ToolDescriptor], query: &str) -> Option<String>;
}

/// Usage guidance taken from a tool server configuration's `prompts`
/// section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PromptContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub general_context: Option<String>,
    /// Per-tool notes; only tools present in the current call are rendered
    #[serde(default)]
    pub tool_context: IndexMap<String, String>,
    #[serde(default)]
    pub workflows: IndexMap<String, String>,
    #[serde(default)]
    pub query_hints: IndexMap<String, String>,
}

impl PromptContext {
    /// Build from a whole server configuration document. A document without
    /// a `prompts` section yields an empty context.
    pub fn from_server_config(config: &serde_yaml::Value) -> Result<Self, ConfigError> {
        match config.get("prompts") {
            Some(prompts) if !prompts.is_null() => Ok(serde_yaml::from_value(prompts.clone())?),
            _ => Ok(Self::default()),
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let config: serde_yaml::Value = serde_yaml::from_str(&text)?;
        let context = Self::from_server_config(&config)?;
        debug!(
            path = %path.display(),
            tool_notes = context.tool_context.len(),
            workflows = context.workflows.len(),
            "loaded prompt context"
        );
        Ok(context)
    }

    pub fn is_empty(&self) -> bool {
        self.general_context.is_none()
            && self.tool_context.is_empty()
            && self.workflows.is_empty()
            && self.query_hints.is_empty()
    }
}

impl ContextProvider for PromptContext {
    fn context(&self, tools: &[ToolDescriptor], _query: &str) -> Option<String> {
        let mut parts: Vec<String> = Vec::new();

        if let Some(general) = &self.general_context {
            parts.push(general.clone());
        }

        for tool in tools {
            if let Some(note) = self.tool_context.get(&tool.name) {
                parts.push(format!("{}: {}", tool.name, note));
            }
        }

        if !self.workflows.is_empty() {
            parts.push("\nCommon workflows:".to_string());
            parts.extend(
                self.workflows
                    .iter()
                    .map(|(name, desc)| format!("- {}: {}", name, desc)),
            );
        }

        if !self.query_hints.is_empty() {
            parts.push("\nQuery hints:".to_string());
            parts.extend(
                self.query_hints
                    .iter()
                    .map(|(pattern, hint)| format!("- {}: {}", pattern, hint)),
            );
        }

        if parts.is_empty() {
            None
        } else {
            Some(parts.join("\n"))
        }
    }
}

/// Descriptions of data the caller refers to symbolically, e.g. `A` for
/// "a numpy array of daily temperatures". Lets plans carry `<...>`
/// placeholders instead of literal values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymbolicContext {
    symbols: IndexMap<String, String>,
}

impl SymbolicContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_symbol(mut self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.symbols.insert(name.into(), description.into());
        self
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

impl FromIterator<(String, String)> for SymbolicContext {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            symbols: iter.into_iter().collect(),
        }
    }
}

impl ContextProvider for SymbolicContext {
    fn context(&self, _tools: &[ToolDescriptor], _query: &str) -> Option<String> {
        if self.symbols.is_empty() {
            return None;
        }
        let mut out = String::from("Symbolic Data Context:");
        for (name, description) in &self.symbols {
            out.push_str(&format!("\n- {}: {}", name, description));
        }
        Some(out)
    }
}
