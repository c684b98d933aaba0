//! Reasoner configuration
//!
//! The on-disk format is a YAML (or JSON) mapping with at least an `llm` and a
//! `reasoning` section. Raw mappings are checked by [`validate_config`] before
//! being deserialized into [`ReasonerConfig`].

mod loader;
mod validation;

pub use loader::{load_config, load_config_mapping};
pub use validation::{validate_config, SUPPORTED_MAJOR_VERSION};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ConfigError;

pub const DEFAULT_MODEL: &str = "phi3:mini";
pub const DEFAULT_PROVIDER: &str = "ollama";
pub const DEFAULT_API_URL: &str = "http://localhost:11434/api/generate";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_JSON_EXTRACTION_REGEX: &str = r"\{.*\}";

pub const DEFAULT_SYSTEM_PROMPT_TEMPLATE: &str = "You are an AI assistant that creates action \
plans for executing functions.\n\nAvailable tools:\n{tools}\n\nYour task is to create a linear \
action plan where each action is a tool with its arguments.\nThe actions will be executed in \
sequence. Parse the query and create the action plan.";
pub const DEFAULT_USER_PROMPT_TEMPLATE: &str = "User query: {query}";

/// Top-level reasoner configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReasonerConfig {
    /// Optional `major.minor` version tag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<Value>,
    pub llm: LlmConfig,
    pub reasoning: ReasoningSettings,
    /// Static schema used when no tool schema can be synthesized
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json_schema: Option<Value>,
    /// Presentation hints for callers; carried through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_format: Option<Value>,
}

/// How a schema is attached to a generation request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SchemaMode {
    /// `type: "json_schema"` plus `options.json_schema`
    #[default]
    JsonSchema,
    /// `format: "json"` plus `options.json_schema`
    Format,
}

/// Model backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// Sampling options forwarded verbatim to the backend
    #[serde(default = "default_options")]
    pub options: Map<String, Value>,
    #[serde(default)]
    pub schema_mode: SchemaMode,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            provider: default_provider(),
            api_url: default_api_url(),
            timeout: default_timeout(),
            options: default_options(),
            schema_mode: SchemaMode::default(),
        }
    }
}

/// Prompt templates and response extraction settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReasoningSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt_template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_prompt_template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json_extraction_regex: Option<String>,
}

impl ReasoningSettings {
    pub fn system_template(&self) -> &str {
        self.system_prompt_template
            .as_deref()
            .unwrap_or(DEFAULT_SYSTEM_PROMPT_TEMPLATE)
    }

    pub fn user_template(&self) -> &str {
        self.user_prompt_template
            .as_deref()
            .unwrap_or(DEFAULT_USER_PROMPT_TEMPLATE)
    }

    pub fn extraction_regex(&self) -> &str {
        self.json_extraction_regex
            .as_deref()
            .unwrap_or(DEFAULT_JSON_EXTRACTION_REGEX)
    }
}

impl ReasonerConfig {
    /// Parse, validate and type a configuration held in memory.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let value: serde_yaml::Value = serde_yaml::from_str(text)?;
        Self::from_yaml_value(value)
    }

    pub(crate) fn from_yaml_value(value: serde_yaml::Value) -> Result<Self, ConfigError> {
        let mapping = value.as_mapping().ok_or(ConfigError::NotAMapping)?;
        validate_config(mapping)?;
        let config: ReasonerConfig = serde_yaml::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the typed values the engine relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.llm.model.trim().is_empty() {
            return Err(ConfigError::Invalid("llm.model must not be empty".to_string()));
        }
        if self.llm.api_url.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "llm.api_url must not be empty".to_string(),
            ));
        }
        regex::Regex::new(self.reasoning.extraction_regex()).map_err(|e| {
            ConfigError::Invalid(format!("reasoning.json_extraction_regex: {}", e))
        })?;
        if let Some(schema) = &self.json_schema {
            if !schema.is_object() {
                return Err(ConfigError::Invalid(
                    "json_schema must be a mapping".to_string(),
                ));
            }
        }
        Ok(())
    }
}

impl Default for ReasonerConfig {
    fn default() -> Self {
        Self {
            version: None,
            llm: LlmConfig::default(),
            reasoning: ReasoningSettings::default(),
            json_schema: None,
            response_format: None,
        }
    }
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_provider() -> String {
    DEFAULT_PROVIDER.to_string()
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_options() -> Map<String, Value> {
    let mut options = Map::new();
    options.insert("temperature".to_string(), Value::from(0.1));
    options.insert("top_p".to_string(), Value::from(0.9));
    options
}
