//! Reasoning engine
//!
//! One reasoning call: normalize the tool list, render prompts, probe the
//! backend for schema support, synthesize the output schema, make a single
//! generation call and normalize the answer. Configuration problems surface
//! from the constructors; everything after that comes back as a [`Plan`],
//! error-shaped when something failed.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::ReasonerConfig;
use crate::error::{ConfigError, Result};
use crate::llm::{GenerateRequest, ModelBackend, OllamaBackend};
use crate::planner::{
    argument_violations, assemble, synthesize, ContextProvider, Plan, PlanNormalizer,
};
use crate::tools::{normalize_tools, RawToolEntry, ToolDescriptor, ToolRegistry};

pub struct ReasoningEngine {
    config: ReasonerConfig,
    backend: Arc<dyn ModelBackend>,
    normalizer: PlanNormalizer,
    context_providers: Vec<Box<dyn ContextProvider>>,
}

impl ReasoningEngine {
    pub fn new(
        config: ReasonerConfig,
        backend: Arc<dyn ModelBackend>,
    ) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        let normalizer = PlanNormalizer::from_settings(&config.reasoning)?;
        Ok(Self {
            config,
            backend,
            normalizer,
            context_providers: Vec::new(),
        })
    }

    /// Engine with the HTTP backend named by `llm.provider`.
    pub fn from_config(config: ReasonerConfig) -> Result<Self> {
        let backend: Arc<dyn ModelBackend> = match config.llm.provider.as_str() {
            "ollama" => Arc::new(OllamaBackend::new(config.llm.clone())?),
            other => {
                let msg = format!("unsupported llm.provider: {}", other);
                return Err(ConfigError::Invalid(msg).into());
            }
        };
        Ok(Self::new(config, backend)?)
    }

    /// Add a context provider. Contributions are appended in registration
    /// order.
    pub fn with_context_provider(mut self, provider: Box<dyn ContextProvider>) -> Self {
        self.context_providers.push(provider);
        self
    }

    pub fn config(&self) -> &ReasonerConfig {
        &self.config
    }

    /// Produce a plan for `query` over `raw_tools`. Never fails; check
    /// [`Plan::error`].
    pub async fn reason_about_query(&self, query: &str, raw_tools: &[RawToolEntry]) -> Plan {
        let tools = normalize_tools(raw_tools);
        let context = self.collect_context(&tools, query);
        let prompt = assemble(&self.config.reasoning, &tools, query, context.as_deref());
        info!(
            query,
            tools = tools.len(),
            system_prompt_len = prompt.system.len(),
            context = context.is_some(),
            "reasoning about query"
        );

        // The backend is only probed when there is a schema to attach.
        let schema = match synthesize(&tools).or_else(|| self.config.json_schema.clone()) {
            Some(schema) => {
                if self.backend.supports_json_schema().await {
                    Some(schema)
                } else {
                    debug!(
                        model = %self.backend.info().model,
                        "backend does not enforce schemas, sending prompt only"
                    );
                    None
                }
            }
            None => None,
        };
        let enforced = schema.is_some();
        debug!(enforced, "schema enforcement decided");

        let mut request = GenerateRequest::new(prompt.combined());
        request.schema = schema;

        let raw = match self.backend.generate(&request).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "model backend call failed");
                return Plan::failed(e.to_string());
            }
        };

        let plan = self.normalizer.normalize(&raw, &tools);
        if enforced && !plan.is_error() {
            self.check_arguments(&plan, &tools);
        }
        info!(
            steps = plan.steps.len(),
            confidence = plan.confidence,
            error = plan.error.as_deref().unwrap_or(""),
            "plan ready"
        );
        plan
    }

    /// Fetch tools from `registry`, then reason over them.
    pub async fn reason_with_registry(&self, query: &str, registry: &dyn ToolRegistry) -> Plan {
        match registry.list_tools().await {
            Ok(tools) => self.reason_about_query(query, &tools).await,
            Err(e) => {
                warn!(error = %e, "could not list tools");
                Plan::failed(format!("Failed to list tools: {}", e))
            }
        }
    }

    fn collect_context(&self, tools: &[ToolDescriptor], query: &str) -> Option<String> {
        let parts: Vec<String> = self
            .context_providers
            .iter()
            .filter_map(|p| p.context(tools, query))
            .filter(|c| !c.trim().is_empty())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("\n\n"))
        }
    }

    /// Log steps whose arguments do not fit their own tool's schema.
    fn check_arguments(&self, plan: &Plan, tools: &[ToolDescriptor]) {
        for (index, step) in plan.steps.iter().enumerate() {
            let Some(tool) = tools.iter().find(|t| t.name == step.tool) else {
                continue;
            };
            for violation in argument_violations(tool, &step.arguments) {
                warn!(
                    step = index + 1,
                    tool = %step.tool,
                    %violation,
                    "step arguments do not match tool schema"
                );
            }
        }
    }
}
