//! Plan normalization
//!
//! Turns raw model text into a [`Plan`]: markdown unwrap, JSON parse with a
//! regex fallback, shape detection, coercion to steps, tool-name validation
//! with fuzzy correction, confidence extraction. Any failure along the way
//! yields an error-shaped plan rather than an `Err`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::extract::{compile_extraction_regex, parse_json, unwrap_markdown};
use super::fuzzy::{find_match, MatchKind, DEFAULT_MATCH_THRESHOLD};
use super::shape::ResponseShape;
use super::types::{clamp_confidence, Plan, PlanStep};
use crate::config::{ReasoningSettings, DEFAULT_JSON_EXTRACTION_REGEX};
use crate::error::{ConfigError, ParseError};
use crate::tools::ToolDescriptor;

static DEFAULT_EXTRACTION: Lazy<Regex> =
    Lazy::new(|| compile_extraction_regex(DEFAULT_JSON_EXTRACTION_REGEX).unwrap());

#[derive(Debug, Clone)]
pub struct PlanNormalizer {
    extraction: Regex,
    threshold: f64,
}

impl Default for PlanNormalizer {
    fn default() -> Self {
        Self {
            extraction: DEFAULT_EXTRACTION.clone(),
            threshold: DEFAULT_MATCH_THRESHOLD,
        }
    }
}

impl PlanNormalizer {
    /// Normalizer using `pattern` as the fallback JSON extraction regex.
    pub fn new(pattern: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            extraction: compile_extraction_regex(pattern)?,
            threshold: DEFAULT_MATCH_THRESHOLD,
        })
    }

    pub fn from_settings(settings: &ReasoningSettings) -> Result<Self, ConfigError> {
        Self::new(settings.extraction_regex())
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Normalize raw model output against the known tools.
    pub fn normalize(&self, raw: &str, tools: &[ToolDescriptor]) -> Plan {
        let value = match parse_json(unwrap_markdown(raw), &self.extraction) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, response_len = raw.len(), "could not parse model response");
                return Plan::failed(e.to_string());
            }
        };
        self.normalize_value(&value, tools)
    }

    /// Normalize an already parsed response.
    pub fn normalize_value(&self, value: &Value, tools: &[ToolDescriptor]) -> Plan {
        let shape = ResponseShape::detect(value);
        debug!(shape = shape.name(), "detected response shape");

        let default_confidence = shape.default_confidence();
        let reasoning = value.get("reasoning").and_then(Value::as_str);

        let Some(steps) = shape.into_steps(reasoning) else {
            warn!("model response matched no known plan layout");
            return Plan::failed(ParseError::Unrecognized.to_string());
        };

        let steps = self.validate_tool_names(steps, tools);
        let confidence = value
            .get("confidence")
            .and_then(Value::as_f64)
            .map(clamp_confidence)
            .unwrap_or(default_confidence);

        let plan = Plan::new(steps, confidence);
        match reasoning {
            Some(r) => plan.with_reasoning(r),
            None => plan,
        }
    }

    /// Replace unknown tool names with their fuzzy match, dropping steps that
    /// have none. Skipped when no tools are known.
    fn validate_tool_names(&self, steps: Vec<PlanStep>, tools: &[ToolDescriptor]) -> Vec<PlanStep> {
        if tools.is_empty() {
            return steps;
        }
        let known: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();

        steps
            .into_iter()
            .filter_map(|mut step| match find_match(&step.tool, &known, self.threshold) {
                Some(m) if m.kind == MatchKind::Exact => Some(step),
                Some(m) => {
                    info!(from = %step.tool, to = m.name, kind = ?m.kind, "corrected tool name");
                    step.tool = m.name.to_string();
                    Some(step)
                }
                None => {
                    warn!(tool = %step.tool, "dropping step with unknown tool");
                    None
                }
            })
            .collect()
    }
}

/// Normalize with the default extraction regex and match threshold.
pub fn normalize_plan(raw: &str, tools: &[ToolDescriptor]) -> Plan {
    PlanNormalizer::default().normalize(raw, tools)
}
