use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

static SYMBOLIC_REF: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());

/// One tool invocation in a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanStep {
    pub tool: String,
    #[serde(default)]
    pub arguments: Map<String, Value>,
    #[serde(default)]
    pub why: String,
}

impl PlanStep {
    pub fn new(
        tool: impl Into<String>,
        arguments: Map<String, Value>,
        why: impl Into<String>,
    ) -> Self {
        Self {
            tool: tool.into(),
            arguments,
            why: why.into(),
        }
    }
}

/// Ordered tool invocations plus the model's confidence.
///
/// When `error` is set, `steps` is empty and `confidence` is `0.0`.
/// [`Plan::failed`] is the only constructor for that shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    #[serde(rename = "plan", default)]
    pub steps: Vec<PlanStep>,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Plan {
    pub fn new(steps: Vec<PlanStep>, confidence: f64) -> Self {
        Self {
            steps,
            confidence: clamp_confidence(confidence),
            reasoning: None,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            steps: Vec::new(),
            confidence: 0.0,
            reasoning: None,
            error: Some(error.into()),
        }
    }

    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = Some(reasoning.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.tool.as_str()).collect()
    }

    /// Every `<...>` placeholder in string argument values, in order of
    /// appearance. Nested arrays and objects are searched too.
    pub fn symbolic_references(&self) -> Vec<String> {
        let mut refs = Vec::new();
        for step in &self.steps {
            for value in step.arguments.values() {
                collect_refs(value, &mut refs);
            }
        }
        refs
    }
}

fn collect_refs(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(s) => {
            out.extend(SYMBOLIC_REF.find_iter(s).map(|m| m.as_str().to_string()))
        }
        Value::Array(items) => items.iter().for_each(|v| collect_refs(v, out)),
        Value::Object(obj) => obj.values().for_each(|v| collect_refs(v, out)),
        _ => {}
    }
}

pub(crate) fn clamp_confidence(confidence: f64) -> f64 {
    if confidence.is_nan() {
        0.0
    } else {
        confidence.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn serializes_with_plan_key() {
        let mut args = Map::new();
        args.insert("a".to_string(), json!([1, 2, 3]));
        let plan = Plan::new(vec![PlanStep::new("np_mean", args, "compute mean")], 0.9);

        assert_eq!(
            serde_json::to_value(&plan).unwrap(),
            json!({
                "plan": [{"tool": "np_mean", "arguments": {"a": [1, 2, 3]}, "why": "compute mean"}],
                "confidence": 0.9
            })
        );
    }

    #[test]
    fn failed_plan_keeps_invariant() {
        let plan = Plan::failed("LLM API error: 500");
        assert!(plan.is_error());
        assert!(plan.steps.is_empty());
        assert_eq!(plan.confidence, 0.0);
    }

    #[test]
    fn confidence_is_clamped() {
        assert_eq!(Plan::new(vec![], 1.7).confidence, 1.0);
        assert_eq!(Plan::new(vec![], -0.2).confidence, 0.0);
        assert_eq!(Plan::new(vec![], f64::NAN).confidence, 0.0);
    }

    #[test]
    fn finds_symbolic_references_recursively() {
        let plan: Plan = serde_json::from_value(json!({
            "plan": [
                {"tool": "np_mean", "arguments": {"a": "<numpy array named A>"}, "why": ""},
                {
                    "tool": "np_dot",
                    "arguments": {"pair": ["<A>", {"b": "<matrix B> and <C>"}], "n": 3}
                }
            ],
            "confidence": 0.5
        }))
        .unwrap();

        assert_eq!(
            plan.symbolic_references(),
            vec!["<numpy array named A>", "<A>", "<matrix B>", "<C>"]
        );
        assert_eq!(plan.tool_names(), vec!["np_mean", "np_dot"]);
    }
}
