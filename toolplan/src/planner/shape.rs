//! Response shape detection
//!
//! Models have answered in several layouts over time. [`ResponseShape::detect`]
//! classifies a parsed response; the first matching rule wins, in the order
//! the variants are declared.

use serde_json::{Map, Value};

use super::types::PlanStep;

const LEGACY_ACTIONS_WHY: &str = "Converted from legacy actions format";
const MAX_NUMBERED_ACTIONS: usize = 3;

/// Confidence assumed for the older action layouts, which rarely carried one.
pub const LEGACY_ACTIONS_CONFIDENCE: f64 = 0.8;

#[derive(Debug, Clone, PartialEq)]
pub enum ResponseShape<'a> {
    /// `{"plan": [{tool, arguments, why}], "confidence": c}`
    CanonicalPlan(&'a [Value]),
    /// `{"actions": [{tool, arguments}]}`
    LegacyActions(&'a [Value]),
    /// `{"action1": {...}, "action2": {...}, "action3": {...}}`
    LegacyNumberedActions(Vec<&'a Value>),
    /// `[{tool|name|function, arguments}]`
    BareArray(&'a [Value]),
    /// `{"tools": [name], "arguments": {name: args}, "reasoning": r}`
    LegacyToolsArguments {
        tools: &'a [Value],
        arguments: &'a Map<String, Value>,
    },
    Unrecognized,
}

impl<'a> ResponseShape<'a> {
    pub fn detect(value: &'a Value) -> Self {
        let obj = match value {
            Value::Array(items) => return ResponseShape::BareArray(items),
            Value::Object(obj) => obj,
            _ => return ResponseShape::Unrecognized,
        };

        if let Some(Value::Array(steps)) = obj.get("plan") {
            return ResponseShape::CanonicalPlan(steps);
        }
        if let Some(Value::Array(actions)) = obj.get("actions") {
            return ResponseShape::LegacyActions(actions);
        }
        if obj.contains_key("action1") {
            let actions = (1..=MAX_NUMBERED_ACTIONS)
                .map_while(|n| obj.get(&format!("action{}", n)))
                .collect();
            return ResponseShape::LegacyNumberedActions(actions);
        }
        if let (Some(Value::Array(tools)), Some(Value::Object(arguments))) =
            (obj.get("tools"), obj.get("arguments"))
        {
            return ResponseShape::LegacyToolsArguments { tools, arguments };
        }
        ResponseShape::Unrecognized
    }

    pub fn name(&self) -> &'static str {
        match self {
            ResponseShape::CanonicalPlan(_) => "plan",
            ResponseShape::LegacyActions(_) => "actions",
            ResponseShape::LegacyNumberedActions(_) => "numbered_actions",
            ResponseShape::BareArray(_) => "bare_array",
            ResponseShape::LegacyToolsArguments { .. } => "tools_arguments",
            ResponseShape::Unrecognized => "unrecognized",
        }
    }

    /// Confidence used when the response carries none.
    pub fn default_confidence(&self) -> f64 {
        match self {
            ResponseShape::LegacyActions(_)
            | ResponseShape::LegacyNumberedActions(_)
            | ResponseShape::BareArray(_) => LEGACY_ACTIONS_CONFIDENCE,
            _ => 0.0,
        }
    }

    /// Coerce into plan steps. `None` for [`ResponseShape::Unrecognized`].
    /// Entries without a usable tool name are dropped.
    pub fn into_steps(self, reasoning: Option<&str>) -> Option<Vec<PlanStep>> {
        let steps = match self {
            ResponseShape::CanonicalPlan(items) => items
                .iter()
                .filter_map(|item| {
                    let obj = item.as_object()?;
                    let why = obj.get("why").and_then(Value::as_str).unwrap_or_default();
                    step_from(obj, &["tool"], why, false)
                })
                .collect(),
            ResponseShape::LegacyActions(items) => items
                .iter()
                .filter_map(|item| {
                    step_from(item.as_object()?, &["tool"], LEGACY_ACTIONS_WHY, false)
                })
                .collect(),
            ResponseShape::LegacyNumberedActions(items) => items
                .into_iter()
                .enumerate()
                .filter_map(|(i, item)| {
                    let why = format!("Step {} from legacy format", i + 1);
                    step_from(item.as_object()?, &["tool"], &why, false)
                })
                .collect(),
            ResponseShape::BareArray(items) => items
                .iter()
                .filter_map(|item| {
                    let obj = item.as_object()?;
                    let why = obj.get("why").and_then(Value::as_str).unwrap_or_default();
                    step_from(obj, &["tool", "name", "function"], why, true)
                })
                .collect(),
            ResponseShape::LegacyToolsArguments { tools, arguments } => {
                let why = reasoning.unwrap_or_default();
                tools
                    .iter()
                    .filter_map(Value::as_str)
                    .filter(|name| !name.trim().is_empty())
                    .map(|name| {
                        let args = arguments
                            .get(name)
                            .and_then(Value::as_object)
                            .cloned()
                            .unwrap_or_default();
                        PlanStep::new(name, args, why)
                    })
                    .collect()
            }
            ResponseShape::Unrecognized => return None,
        };
        Some(steps)
    }
}

fn step_from(
    obj: &Map<String, Value>,
    tool_keys: &[&str],
    why: &str,
    drop_nulls: bool,
) -> Option<PlanStep> {
    let tool = tool_keys
        .iter()
        .find_map(|key| obj.get(*key).and_then(Value::as_str))
        .filter(|name| !name.trim().is_empty())?;

    let mut arguments = obj
        .get("arguments")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    if drop_nulls {
        arguments.retain(|_, v| !(v.is_null() || v.as_str() == Some("null")));
    }

    Some(PlanStep::new(tool, arguments, why))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn steps(value: &Value) -> Vec<PlanStep> {
        ResponseShape::detect(value)
            .into_steps(value.get("reasoning").and_then(Value::as_str))
            .expect("recognized shape")
    }

    fn args(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn detection_priority() {
        let both = json!({"plan": [], "actions": [{"tool": "a"}]});
        assert_eq!(ResponseShape::detect(&both).name(), "plan");

        let plan_not_list = json!({"plan": "do it", "actions": []});
        assert_eq!(ResponseShape::detect(&plan_not_list).name(), "actions");

        assert_eq!(ResponseShape::detect(&json!([])).name(), "bare_array");
        assert_eq!(ResponseShape::detect(&json!({"result": 1})).name(), "unrecognized");
        assert_eq!(ResponseShape::detect(&json!("text")).name(), "unrecognized");
        assert_eq!(ResponseShape::detect(&json!({"tools": ["a"]})).name(), "unrecognized");
    }

    #[test]
    fn canonical_steps_get_defaults() {
        let value = json!({"plan": [
            {"tool": "np_mean"},
            {"tool": "np_std", "arguments": {"a": [1]}, "why": "spread"}
        ]});
        assert_eq!(
            steps(&value),
            vec![
                PlanStep::new("np_mean", Map::new(), ""),
                PlanStep::new("np_std", args(json!({"a": [1]})), "spread"),
            ]
        );
    }

    #[test]
    fn legacy_actions() {
        let value = json!({"actions": [{"tool": "np_mean", "arguments": {"a": [1, 2]}}]});
        assert_eq!(
            steps(&value),
            vec![PlanStep::new(
                "np_mean",
                args(json!({"a": [1, 2]})),
                "Converted from legacy actions format"
            )]
        );
        assert_eq!(ResponseShape::detect(&value).default_confidence(), 0.8);
    }

    #[test]
    fn numbered_actions_stop_at_first_gap() {
        let value = json!({
            "action1": {"tool": "load", "arguments": {}},
            "action2": {"tool": "np_mean", "arguments": {"a": "<A>"}},
            "action4": {"tool": "ignored"}
        });
        assert_eq!(
            steps(&value),
            vec![
                PlanStep::new("load", Map::new(), "Step 1 from legacy format"),
                PlanStep::new("np_mean", args(json!({"a": "<A>"})), "Step 2 from legacy format"),
            ]
        );

        let gap = json!({"action1": {"tool": "a"}, "action3": {"tool": "c"}});
        assert_eq!(steps(&gap).len(), 1);
    }

    #[test]
    fn numbered_actions_skip_non_objects() {
        let value = json!({"action1": "oops", "action2": {"tool": "b"}});
        assert_eq!(
            steps(&value),
            vec![PlanStep::new("b", Map::new(), "Step 2 from legacy format")]
        );
    }

    #[test]
    fn bare_array_accepts_alternate_keys_and_drops_nulls() {
        let value = json!([
            {"name": "np_mean", "arguments": {"a": [1], "axis": null, "out": "null"}},
            {"function": "np_std", "arguments": {"a": [2]}},
            {"arguments": {"a": [3]}}
        ]);
        assert_eq!(
            steps(&value),
            vec![
                PlanStep::new("np_mean", args(json!({"a": [1]})), ""),
                PlanStep::new("np_std", args(json!({"a": [2]})), ""),
            ]
        );
    }

    #[test]
    fn tools_and_arguments_zip_in_tool_order() {
        let value = json!({
            "tools": ["np_std", "np_mean"],
            "arguments": {"np_mean": {"a": [1, 2, 3]}},
            "reasoning": "x"
        });
        assert_eq!(
            steps(&value),
            vec![
                PlanStep::new("np_std", Map::new(), "x"),
                PlanStep::new("np_mean", args(json!({"a": [1, 2, 3]})), "x"),
            ]
        );
        assert_eq!(ResponseShape::detect(&value).default_confidence(), 0.0);
    }

    #[test]
    fn empty_tool_names_are_dropped() {
        let value = json!({"plan": [{"tool": ""}, {"tool": "  "}, {"tool": 3}, {"tool": "ok"}]});
        assert_eq!(steps(&value), vec![PlanStep::new("ok", Map::new(), "")]);
    }

    #[test]
    fn unrecognized_has_no_steps() {
        assert_eq!(ResponseShape::Unrecognized.into_steps(None), None);
    }
}
