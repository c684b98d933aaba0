//! Output schema synthesis
//!
//! Builds the JSON Schema a schema-enforcing backend uses to constrain the
//! model's answer to `{plan: [{tool, arguments, why}], confidence}`.

use jsonschema::JSONSchema;
use serde_json::{json, Map, Value};

use crate::tools::ToolDescriptor;

/// Output schema for a tool list, or `None` when there is nothing to
/// constrain against.
///
/// `enum` and `oneOf` entries follow the order of `tools`, so the same list
/// always yields the same schema. `oneOf` admits exactly one matching
/// shape, so tools with identical argument shapes make the whole schema
/// reject their output; use [`argument_violations`] to check one step.
pub fn synthesize(tools: &[ToolDescriptor]) -> Option<Value> {
    if tools.is_empty() {
        return None;
    }

    let tool_names: Vec<Value> = tools.iter().map(|t| Value::String(t.name.clone())).collect();
    let argument_shapes: Vec<Value> = tools.iter().map(ToolDescriptor::argument_schema).collect();

    Some(json!({
        "type": "object",
        "properties": {
            "plan": {
                "type": "array",
                "minItems": 1,
                "items": {
                    "type": "object",
                    "properties": {
                        "tool": {
                            "type": "string",
                            "enum": tool_names,
                        },
                        "arguments": {
                            "oneOf": argument_shapes,
                        },
                        "why": {
                            "type": "string",
                        },
                    },
                    "required": ["tool", "arguments", "why"],
                    "additionalProperties": false,
                },
            },
            "confidence": {
                "type": "number",
                "minimum": 0.0,
                "maximum": 1.0,
            },
        },
        "required": ["plan", "confidence"],
    }))
}

/// Violations of `tool`'s own argument schema by `arguments`, as messages.
/// Empty when the arguments conform.
pub fn argument_violations(tool: &ToolDescriptor, arguments: &Map<String, Value>) -> Vec<String> {
    let schema = tool.argument_schema();
    let instance = Value::Object(arguments.clone());
    schema_violations(&schema, &instance)
}

/// Violations of `schema` by `instance`. A schema that fails to compile is
/// reported as a single violation.
pub fn schema_violations(schema: &Value, instance: &Value) -> Vec<String> {
    let compiled = match JSONSchema::compile(schema) {
        Ok(compiled) => compiled,
        Err(e) => return vec![format!("invalid schema: {}", e)],
    };
    let violations = match compiled.validate(instance) {
        Ok(()) => Vec::new(),
        Err(errors) => errors
            .map(|e| format!("{} at '{}'", e, e.instance_path))
            .collect(),
    };
    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{normalize_tool, RawToolEntry};
    use pretty_assertions::assert_eq;

    fn stats_tools() -> Vec<ToolDescriptor> {
        vec![
            normalize_tool(
                &RawToolEntry::new("np_mean", "Mean").with_parameter("a", "array", true, "Input"),
            ),
            normalize_tool(
                &RawToolEntry::new("np_std", "Std")
                    .with_parameter("a", "array", true, "Input")
                    .with_parameter("ddof", "int", false, "Delta degrees of freedom"),
            ),
            normalize_tool(&RawToolEntry::new("now", "Current time")),
        ]
    }

    #[test]
    fn empty_tool_list_has_no_schema() {
        assert_eq!(synthesize(&[]), None);
    }

    #[test]
    fn schema_lists_tools_in_order() {
        let schema = synthesize(&stats_tools()).unwrap();
        let step = &schema["properties"]["plan"]["items"];

        assert_eq!(step["properties"]["tool"]["enum"], json!(["np_mean", "np_std", "now"]));
        assert_eq!(step["required"], json!(["tool", "arguments", "why"]));
        assert_eq!(step["additionalProperties"], json!(false));
        assert_eq!(schema["properties"]["plan"]["minItems"], json!(1));
        assert_eq!(schema["required"], json!(["plan", "confidence"]));
        assert_eq!(schema["properties"]["confidence"]["maximum"], json!(1.0));
    }

    #[test]
    fn argument_shapes_are_per_tool() {
        let schema = synthesize(&stats_tools()).unwrap();
        let shapes = &schema["properties"]["plan"]["items"]["properties"]["arguments"]["oneOf"];

        assert_eq!(shapes[0]["required"], json!(["a"]));
        assert_eq!(shapes[1]["required"], json!(["a"]));
        assert_eq!(shapes[1]["properties"]["ddof"]["type"], json!("integer"));
        assert_eq!(shapes[2], json!({"type": "object", "properties": {}}));
    }

    #[test]
    fn synthesis_is_deterministic() {
        let tools = stats_tools();
        let first = serde_json::to_string(&synthesize(&tools)).unwrap();
        let second = serde_json::to_string(&synthesize(&tools)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn distinct_argument_shapes_accept_canonical_output() {
        let tools = vec![
            normalize_tool(
                &RawToolEntry::new("np_mean", "Mean").with_parameter("a", "array", true, "Input"),
            ),
            normalize_tool(
                &RawToolEntry::new("load", "Load").with_parameter("path", "str", true, "File"),
            ),
        ];
        let schema = synthesize(&tools).unwrap();
        let output = json!({
            "plan": [{"tool": "np_mean", "arguments": {"a": [1, 2, 3]}, "why": "mean"}],
            "confidence": 0.9
        });
        assert!(schema_violations(&schema, &output).is_empty());

        let bad = json!({"plan": [], "confidence": 2.0});
        assert!(!schema_violations(&schema, &bad).is_empty());
    }

    #[test]
    fn overlapping_argument_shapes_reject_output() {
        // `oneOf` needs exactly one branch; identical shapes match twice.
        let tools = vec![
            normalize_tool(
                &RawToolEntry::new("np_mean", "Mean").with_parameter("a", "array", true, "Input"),
            ),
            normalize_tool(
                &RawToolEntry::new("np_std", "Std").with_parameter("a", "array", true, "Input"),
            ),
        ];
        let schema = synthesize(&tools).unwrap();
        let output = json!({
            "plan": [
                {"tool": "np_mean", "arguments": {"a": [1, 2, 3, 4, 5]}, "why": "compute mean"}
            ],
            "confidence": 0.9
        });

        let violations = schema_violations(&schema, &output);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].contains("more than one"));
        assert!(violations[0].ends_with("at '/plan/0/arguments'"));

        // A parameterless tool's shape accepts any object, so it overlaps too.
        let output = json!({
            "plan": [{"tool": "np_mean", "arguments": {"a": [1]}, "why": ""}],
            "confidence": 0.5
        });
        assert!(!schema_violations(&synthesize(&stats_tools()).unwrap(), &output).is_empty());
    }

    #[test]
    fn per_tool_check_accepts_what_one_of_rejects() {
        let tools = stats_tools();
        let mut args = Map::new();
        args.insert("a".to_string(), json!([1, 2, 3, 4, 5]));
        assert!(argument_violations(&tools[0], &args).is_empty());
        assert!(argument_violations(&tools[1], &args).is_empty());
    }

    #[test]
    fn argument_check_uses_the_steps_own_tool() {
        let tools = stats_tools();
        let mut args = Map::new();
        assert_eq!(argument_violations(&tools[0], &args).len(), 1);

        args.insert("a".to_string(), json!([1, 2]));
        assert!(argument_violations(&tools[0], &args).is_empty());

        args.insert("ddof".to_string(), json!("one"));
        assert!(!argument_violations(&tools[1], &args).is_empty());
    }
}
