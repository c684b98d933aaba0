use pretty_assertions::assert_eq;
use serde_json::{json, Map, Value};

use toolplan::planner::fuzzy::best_match;
use toolplan::planner::synthesize;
use toolplan::tools::normalize_tools;
use toolplan::{normalize_plan, Plan, PlanStep, RawToolEntry, ToolDescriptor};

fn stats_tools() -> Vec<ToolDescriptor> {
    normalize_tools(&[
        RawToolEntry::new("np_mean", "Calculate the mean of an array")
            .with_parameter("a", "array", true, "Input array"),
        RawToolEntry::new("np_std", "Calculate the standard deviation of an array")
            .with_parameter("a", "array", true, "Input array"),
    ])
}

fn args(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap_or_default()
}

fn assert_invariant(plan: &Plan) {
    if plan.error.is_some() {
        assert!(plan.steps.is_empty(), "error plan has steps: {:?}", plan);
        assert_eq!(plan.confidence, 0.0, "error plan has confidence: {:?}", plan);
    }
    assert!((0.0..=1.0).contains(&plan.confidence));
}

#[test]
fn error_invariant_holds_for_assorted_inputs() {
    let tools = stats_tools();
    let inputs = [
        "",
        "   ",
        "not json at all",
        "{",
        "```json\n{broken\n```",
        "42",
        "\"a string\"",
        "null",
        r#"{"answer": "np_mean"}"#,
        r#"{"plan": "np_mean", "confidence": 0.9}"#,
        r#"{"plan": [], "confidence": 0.9}"#,
        r#"{"plan": [{"tool": "zzz"}], "confidence": 0.9}"#,
        r#"{"actions": [{"tool": "np_std", "arguments": {"a": [1]}}]}"#,
        r#"{"action1": {"tool": "np_mean"}}"#,
        r#"[{"tool": "np_mean", "arguments": {"a": null}}]"#,
        r#"{"tools": ["np_mean"], "arguments": {}}"#,
        r#"Sure, here you go: {"plan": [{"tool": "np_mean", "arguments": {"a": [1]}, "why": ""}],
            "confidence": 0.7} Enjoy!"#,
    ];

    for input in inputs {
        assert_invariant(&normalize_plan(input, &tools));
    }
}

#[test]
fn np_mean_scenario() {
    let plan = normalize_plan(
        r#"{"plan":[{"tool":"np_mean","arguments":{"a":[1,2,3,4,5]},"why":"compute mean"}],
            "confidence":0.9}"#,
        &stats_tools(),
    );
    assert_eq!(
        plan,
        Plan::new(
            vec![PlanStep::new("np_mean", args(json!({"a": [1, 2, 3, 4, 5]})), "compute mean")],
            0.9
        )
    );
}

#[test]
fn canonical_plans_round_trip() {
    let original = Plan::new(
        vec![
            PlanStep::new("np_mean", args(json!({"a": [1, 2]})), "first"),
            PlanStep::new("np_std", args(json!({"a": [3, 4]})), ""),
        ],
        0.35,
    );
    let text = serde_json::to_string(&original).unwrap();
    assert_eq!(normalize_plan(&text, &stats_tools()), original);
}

#[test]
fn legacy_tools_arguments_equivalence() {
    let plan = normalize_plan(
        r#"{"tools": ["np_mean"], "arguments": {"np_mean": {"a": [1,2,3]}}, "reasoning": "x"}"#,
        &stats_tools(),
    );
    assert_eq!(
        serde_json::to_value(&plan.steps).unwrap(),
        json!([{"tool": "np_mean", "arguments": {"a": [1, 2, 3]}, "why": "x"}])
    );
    assert_eq!(plan.confidence, 0.0);
    assert_eq!(plan.reasoning.as_deref(), Some("x"));
}

#[test]
fn markdown_fences_are_transparent() {
    let tools = stats_tools();
    let bare = r#"{"plan": [], "confidence": 0.5}"#;
    let fenced = format!("```json\n{}\n```", bare);

    assert_eq!(normalize_plan(&fenced, &tools), normalize_plan(bare, &tools));
    assert_eq!(normalize_plan(bare, &tools).confidence, 0.5);
}

#[test]
fn fuzzy_boundary() {
    assert_eq!(best_match("mean", &["np_mean", "np_std"]), Some("np_mean"));
    assert_eq!(best_match("xyz", &["np_mean", "np_std"]), None);
}

#[test]
fn schema_synthesis_properties() {
    assert_eq!(synthesize(&[]), None);

    let tools = stats_tools();
    assert_eq!(synthesize(&tools), synthesize(&tools));

    let schema = synthesize(&tools).unwrap();
    let shapes = schema["properties"]["plan"]["items"]["properties"]["arguments"]["oneOf"]
        .as_array()
        .unwrap();
    assert_eq!(shapes.len(), 2);
    for shape in shapes {
        assert_eq!(shape["required"], json!(["a"]));
    }
}

#[test]
fn legacy_layouts_converge_on_the_same_steps() {
    let tools = stats_tools();
    let layouts = [
        r#"{"actions": [{"tool": "np_mean", "arguments": {"a": [1]}}]}"#,
        r#"{"action1": {"tool": "np_mean", "arguments": {"a": [1]}}}"#,
        r#"[{"function": "np_mean", "arguments": {"a": [1], "axis": "null"}}]"#,
    ];

    for layout in layouts {
        let plan = normalize_plan(layout, &tools);
        assert_eq!(plan.tool_names(), vec!["np_mean"], "layout: {}", layout);
        assert_eq!(plan.steps[0].arguments, args(json!({"a": [1]})));
        assert_eq!(plan.confidence, 0.8);
    }
}
