//! Prompt assembly
//!
//! Renders the system and user prompts from the configured templates. The
//! system template's `{tools}` placeholder receives a bullet list of tools;
//! the user template's `{query}` placeholder receives the query verbatim.

use serde_json::Value;

use crate::config::ReasoningSettings;
use crate::tools::{ParamSpec, ToolDescriptor};

/// A rendered prompt pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledPrompt {
    pub system: String,
    pub user: String,
}

impl AssembledPrompt {
    /// The single text sent to completion-style backends.
    pub fn combined(&self) -> String {
        format!("{}\n\n{}", self.system, self.user)
    }
}

/// Render both prompts. Missing templates fall back to the defaults; this
/// never fails.
pub fn assemble(
    settings: &ReasoningSettings,
    tools: &[ToolDescriptor],
    query: &str,
    context: Option<&str>,
) -> AssembledPrompt {
    let mut system = settings
        .system_template()
        .replace("{tools}", &render_tools(tools));

    if let Some(context) = context.filter(|c| !c.trim().is_empty()) {
        system.push_str("\n\nContext:\n");
        system.push_str(context);
    }

    let user = settings.user_template().replace("{query}", query);

    AssembledPrompt { system, user }
}

/// Bullet rendering of every tool, one block per tool.
pub fn render_tools(tools: &[ToolDescriptor]) -> String {
    tools.iter().map(render_tool).collect::<Vec<_>>().join("\n")
}

fn render_tool(tool: &ToolDescriptor) -> String {
    let mut out = format!("- {}: {}", tool.name, tool.description);
    if !tool.parameters.is_empty() {
        out.push_str("\n  Parameters:");
        for param in &tool.parameters {
            out.push_str("\n    ");
            out.push_str(&render_param(param));
        }
    }
    out.push_str("\n  Example arguments: ");
    out.push_str(&tool.example_arguments().to_string());
    out
}

fn render_param(param: &ParamSpec) -> String {
    let annotation = if param.required {
        "[required]".to_string()
    } else {
        let default = match &param.default {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => "none".to_string(),
        };
        format!("[default: {}]", default)
    };
    format!(
        "{} ({}): {} {}",
        param.name, param.json_type, param.description, annotation
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{normalize_tool, RawToolEntry};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn tools() -> Vec<ToolDescriptor> {
        vec![
            normalize_tool(
                &RawToolEntry::new("np_mean", "Calculate the mean")
                    .with_parameter("a", "array", true, "Input array")
                    .with_default_parameter("axis", "int", json!(0), "Axis"),
            ),
            normalize_tool(&RawToolEntry::new("now", "Current time")),
        ]
    }

    #[test]
    fn renders_tool_bullets() {
        assert_eq!(
            render_tools(&tools()),
            concat!(
                "- np_mean: Calculate the mean\n",
                "  Parameters:\n",
                "    a (array): Input array [required]\n",
                "    axis (integer): Axis [default: 0]\n",
                "  Example arguments: {\"a\":[],\"axis\":1}\n",
                "- now: Current time\n",
                "  Example arguments: {}"
            )
        );
    }

    #[test]
    fn substitutes_templates_and_appends_context() {
        let settings = ReasoningSettings {
            system_prompt_template: Some("Tools:\n{tools}".to_string()),
            user_prompt_template: Some("Q: {query}".to_string()),
            json_extraction_regex: None,
        };
        let prompt = assemble(&settings, &tools()[1..], "what time is it?", Some("Use UTC."));

        assert_eq!(
            prompt.system,
            "Tools:\n- now: Current time\n  Example arguments: {}\n\nContext:\nUse UTC."
        );
        assert_eq!(prompt.user, "Q: what time is it?");
    }

    #[test]
    fn blank_context_is_ignored_and_defaults_apply() {
        let prompt = assemble(&ReasoningSettings::default(), &tools(), "mean of [1,2]", Some("  "));
        assert!(prompt.system.starts_with("You are an AI assistant that creates action plans"));
        assert!(prompt.system.contains("- np_mean: Calculate the mean"));
        assert!(!prompt.system.contains("Context:"));
        assert_eq!(prompt.user, "User query: mean of [1,2]");
        assert_eq!(prompt.combined(), format!("{}\n\n{}", prompt.system, prompt.user));
    }

    #[test]
    fn query_braces_are_kept_verbatim() {
        let prompt = assemble(&ReasoningSettings::default(), &[], "use {tools} literally", None);
        assert_eq!(prompt.user, "User query: use {tools} literally");
    }
}
