//! Sequential plan execution against a tool registry.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::planner::Plan;
use crate::tools::ToolRegistry;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionOptions {
    /// Keep running later steps after a failed one
    #[serde(default)]
    pub continue_on_error: bool,
}

/// Result of one executed step; exactly one of `result` and `error` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepOutcome {
    pub tool: String,
    pub arguments: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StepOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionReport {
    pub outcomes: Vec<StepOutcome>,
    /// Set when the plan carried an error and nothing ran
    pub skipped: bool,
}

impl ExecutionReport {
    pub fn succeeded(&self) -> bool {
        !self.skipped && self.outcomes.iter().all(StepOutcome::is_success)
    }

    /// Result of the last step, if it succeeded.
    pub fn final_result(&self) -> Option<&Value> {
        self.outcomes.last().and_then(|o| o.result.as_ref())
    }
}

/// Run `plan`'s steps in order through `registry`.
pub async fn execute_plan(
    plan: &Plan,
    registry: &dyn ToolRegistry,
    options: ExecutionOptions,
) -> ExecutionReport {
    if let Some(error) = &plan.error {
        debug!(%error, "not executing error plan");
        return ExecutionReport {
            outcomes: Vec::new(),
            skipped: true,
        };
    }

    let mut outcomes = Vec::with_capacity(plan.steps.len());
    for (index, step) in plan.steps.iter().enumerate() {
        debug!(step = index + 1, tool = %step.tool, "executing step");
        let outcome = match registry
            .call_tool(&step.tool, Value::Object(step.arguments.clone()))
            .await
        {
            Ok(result) => StepOutcome {
                tool: step.tool.clone(),
                arguments: step.arguments.clone(),
                result: Some(result),
                error: None,
            },
            Err(e) => {
                warn!(step = index + 1, tool = %step.tool, error = %e, "step failed");
                StepOutcome {
                    tool: step.tool.clone(),
                    arguments: step.arguments.clone(),
                    result: None,
                    error: Some(e.to_string()),
                }
            }
        };

        let failed = !outcome.is_success();
        outcomes.push(outcome);
        if failed && !options.continue_on_error {
            break;
        }
    }

    info!(
        executed = outcomes.len(),
        planned = plan.steps.len(),
        "plan execution finished"
    );
    ExecutionReport {
        outcomes,
        skipped: false,
    }
}
