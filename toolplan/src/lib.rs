//! Schema-constrained tool planning with language models.
//!
//! A query and a tool listing go in; an ordered [`Plan`] of tool invocations
//! comes out. Tool metadata is normalized into [`ToolDescriptor`]s, turned
//! into an output JSON Schema for backends that can enforce one, and the
//! model's answer (in whichever of several historical layouts it arrives) is
//! normalized back into a canonical plan with fuzzy tool-name recovery.
//!
//! ```no_run
//! use toolplan::{load_config, ReasoningEngine, JsonRpcToolRegistry};
//! use std::time::Duration;
//!
//! # async fn run() -> toolplan::Result<()> {
//! let engine = ReasoningEngine::from_config(load_config("reasoning_config.yaml")?)?;
//! let registry = JsonRpcToolRegistry::new("http://localhost:8000/mcp", Duration::from_secs(30))?;
//! let plan = engine.reason_with_registry("mean of [1, 2, 3]", &registry).await;
//! if let Some(error) = &plan.error {
//!     eprintln!("planning failed: {error}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod executor;
pub mod llm;
pub mod planner;
pub mod tools;

pub use config::{load_config, validate_config, ReasonerConfig};
pub use engine::ReasoningEngine;
pub use error::{BackendError, ConfigError, ParseError, RegistryError, Result, ToolplanError};
pub use executor::{execute_plan, ExecutionOptions, ExecutionReport, StepOutcome};
pub use llm::{GenerateRequest, ModelBackend, OllamaBackend, StubBackend};
pub use planner::{
    best_match, normalize_plan, synthesize, ContextProvider, Plan, PlanNormalizer, PlanStep,
    PromptContext, SymbolicContext,
};
pub use tools::{
    normalize_tool, JsonRpcToolRegistry, RawToolEntry, StaticToolRegistry, ToolDescriptor,
    ToolRegistry,
};
