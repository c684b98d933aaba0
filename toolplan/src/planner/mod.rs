//! Plan construction: output schema, prompts, context, and normalization of
//! model responses into [`Plan`]s.

pub mod context;
pub mod extract;
pub mod fuzzy;
pub mod normalizer;
pub mod prompt;
pub mod schema;
pub mod shape;
pub mod types;

pub use context::{ContextProvider, PromptContext, SymbolicContext};
pub use fuzzy::{best_match, best_match_with_threshold, similarity, DEFAULT_MATCH_THRESHOLD};
pub use normalizer::{normalize_plan, PlanNormalizer};
pub use prompt::{assemble, AssembledPrompt};
pub use schema::{argument_violations, synthesize};
pub use shape::ResponseShape;
pub use types::{Plan, PlanStep};
