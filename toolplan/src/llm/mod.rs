//! Model backends.

pub mod backend;
pub mod ollama;
pub mod stub;

pub use backend::{BackendInfo, GenerateRequest, ModelBackend};
pub use ollama::OllamaBackend;
pub use stub::StubBackend;
