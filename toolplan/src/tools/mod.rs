//! Tool metadata and registries.

pub mod descriptor;
pub mod registry;

pub use descriptor::{
    normalize_tool, normalize_tools, JsonType, ParamSpec, RawToolEntry, ToolDescriptor,
};
pub use registry::{JsonRpcToolRegistry, StaticToolRegistry, ToolHandler, ToolRegistry};
