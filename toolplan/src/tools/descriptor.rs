//! Tool descriptor normalization
//!
//! Registries describe tool parameters in one of two shapes: a free-form
//! `parameters` mapping whose `type` strings use host-language names
//! (`int`, `list`, `dict`, ...), or an MCP-style `inputSchema` that is
//! already JSON Schema. [`normalize_tool`] reduces both to one ordered list
//! of [`ParamSpec`]s. A descriptor's parameters always come from exactly one
//! of the two sources.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Tool metadata as delivered by a registry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawToolEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Map<String, Value>>,
    #[serde(
        default,
        rename = "inputSchema",
        alias = "input_schema",
        skip_serializing_if = "Option::is_none"
    )]
    pub input_schema: Option<Value>,
}

impl RawToolEntry {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: Some(description.into()),
            parameters: None,
            input_schema: None,
        }
    }

    /// Add an entry to the `parameters` mapping.
    pub fn with_parameter(
        mut self,
        name: impl Into<String>,
        type_name: &str,
        required: bool,
        description: impl Into<String>,
    ) -> Self {
        self.parameters.get_or_insert_with(Map::new).insert(
            name.into(),
            json!({
                "type": type_name,
                "required": required,
                "description": description.into(),
            }),
        );
        self
    }

    /// Add an optional `parameters` entry carrying a default value.
    pub fn with_default_parameter(
        mut self,
        name: impl Into<String>,
        type_name: &str,
        default: Value,
        description: impl Into<String>,
    ) -> Self {
        self.parameters.get_or_insert_with(Map::new).insert(
            name.into(),
            json!({
                "type": type_name,
                "required": false,
                "default": default,
                "description": description.into(),
            }),
        );
        self
    }

    pub fn with_input_schema(mut self, schema: Value) -> Self {
        self.input_schema = Some(schema);
        self
    }
}

/// The JSON Schema primitive a parameter maps onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
}

impl JsonType {
    /// Case-insensitive lookup of a free-form type name. Unknown names map to
    /// [`JsonType::String`].
    pub fn from_type_name(type_name: &str) -> Self {
        match type_name.trim().to_lowercase().as_str() {
            "string" | "str" => JsonType::String,
            "integer" | "int" => JsonType::Integer,
            "number" | "float" => JsonType::Number,
            "boolean" | "bool" => JsonType::Boolean,
            "array" | "list" => JsonType::Array,
            "object" | "dict" => JsonType::Object,
            _ => JsonType::String,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JsonType::String => "string",
            JsonType::Integer => "integer",
            JsonType::Number => "number",
            JsonType::Boolean => "boolean",
            JsonType::Array => "array",
            JsonType::Object => "object",
        }
    }

    /// Illustrative value for prompts. Never used for execution.
    pub fn example_value(&self) -> Value {
        match self {
            JsonType::Integer => json!(1),
            JsonType::Number => json!(1.0),
            JsonType::Boolean => json!(true),
            JsonType::Array => json!([]),
            JsonType::Object => json!({}),
            JsonType::String => json!("example"),
        }
    }
}

impl std::fmt::Display for JsonType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One normalized tool parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    pub name: String,
    pub json_type: JsonType,
    pub required: bool,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl ParamSpec {
    pub fn example_value(&self) -> Value {
        self.json_type.example_value()
    }
}

/// Normalized metadata for one invocable tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub parameters: Vec<ParamSpec>,
}

impl ToolDescriptor {
    pub fn param(&self, name: &str) -> Option<&ParamSpec> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn required_params(&self) -> impl Iterator<Item = &ParamSpec> {
        self.parameters.iter().filter(|p| p.required)
    }

    /// Example arguments object built from each parameter's example value.
    pub fn example_arguments(&self) -> Value {
        let mut args = Map::new();
        for param in &self.parameters {
            args.insert(param.name.clone(), param.example_value());
        }
        Value::Object(args)
    }

    /// JSON Schema for this tool's `arguments` object: its own properties and
    /// required list, nothing else.
    pub fn argument_schema(&self) -> Value {
        let mut properties = Map::new();
        for param in &self.parameters {
            properties.insert(
                param.name.clone(),
                json!({
                    "type": param.json_type.as_str(),
                    "description": param.description,
                }),
            );
        }

        let mut schema = Map::new();
        schema.insert("type".to_string(), json!("object"));
        schema.insert("properties".to_string(), Value::Object(properties));

        let required: Vec<Value> = self
            .required_params()
            .map(|p| Value::String(p.name.clone()))
            .collect();
        if !required.is_empty() {
            schema.insert("required".to_string(), Value::Array(required));
        }
        Value::Object(schema)
    }
}

/// Normalize raw registry metadata into a [`ToolDescriptor`].
///
/// An object-typed `inputSchema` wins; otherwise the `parameters` mapping is
/// used. Pure function of its input.
pub fn normalize_tool(tool: &RawToolEntry) -> ToolDescriptor {
    let parameters = match tool.input_schema.as_ref().and_then(object_schema) {
        Some(schema) => params_from_input_schema(schema),
        None => tool
            .parameters
            .as_ref()
            .map(params_from_mapping)
            .unwrap_or_default(),
    };

    ToolDescriptor {
        name: tool.name.clone(),
        description: tool
            .description
            .clone()
            .unwrap_or_else(|| "No description".to_string()),
        parameters,
    }
}

/// Normalize a whole registry listing, keeping its order.
pub fn normalize_tools(tools: &[RawToolEntry]) -> Vec<ToolDescriptor> {
    tools.iter().map(normalize_tool).collect()
}

fn object_schema(schema: &Value) -> Option<&Map<String, Value>> {
    let obj = schema.as_object()?;
    (obj.get("type").and_then(Value::as_str) == Some("object")).then_some(obj)
}

fn params_from_input_schema(schema: &Map<String, Value>) -> Vec<ParamSpec> {
    let required: Vec<&str> = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return Vec::new();
    };

    properties
        .iter()
        .map(|(name, info)| ParamSpec {
            name: name.clone(),
            json_type: schema_property_type(info),
            required: required.contains(&name.as_str()),
            description: description_of(name, info),
            default: info.get("default").cloned(),
        })
        .collect()
}

fn params_from_mapping(parameters: &Map<String, Value>) -> Vec<ParamSpec> {
    parameters
        .iter()
        .map(|(name, info)| ParamSpec {
            name: name.clone(),
            json_type: JsonType::from_type_name(
                info.get("type").and_then(Value::as_str).unwrap_or("Any"),
            ),
            required: info
                .get("required")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            description: description_of(name, info),
            default: info.get("default").cloned(),
        })
        .collect()
}

/// `type` may be a single name or a list such as `["array", "null"]`.
fn schema_property_type(info: &Value) -> JsonType {
    match info.get("type") {
        Some(Value::String(name)) => JsonType::from_type_name(name),
        Some(Value::Array(names)) => names
            .iter()
            .filter_map(Value::as_str)
            .find(|name| *name != "null")
            .map(JsonType::from_type_name)
            .unwrap_or(JsonType::String),
        _ => JsonType::String,
    }
}

fn description_of(name: &str, info: &Value) -> String {
    info.get("description")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("Parameter {}", name))
}
