use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::error::{Result, SpotifyError};

pub mod builtin;
pub mod executor;

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn params(&self) -> Vec<ParamSpec> {
        Vec::new()
    }
    fn parameters_schema(&self) -> Value {
        object_schema(&self.params())
    }
    async fn execute(&self, args: &Args) -> Result<Outcome>;
}

/// What an operation reports back. Rendered to a single string at the boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success(String),
    /// An expected empty result: nothing playing, no search hit, no match.
    Empty(String),
    Failure(String),
}

impl Outcome {
    pub fn success(message: impl Into<String>) -> Self {
        Outcome::Success(message.into())
    }

    pub fn empty(message: impl Into<String>) -> Self {
        Outcome::Empty(message.into())
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Success(message) | Outcome::Empty(message) => f.write_str(message),
            Outcome::Failure(description) => write!(f, "Error: {}", description),
        }
    }
}

/// Rejections that happen before a handler runs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DispatchError {
    #[error("Operation not found: {0}")]
    OperationNotFound(String),

    #[error("Missing required parameter '{0}'")]
    MissingParameter(String),

    #[error("Parameter '{name}' must be {expected}")]
    InvalidParameter { name: String, expected: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    String,
    Integer,
    Float,
    Boolean,
}

impl ParamKind {
    pub fn json_type(&self) -> &'static str {
        match self {
            ParamKind::String => "string",
            ParamKind::Integer => "integer",
            ParamKind::Float => "number",
            ParamKind::Boolean => "boolean",
        }
    }

    fn expected(&self) -> &'static str {
        match self {
            ParamKind::String => "a string",
            ParamKind::Integer => "an integer",
            ParamKind::Float => "a number",
            ParamKind::Boolean => "a boolean",
        }
    }

    /// Normalizes a JSON value to this kind, or `None` if it does not fit.
    fn coerce(&self, value: &Value) -> Option<Value> {
        match self {
            ParamKind::String => value.as_str().map(|s| json!(s)),
            ParamKind::Integer => value
                .as_i64()
                .or_else(|| {
                    value
                        .as_f64()
                        .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                        .map(|f| f as i64)
                })
                .map(|i| json!(i)),
            ParamKind::Float => value.as_f64().map(|f| json!(f)),
            ParamKind::Boolean => value.as_bool().map(|b| json!(b)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub description: &'static str,
    /// `None` means required; `Some(Value::Null)` means optional and unset.
    pub default: Option<Value>,
}

impl ParamSpec {
    pub fn required(name: &'static str, kind: ParamKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            description,
            default: None,
        }
    }

    pub fn optional(name: &'static str, kind: ParamKind, description: &'static str) -> Self {
        Self {
            default: Some(Value::Null),
            ..Self::required(name, kind, description)
        }
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }
}

pub fn object_schema(params: &[ParamSpec]) -> Value {
    let mut properties = Map::new();
    for param in params {
        let mut property = json!({
            "type": param.kind.json_type(),
            "description": param.description,
        });
        if let Some(default) = param.default.as_ref().filter(|d| !d.is_null()) {
            property["default"] = default.clone();
        }
        properties.insert(param.name.to_string(), property);
    }

    let required: Vec<&str> = params
        .iter()
        .filter(|p| p.is_required())
        .map(|p| p.name)
        .collect();

    json!({
        "type": "object",
        "properties": properties,
        "required": required
    })
}

/// Arguments after validation: every declared parameter is either present
/// with the declared kind or was optional and left unset.
#[derive(Debug, Clone, Default)]
pub struct Args {
    values: Map<String, Value>,
}

impl Args {
    pub fn resolve(
        specs: &[ParamSpec],
        raw: &Value,
    ) -> std::result::Result<Self, DispatchError> {
        let supplied = raw.as_object();
        let mut values = Map::new();

        for spec in specs {
            let given = supplied
                .and_then(|m| m.get(spec.name))
                .filter(|v| !(v.is_null() && !spec.is_required()));

            let value = match (given, &spec.default) {
                (Some(v), _) => spec.kind.coerce(v).ok_or_else(|| {
                    DispatchError::InvalidParameter {
                        name: spec.name.to_string(),
                        expected: spec.kind.expected(),
                    }
                })?,
                (None, Some(default)) => default.clone(),
                (None, None) => {
                    return Err(DispatchError::MissingParameter(spec.name.to_string()))
                }
            };

            if !value.is_null() {
                values.insert(spec.name.to_string(), value);
            }
        }

        Ok(Self { values })
    }

    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, Value)>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        }
    }

    fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    fn missing(name: &str) -> SpotifyError {
        SpotifyError::InvalidArgument(format!("missing '{}'", name))
    }

    pub fn string(&self, name: &str) -> Result<&str> {
        self.get(name)
            .and_then(Value::as_str)
            .ok_or_else(|| Self::missing(name))
    }

    pub fn integer(&self, name: &str) -> Result<i64> {
        self.get(name)
            .and_then(Value::as_i64)
            .ok_or_else(|| Self::missing(name))
    }

    pub fn boolean(&self, name: &str) -> Result<bool> {
        self.get(name)
            .and_then(Value::as_bool)
            .ok_or_else(|| Self::missing(name))
    }

    pub fn opt_float(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_f64)
    }
}

pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        if self.tools.insert(name.clone(), tool).is_some() {
            tracing::warn!("Tool '{}' registered twice, keeping the latest", name);
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// All tools, sorted by name so listings are stable.
    pub fn list_tools(&self) -> Vec<Arc<dyn Tool>> {
        let mut tools: Vec<_> = self.tools.values().cloned().collect();
        tools.sort_by(|a, b| a.name().cmp(b.name()));
        tools
    }

    pub fn get_definitions(&self) -> Vec<Value> {
        self.list_tools()
            .iter()
            .map(|tool| {
                json!({
                    "type": "function",
                    "function": {
                        "name": tool.name(),
                        "description": tool.description(),
                        "parameters": tool.parameters_schema()
                    }
                })
            })
            .collect()
    }
}
