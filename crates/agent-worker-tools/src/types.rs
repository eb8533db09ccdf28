//! Wire types for tool invocations.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Error code returned when the gateway URL or bearer credential is unset.
pub const MISSING_CONFIG: &str = "missing_agent_tools_config";

/// Error code returned when the gateway call itself failed.
pub const REQUEST_FAILED: &str = "agent_tools_request_failed";

/// A single tool invocation, serialized as the gateway's request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    pub tool: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default)]
    pub args: Map<String, Value>,
}

impl ToolCallRequest {
    pub fn new(tool: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            agent_id: None,
            session_id: None,
            args: Map::new(),
        }
    }

    pub fn with_agent_id(mut self, agent_id: Option<String>) -> Self {
        self.agent_id = agent_id;
        self
    }

    pub fn with_session_id(mut self, session_id: Option<String>) -> Self {
        self.session_id = session_id;
        self
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.args.insert(key.into(), value.into());
        self
    }
}

/// Normalized outcome of a tool call.
///
/// On success this is the gateway's response body exactly as received; it
/// is not re-validated, so the accessors below are lenient. Failures built
/// locally have the shape `{ ok: false, error, details? }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToolCallResult(Value);

impl ToolCallResult {
    pub fn failure(error: &str, details: Option<String>) -> Self {
        let mut body = Map::new();
        body.insert("ok".to_string(), Value::Bool(false));
        body.insert("error".to_string(), Value::String(error.to_string()));
        if let Some(details) = details {
            body.insert("details".to_string(), Value::String(details));
        }
        Self(Value::Object(body))
    }

    /// `true` only when the body carries `"ok": true`.
    pub fn ok(&self) -> bool {
        self.0.get("ok").and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn tool(&self) -> Option<&str> {
        self.0.get("tool").and_then(Value::as_str)
    }

    pub fn result(&self) -> Option<&Value> {
        self.0.get("result")
    }

    pub fn error(&self) -> Option<&str> {
        self.0.get("error").and_then(Value::as_str)
    }

    /// Free-form failure detail, if the result carries one.
    pub fn details(&self) -> Option<&str> {
        self.0.get("details").and_then(Value::as_str)
    }

    /// Any top-level field of the body.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<Value> for ToolCallResult {
    fn from(body: Value) -> Self {
        Self(body)
    }
}
