use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

fn default_timeout_ms() -> u64 {
    15_000
}

/// Where the tools gateway lives and how to authenticate against it.
///
/// Empty strings mean "not configured".
#[derive(Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    #[serde(default)]
    pub url: String,
    /// Bearer credential sent with every call.
    #[serde(default, skip_serializing)]
    pub service_key: String,
    /// Per-request timeout in milliseconds. Default: 15000.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            service_key: String::new(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl fmt::Debug for ToolsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolsConfig")
            .field("url", &self.url)
            .field("service_key", &"[REDACTED]")
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

impl ToolsConfig {
    pub fn new(url: impl Into<String>, service_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            service_key: service_key.into(),
            timeout_ms: default_timeout_ms(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Names of the required settings that are empty, in env-var form.
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.url.trim().is_empty() {
            missing.push("AGENT_TOOLS_URL");
        }
        if self.service_key.trim().is_empty() {
            missing.push("SUPABASE_SERVICE_ROLE_KEY");
        }
        missing
    }
}
