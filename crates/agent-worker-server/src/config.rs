//! Worker configuration loading from file and environment variables.

use agent_worker_tools::ToolsConfig;
use agent_worker_voice::LiveKitConfig;
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use thiserror::Error;

/// Top-level worker configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// LiveKit credentials used to mint agent room tokens.
    #[serde(default)]
    pub livekit: LiveKitConfig,

    /// Agent-tools gateway settings.
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Session routine behavior.
    #[serde(default)]
    pub session: SessionConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Network configuration for the HTTP server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Run the `create_lead` demo tool call when an agent id is supplied.
    #[serde(default = "default_demo_tool_call")]
    pub demo_tool_call: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g. "info", "agent_worker_server=debug,info").
    /// `silent` drops informational output but keeps warnings and errors.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

impl LoggingConfig {
    /// The `EnvFilter` directive for this level.
    pub fn filter_directive(&self) -> &str {
        if self.level.trim().eq_ignore_ascii_case("silent") {
            "warn"
        } else {
            &self.level
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8080
}

fn default_demo_tool_call() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            demo_tool_call: default_demo_tool_call(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Loads configuration from a TOML file, falling back to defaults, then
/// applies overrides from the process environment.
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                Config::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

/// Applies environment variable overrides using `lookup`.
///
/// - `HOST`, `PORT` override `server.*`
/// - `LIVEKIT_URL`, `LIVEKIT_API_KEY`, `LIVEKIT_API_SECRET`,
///   `LIVEKIT_TOKEN_TTL_SECONDS` override `livekit.*`
/// - `AGENT_TOOLS_URL`, `SUPABASE_SERVICE_ROLE_KEY`, `AGENT_TOOLS_TIMEOUT_MS`
///   override `tools.*`
/// - `DEMO_TOOL_CALL` overrides `session.demo_tool_call`
/// - `LOG_LEVEL`, `LOG_JSON` override `logging.*`
///
/// Values that fail to parse are ignored.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(parsed) = lookup("HOST").and_then(|v| v.parse().ok()) {
        config.server.host = parsed;
    }
    if let Some(parsed) = lookup("PORT").and_then(|v| v.parse().ok()) {
        config.server.port = parsed;
    }

    if let Some(url) = lookup("LIVEKIT_URL") {
        config.livekit.url = url;
    }
    if let Some(key) = lookup("LIVEKIT_API_KEY") {
        config.livekit.api_key = key;
    }
    if let Some(secret) = lookup("LIVEKIT_API_SECRET") {
        config.livekit.api_secret = secret;
    }
    if let Some(parsed) = lookup("LIVEKIT_TOKEN_TTL_SECONDS").and_then(|v| v.parse().ok()) {
        config.livekit.token_ttl_seconds = parsed;
    }

    if let Some(url) = lookup("AGENT_TOOLS_URL") {
        config.tools.url = url;
    }
    if let Some(key) = lookup("SUPABASE_SERVICE_ROLE_KEY") {
        config.tools.service_key = key;
    }
    if let Some(parsed) = lookup("AGENT_TOOLS_TIMEOUT_MS").and_then(|v| v.parse().ok()) {
        config.tools.timeout_ms = parsed;
    }

    if let Some(enabled) = lookup("DEMO_TOOL_CALL").and_then(|v| parse_bool(&v)) {
        config.session.demo_tool_call = enabled;
    }

    if let Some(level) = lookup("LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(json) = lookup("LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
