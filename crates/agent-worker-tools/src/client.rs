use crate::config::ToolsConfig;
use crate::error::ToolsError;
use crate::types::{ToolCallRequest, ToolCallResult, MISSING_CONFIG, REQUEST_FAILED};
use serde_json::Value;

#[derive(Debug, Clone)]
struct Endpoint {
    url: String,
    service_key: String,
}

/// Forwards tool invocations to the agent-tools gateway.
///
/// Each call is a single POST with no retry. The underlying `reqwest`
/// client is reused across calls, so connections are pooled the way
/// `reqwest` pools them by default.
#[derive(Debug, Clone)]
pub struct ToolsClient {
    http: reqwest::Client,
    endpoint: Option<Endpoint>,
}

impl ToolsClient {
    /// Builds a client from `config`.
    ///
    /// Emits one warning per missing setting. A client built without a URL
    /// or credential still works, but every call short-circuits with
    /// [`MISSING_CONFIG`].
    pub fn new(config: &ToolsConfig) -> Result<Self, ToolsError> {
        let missing = config.missing();
        for name in &missing {
            tracing::warn!(setting = *name, "{} is not set; tools will fail if called", name);
        }

        let endpoint = missing.is_empty().then(|| Endpoint {
            url: config.url.clone(),
            service_key: config.service_key.clone(),
        });

        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self { http, endpoint })
    }

    pub fn is_configured(&self) -> bool {
        self.endpoint.is_some()
    }

    /// Invokes `request.tool` on the gateway.
    ///
    /// Never fails: configuration and transport problems come back as a
    /// result with `ok: false`. A 2xx JSON body is returned untouched,
    /// whatever its shape; only non-2xx statuses and bodies that are not
    /// JSON count as failed requests.
    pub async fn call_tool(&self, request: &ToolCallRequest) -> ToolCallResult {
        let Some(endpoint) = &self.endpoint else {
            tracing::error!(tool = %request.tool, "missing agent-tools config, cannot call tool");
            return ToolCallResult::failure(MISSING_CONFIG, None);
        };

        match self.post(endpoint, request).await {
            Ok(result) => {
                tracing::debug!(tool = %request.tool, ok = result.ok(), "agent-tools call returned");
                result
            }
            Err(e) => {
                tracing::error!(tool = %request.tool, error = %e, "error calling agent-tools");
                ToolCallResult::failure(REQUEST_FAILED, Some(describe(&e)))
            }
        }
    }

    async fn post(
        &self,
        endpoint: &Endpoint,
        request: &ToolCallRequest,
    ) -> Result<ToolCallResult, reqwest::Error> {
        self.http
            .post(&endpoint.url)
            .bearer_auth(&endpoint.service_key)
            .json(request)
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await
            .map(ToolCallResult::from)
    }
}

/// Flattens a `reqwest` error and its sources into one line.
fn describe(error: &reqwest::Error) -> String {
    let mut message = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
