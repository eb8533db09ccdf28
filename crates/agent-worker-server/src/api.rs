//! HTTP handlers for the worker.

use crate::session::SessionParams;
use crate::AppState;
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, Extension},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;

/// Request body for `POST /start-agent`.
#[derive(Debug, Default, Deserialize)]
pub struct StartRequest {
    #[serde(rename = "roomName")]
    pub room_name: Option<String>,
    #[serde(rename = "agentId")]
    pub agent_id: Option<String>,
    #[serde(rename = "sessionId")]
    pub session_id: Option<String>,
    /// Opaque agent configuration, passed through to the session routine.
    pub config: Option<Value>,
}

impl StartRequest {
    /// Parses a raw request body.
    ///
    /// An empty body, `null` or a non-object JSON value is treated as an
    /// empty request. Malformed JSON or wrongly-typed fields are errors.
    pub fn from_body(body: &[u8]) -> Result<Self, serde_json::Error> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        match serde_json::from_slice::<Value>(body)? {
            value @ Value::Object(_) => serde_json::from_value(value),
            _ => Ok(Self::default()),
        }
    }
}

/// Whether the request declares a JSON body (`application/json` or a
/// `+json` subtype). Parameters such as `charset` are ignored.
fn is_json_content_type(headers: &HeaderMap) -> bool {
    let Some(value) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
    else {
        return false;
    };
    let mime = value
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
}

/// Acknowledgment for an accepted start request.
///
/// Absent and `null` ids are both left out.
#[derive(Debug, Serialize, Deserialize)]
pub struct StartResponse {
    pub ok: bool,
    pub message: String,
    #[serde(rename = "roomName")]
    pub room_name: String,
    #[serde(rename = "agentId", skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    #[serde(rename = "sessionId", skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// API error type mapping to HTTP status codes.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("missing_roomName")]
    MissingRoomName,
    #[error("payload_too_large: {0}")]
    PayloadTooLarge(String),
    #[error("server_error: {0}")]
    ServerError(String),
}

impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(rejection.body_text())
        } else {
            ApiError::ServerError(rejection.body_text())
        }
    }
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::MissingRoomName => "missing_roomName",
            ApiError::PayloadTooLarge(_) => "payload_too_large",
            ApiError::ServerError(_) => "server_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.code();
        match self {
            ApiError::MissingRoomName => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "ok": false, "error": code })),
            )
                .into_response(),
            ApiError::PayloadTooLarge(details) => {
                tracing::warn!(details = details.as_str(), "request body rejected");
                (
                    StatusCode::PAYLOAD_TOO_LARGE,
                    Json(json!({ "ok": false, "error": code, "details": details })),
                )
                    .into_response()
            }
            ApiError::ServerError(details) => {
                tracing::error!(details = details.as_str(), "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "ok": false, "error": code, "details": details })),
                )
                    .into_response()
            }
        }
    }
}

/// Handler for `GET /health`.
pub async fn health_handler() -> Json<Value> {
    Json(json!({ "ok": true, "status": "healthy" }))
}

/// Handler for `POST /start-agent`.
///
/// Validates the request, launches the session routine and acknowledges
/// without waiting for it. The routine's outcome is never reported here.
///
/// A body not declared as JSON is not parsed at all, so it ends up as a
/// missing `roomName`.
pub async fn start_agent_handler(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<StartResponse>, ApiError> {
    let request = if is_json_content_type(&headers) {
        StartRequest::from_body(&body?).map_err(|e| ApiError::ServerError(e.to_string()))?
    } else {
        StartRequest::default()
    };

    let room_name = request
        .room_name
        .filter(|name| !name.is_empty())
        .ok_or(ApiError::MissingRoomName)?;

    tracing::info!(
        room = room_name.as_str(),
        agent_id = ?request.agent_id,
        session_id = ?request.session_id,
        "starting agent"
    );

    let handle = state.launcher.launch(SessionParams {
        room_name: room_name.clone(),
        agent_id: request.agent_id.clone(),
        session_id: request.session_id.clone(),
        config: request.config,
    });
    tracing::debug!(run_id = %handle.run_id(), "session routine detached");

    Ok(Json(StartResponse {
        ok: true,
        message: "Agent started".to_string(),
        room_name,
        agent_id: request.agent_id,
        session_id: request.session_id,
    }))
}
