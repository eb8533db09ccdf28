//! Client for the external agent-tools gateway.
//!
//! Agents act on the outside world (creating leads, booking slots, ...)
//! through named tools hosted behind a single HTTP gateway. This crate
//! forwards one tool invocation per call and folds every outcome, including
//! missing configuration and transport failures, into a [`ToolCallResult`]
//! so callers never have to handle an error path.

pub mod client;
pub mod config;
pub mod error;
pub mod types;

pub use client::ToolsClient;
pub use config::ToolsConfig;
pub use error::ToolsError;
pub use types::{ToolCallRequest, ToolCallResult, MISSING_CONFIG, REQUEST_FAILED};
