//! Progress events for detached session routines.
//!
//! A session routine runs after the HTTP response has been sent, so
//! nothing it does can reach the original caller. Instead each step is
//! logged and broadcast as a [`SessionRecord`]; anything that wants to
//! watch sessions (tests, a future status endpoint) subscribes.

use agent_worker_tools::ToolCallResult;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Default buffer size for the session event channel.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// One step of a session routine.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionEvent {
    SessionStarted {
        agent_id: Option<String>,
        session_id: Option<String>,
    },
    /// The routine stopped before finishing. `missing` lists unset config
    /// keys when that was the cause.
    SessionAborted {
        reason: String,
        missing: Vec<String>,
    },
    CredentialMinted {
        identity: String,
    },
    ToolDemoSkipped {
        reason: String,
    },
    ToolDemoCalled {
        tool: String,
        result: ToolCallResult,
    },
    SessionCompleted,
}

impl SessionEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::SessionStarted { .. } => "SESSION_STARTED",
            Self::SessionAborted { .. } => "SESSION_ABORTED",
            Self::CredentialMinted { .. } => "CREDENTIAL_MINTED",
            Self::ToolDemoSkipped { .. } => "TOOL_DEMO_SKIPPED",
            Self::ToolDemoCalled { .. } => "TOOL_DEMO_CALLED",
            Self::SessionCompleted => "SESSION_COMPLETED",
        }
    }
}

/// A [`SessionEvent`] stamped with the run it belongs to.
#[derive(Debug, Clone, Serialize)]
pub struct SessionRecord {
    pub run_id: Uuid,
    pub room_name: String,
    pub at: DateTime<Utc>,
    #[serde(flatten)]
    pub event: SessionEvent,
}

/// Sink for session events: logs each one and fans it out to subscribers.
#[derive(Debug, Clone)]
pub struct SessionEvents {
    tx: broadcast::Sender<SessionRecord>,
}

impl Default for SessionEvents {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

impl SessionEvents {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionRecord> {
        self.tx.subscribe()
    }

    pub fn emit(&self, run_id: Uuid, room_name: &str, event: SessionEvent) {
        log_event(run_id, room_name, &event);

        let record = SessionRecord {
            run_id,
            room_name: room_name.to_string(),
            at: Utc::now(),
            event,
        };
        // No subscribers is the normal case outside of tests.
        if self.tx.send(record).is_err() {
            tracing::trace!(%run_id, "no session event subscribers");
        }
    }
}

fn log_event(run_id: Uuid, room: &str, event: &SessionEvent) {
    match event {
        SessionEvent::SessionStarted { .. } => {
            tracing::info!(%run_id, room, "agent loop starting");
        }
        SessionEvent::SessionAborted { reason, missing } => {
            tracing::error!(%run_id, room, ?missing, "cannot start agent: {}", reason);
        }
        SessionEvent::CredentialMinted { identity } => {
            tracing::info!(
                %run_id,
                room,
                identity = identity.as_str(),
                "generated agent LiveKit token (not printed)"
            );
        }
        SessionEvent::ToolDemoSkipped { reason } => {
            tracing::debug!(%run_id, room, reason = reason.as_str(), "demo tool call skipped");
        }
        SessionEvent::ToolDemoCalled { tool, result } => {
            let rendered = serde_json::to_string(result).unwrap_or_default();
            if result.ok() {
                tracing::info!(%run_id, room, tool = tool.as_str(), result = %rendered, "tool call result");
            } else {
                tracing::warn!(%run_id, room, tool = tool.as_str(), result = %rendered, "demo tool call failed");
            }
        }
        SessionEvent::SessionCompleted => {
            tracing::info!(%run_id, room, "agent session skeleton complete");
        }
    }
}
