//! Session launcher and the detached session routine.
//!
//! `POST /start-agent` hands a validated request to [`SessionLauncher::launch`],
//! which spawns the routine and returns a [`SessionHandle`] right away. The
//! routine mints the agent's room credential and, when enabled, exercises the
//! tools gateway once with a demo call.
//!
//! Joining the room with the credential, streaming audio to STT, driving the
//! LLM with tools and publishing TTS audio are not implemented yet; the
//! credential is dropped once minted.

use crate::config::Config;
use crate::events::{SessionEvent, SessionEvents};
use agent_worker_tools::{ToolCallRequest, ToolCallResult, ToolsClient, ToolsError};
use agent_worker_voice::{VoiceError, VoiceService};
use serde_json::Value;
use std::sync::Arc;
use tokio::task::{JoinError, JoinHandle};
use uuid::Uuid;

/// Tool invoked by the demo call.
pub const DEMO_TOOL: &str = "create_lead";

/// Inputs for one session routine.
#[derive(Debug, Clone, Default)]
pub struct SessionParams {
    pub room_name: String,
    pub agent_id: Option<String>,
    pub session_id: Option<String>,
    /// Opaque per-session agent configuration, carried for the agent loop.
    pub config: Option<Value>,
}

/// How a session routine ended.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome {
    Aborted(AbortReason),
    Completed {
        /// Result of the demo tool call, if it ran.
        tool_demo: Option<ToolCallResult>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum AbortReason {
    /// Required LiveKit settings are unset.
    MissingConfig(Vec<&'static str>),
    /// The token could not be signed.
    Credential(String),
}

/// Handle to a launched session routine.
///
/// Dropping the handle detaches the routine; it keeps running to completion.
#[derive(Debug)]
pub struct SessionHandle {
    run_id: Uuid,
    task: JoinHandle<SessionOutcome>,
}

impl SessionHandle {
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Waits for the routine to finish.
    pub async fn outcome(self) -> Result<SessionOutcome, JoinError> {
        self.task.await
    }
}

/// Launches session routines. Cheap to clone.
#[derive(Debug, Clone)]
pub struct SessionLauncher {
    voice: Arc<VoiceService>,
    tools: Arc<ToolsClient>,
    events: SessionEvents,
    demo_tool_call: bool,
}

impl SessionLauncher {
    /// Builds the voice and tools clients from `config`.
    ///
    /// # Errors
    ///
    /// Returns `ToolsError` if the HTTP client for the tools gateway cannot
    /// be constructed.
    pub fn from_config(config: &Config, events: SessionEvents) -> Result<Self, ToolsError> {
        let voice = VoiceService::new(config.livekit.clone());
        let tools = ToolsClient::new(&config.tools)?;
        Ok(Self::new(
            Arc::new(voice),
            Arc::new(tools),
            events,
            config.session.demo_tool_call,
        ))
    }

    pub fn new(
        voice: Arc<VoiceService>,
        tools: Arc<ToolsClient>,
        events: SessionEvents,
        demo_tool_call: bool,
    ) -> Self {
        Self {
            voice,
            tools,
            events,
            demo_tool_call,
        }
    }

    pub fn events(&self) -> &SessionEvents {
        &self.events
    }

    /// Spawns the session routine for `params` and returns immediately.
    pub fn launch(&self, params: SessionParams) -> SessionHandle {
        let run_id = Uuid::new_v4();
        let launcher = self.clone();
        let task = tokio::spawn(async move { launcher.run(run_id, params).await });
        SessionHandle { run_id, task }
    }

    async fn run(&self, run_id: Uuid, params: SessionParams) -> SessionOutcome {
        let room = params.room_name.as_str();

        let missing = self.voice.missing_config();
        if !missing.is_empty() {
            return self.abort(
                run_id,
                room,
                "LiveKit env vars missing",
                AbortReason::MissingConfig(missing),
            );
        }

        self.events.emit(
            run_id,
            room,
            SessionEvent::SessionStarted {
                agent_id: params.agent_id.clone(),
                session_id: params.session_id.clone(),
            },
        );
        if let Some(config) = &params.config {
            tracing::debug!(%run_id, room, %config, "session config received");
        }

        let credential = match self.voice.generate_agent_token(
            room,
            params.agent_id.as_deref(),
            params.session_id.as_deref(),
        ) {
            Ok(credential) => credential,
            Err(VoiceError::NotConfigured(missing)) => {
                return self.abort(
                    run_id,
                    room,
                    "LiveKit env vars missing",
                    AbortReason::MissingConfig(missing),
                );
            }
            Err(e) => {
                let message = e.to_string();
                return self.abort(
                    run_id,
                    room,
                    &message,
                    AbortReason::Credential(message.clone()),
                );
            }
        };
        self.events.emit(
            run_id,
            room,
            SessionEvent::CredentialMinted {
                identity: credential.identity.to_string(),
            },
        );
        // Nothing consumes the token until the room join is implemented.
        drop(credential);

        let tool_demo = match self.demo_skip_reason(&params) {
            Some(reason) => {
                self.events.emit(
                    run_id,
                    room,
                    SessionEvent::ToolDemoSkipped {
                        reason: reason.to_string(),
                    },
                );
                None
            }
            None => {
                let result = self.tools.call_tool(&demo_request(&params)).await;
                self.events.emit(
                    run_id,
                    room,
                    SessionEvent::ToolDemoCalled {
                        tool: DEMO_TOOL.to_string(),
                        result: result.clone(),
                    },
                );
                Some(result)
            }
        };

        self.events.emit(run_id, room, SessionEvent::SessionCompleted);
        SessionOutcome::Completed { tool_demo }
    }

    fn demo_skip_reason(&self, params: &SessionParams) -> Option<&'static str> {
        if !self.demo_tool_call {
            return Some("demo tool call disabled");
        }
        match params.agent_id.as_deref() {
            None | Some("") => Some("no agent id"),
            Some(_) => None,
        }
    }

    fn abort(
        &self,
        run_id: Uuid,
        room: &str,
        reason: &str,
        cause: AbortReason,
    ) -> SessionOutcome {
        let missing = match &cause {
            AbortReason::MissingConfig(keys) => keys.iter().map(|k| k.to_string()).collect(),
            AbortReason::Credential(_) => Vec::new(),
        };
        self.events.emit(
            run_id,
            room,
            SessionEvent::SessionAborted {
                reason: reason.to_string(),
                missing,
            },
        );
        SessionOutcome::Aborted(cause)
    }
}

/// The fixed lead the demo call creates.
fn demo_request(params: &SessionParams) -> ToolCallRequest {
    ToolCallRequest::new(DEMO_TOOL)
        .with_agent_id(params.agent_id.clone())
        .with_session_id(params.session_id.clone())
        .with_arg("name", "Demo Lead from Worker")
        .with_arg("email", "demo@example.com")
        .with_arg("source", "livekit_worker_demo")
}
