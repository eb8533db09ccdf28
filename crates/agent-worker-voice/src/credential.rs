//! Identity, grant and metadata that go into an agent's room token.

use livekit_api::access_token::VideoGrants;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Participant identity the agent uses inside a room.
///
/// Derived as `agent-<agentId>`, or `agent-default` when no agent id was
/// supplied. Recomputed per session, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AgentIdentity(String);

impl AgentIdentity {
    pub const PREFIX: &'static str = "agent-";
    pub const DEFAULT_AGENT: &'static str = "default";

    pub fn for_agent(agent_id: Option<&str>) -> Self {
        Self(format!(
            "{}{}",
            Self::PREFIX,
            agent_id.unwrap_or(Self::DEFAULT_AGENT)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Capabilities granted to the agent for a single room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessGrant {
    pub room_join: bool,
    pub room: String,
    pub can_publish: bool,
    pub can_subscribe: bool,
}

impl AccessGrant {
    /// Join, publish and subscribe rights for `room`.
    pub fn voice_agent(room: impl Into<String>) -> Self {
        Self {
            room_join: true,
            room: room.into(),
            can_publish: true,
            can_subscribe: true,
        }
    }
}

impl From<AccessGrant> for VideoGrants {
    fn from(grant: AccessGrant) -> Self {
        VideoGrants {
            room_join: grant.room_join,
            room: grant.room,
            can_publish: grant.can_publish,
            can_subscribe: grant.can_subscribe,
            ..Default::default()
        }
    }
}

/// Participant metadata embedded in the token as a JSON string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
}

impl CredentialMetadata {
    pub const VOICE_AGENT: &'static str = "voice_agent";

    pub fn voice_agent(agent_id: Option<String>, session_id: Option<String>) -> Self {
        Self {
            agent_id,
            session_id,
            kind: Self::VOICE_AGENT.to_string(),
        }
    }
}

/// A minted room token together with the identity it was issued to.
///
/// The token itself is withheld from `Debug` output so it cannot leak into
/// logs.
#[derive(Clone)]
pub struct AgentCredential {
    pub identity: AgentIdentity,
    pub room: String,
    token: String,
}

impl AgentCredential {
    pub(crate) fn new(identity: AgentIdentity, room: String, token: String) -> Self {
        Self {
            identity,
            room,
            token,
        }
    }

    /// The signed JWT.
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for AgentCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentCredential")
            .field("identity", &self.identity)
            .field("room", &self.room)
            .field("token", &"[REDACTED]")
            .finish()
    }
}
