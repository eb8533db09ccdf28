use crate::config::LiveKitConfig;
use crate::credential::{AccessGrant, AgentCredential, AgentIdentity, CredentialMetadata};
use crate::error::VoiceError;
use livekit_api::access_token::AccessToken;
use std::time::Duration;

/// Mints LiveKit access tokens for agent participants.
#[derive(Debug, Clone)]
pub struct VoiceService {
    config: LiveKitConfig,
}

impl VoiceService {
    pub fn new(config: LiveKitConfig) -> Self {
        Self { config }
    }

    /// Required settings that are currently empty.
    pub fn missing_config(&self) -> Vec<&'static str> {
        self.config.missing()
    }

    /// Mints a token that lets the agent join, publish to and subscribe in
    /// `room_name`.
    ///
    /// A fresh token is produced on every call; nothing is cached.
    pub fn generate_agent_token(
        &self,
        room_name: &str,
        agent_id: Option<&str>,
        session_id: Option<&str>,
    ) -> Result<AgentCredential, VoiceError> {
        let missing = self.config.missing();
        if !missing.is_empty() {
            return Err(VoiceError::NotConfigured(missing));
        }

        let identity = AgentIdentity::for_agent(agent_id);
        let metadata = serde_json::to_string(&CredentialMetadata::voice_agent(
            agent_id.map(str::to_string),
            session_id.map(str::to_string),
        ))?;

        let token = AccessToken::with_api_key(&self.config.api_key, &self.config.api_secret)
            .with_identity(identity.as_str())
            .with_metadata(&metadata)
            .with_grants(AccessGrant::voice_agent(room_name).into())
            .with_ttl(Duration::from_secs(self.config.token_ttl_seconds))
            .to_jwt()?;

        tracing::debug!(
            room = room_name,
            identity = %identity,
            ttl_seconds = self.config.token_ttl_seconds,
            "minted agent access token"
        );

        Ok(AgentCredential::new(identity, room_name.to_string(), token))
    }
}
