//! LiveKit room credentials for the agent worker.
//!
//! The worker joins rooms as an agent participant. Before it can do so it
//! needs a signed access token scoped to one room and one identity. This
//! crate owns the LiveKit configuration, the agent identity scheme, and
//! token minting.
//!
//! Joining the room with the minted token (media transport) is not part of
//! this crate yet.

pub mod config;
pub mod credential;
pub mod error;
pub mod service;

pub use config::LiveKitConfig;
pub use credential::{AccessGrant, AgentCredential, AgentIdentity, CredentialMetadata};
pub use error::VoiceError;
pub use service::VoiceService;
