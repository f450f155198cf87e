//! Voice infrastructure for the Echo agent.
//!
//! Integrates with LiveKit for room membership and data-channel delivery,
//! and describes the agent persona and speech pipeline the hosting
//! framework runs: which STT, LLM and TTS plugins to use, with which
//! models, voice and temperature.
//!
//! Audio transport, recognition, inference and synthesis all happen inside
//! the hosting framework. This crate only mints the credentials it joins
//! with and delivers the agent's chat notifications back into the room.

pub mod config;
pub mod error;
pub mod profile;
pub mod service;

pub use config::{LiveKitConfig, DEV_LIVEKIT_API_KEY, DEV_LIVEKIT_API_SECRET, DEV_LIVEKIT_URL};
pub use error::VoiceError;
pub use profile::{
    AgentProfile, LlmProvider, LlmSettings, SttProvider, SttSettings, TtsProvider, TtsSettings,
    VadSettings,
};
pub use service::{DataPublisher, VoiceService};
