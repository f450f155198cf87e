//! Agent persona and speech pipeline definitions.
//!
//! An `AgentProfile` names the participant the agent joins as, what it says
//! when a session starts, the data topics it speaks on, and the plugins the
//! hosting framework should wire into its speech session.

use crate::error::VoiceError;
use serde::{Deserialize, Serialize};

/// Speech-to-text plugin vendors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SttProvider {
    #[default]
    Deepgram,
}

/// Language model plugin vendors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    #[default]
    Google,
    OpenAi,
}

/// Text-to-speech plugin vendors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TtsProvider {
    /// ElevenLabs streaming synthesis. Requires a voice ID.
    #[default]
    ElevenLabs,
    /// Google Cloud TTS.
    Google,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SttSettings {
    pub provider: SttProvider,
    pub model: String,
    /// Recognition language; `multi` enables automatic detection.
    pub language: String,
}

impl Default for SttSettings {
    fn default() -> Self {
        Self {
            provider: SttProvider::Deepgram,
            model: "nova-3".to_string(),
            language: "multi".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub provider: LlmProvider,
    pub model: String,
    /// Sampling temperature, `0.0..=2.0`.
    pub temperature: f32,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: LlmProvider::Google,
            model: "gemini-2.0-flash-exp".to_string(),
            temperature: 0.7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TtsSettings {
    pub provider: TtsProvider,
    pub voice_id: String,
    /// Vendor model override; the vendor default is used when absent.
    pub model: Option<String>,
}

impl Default for TtsSettings {
    fn default() -> Self {
        Self {
            provider: TtsProvider::ElevenLabs,
            voice_id: "1QHS0LeWK66KMx5bufOz".to_string(),
            model: None,
        }
    }
}

/// Voice activity detection and end-of-turn settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VadSettings {
    /// Run Silero VAD for faster endpointing.
    pub silero: bool,
    /// Run the multilingual turn-detection model on top of VAD.
    pub turn_detection: bool,
}

impl Default for VadSettings {
    fn default() -> Self {
        Self {
            silero: true,
            turn_detection: false,
        }
    }
}

/// The agent persona and pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentProfile {
    /// Participant identity shown in the room's participant list.
    pub identity: String,
    /// Logical agent name; also the `agentId` of chat notifications.
    pub name: String,
    /// System instructions for the language model.
    pub instructions: String,
    /// Spoken and published when a session starts. Empty disables it.
    pub greeting: String,
    /// Topic clients publish turn handshakes on.
    pub handshake_topic: String,
    /// Topic chat notifications are published on.
    pub chat_topic: String,
    pub stt: SttSettings,
    pub llm: LlmSettings,
    pub tts: TtsSettings,
    pub vad: VadSettings,
}

impl Default for AgentProfile {
    fn default() -> Self {
        Self {
            identity: "Echo (AI)".to_string(),
            name: "echo-ai".to_string(),
            instructions: "You are Echo, a helpful, friendly voice AI assistant. \
                           Be concise, conversational, and helpful."
                .to_string(),
            greeting: "Hello, I am Echo, your AI assistant. How can I help you today?"
                .to_string(),
            handshake_topic: "agent:turn".to_string(),
            chat_topic: "chat:agent".to_string(),
            stt: SttSettings::default(),
            llm: LlmSettings::default(),
            tts: TtsSettings::default(),
            vad: VadSettings::default(),
        }
    }
}

impl AgentProfile {
    /// Checks the profile for values the hosting framework would reject.
    pub fn validate(&self) -> Result<(), VoiceError> {
        if self.identity.trim().is_empty() {
            return Err(VoiceError::Config("agent identity must not be empty".to_string()));
        }
        if self.name.trim().is_empty() {
            return Err(VoiceError::Config("agent name must not be empty".to_string()));
        }
        if self.handshake_topic.is_empty() || self.chat_topic.is_empty() {
            return Err(VoiceError::Config("data topics must not be empty".to_string()));
        }
        if self.handshake_topic == self.chat_topic {
            return Err(VoiceError::Config(
                "handshake and chat topics must differ".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(VoiceError::Config(
                "LLM temperature must be between 0.0 and 2.0".to_string(),
            ));
        }
        if self.tts.provider == TtsProvider::ElevenLabs && self.tts.voice_id.trim().is_empty() {
            return Err(VoiceError::Config(
                "ElevenLabs TTS requires a voice_id".to_string(),
            ));
        }
        Ok(())
    }
}
