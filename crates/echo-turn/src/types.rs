//! Session state, inbound event shapes and the outbound chat envelope.

use serde::{Deserialize, Serialize};

/// Data-message topic on which clients announce whose turn is being answered.
pub const HANDSHAKE_TOPIC: &str = "agent:turn";

/// Data-message topic on which the agent publishes chat notifications.
pub const CHAT_TOPIC: &str = "chat:agent";

/// The human turn the next assistant reply is expected to answer.
///
/// Populated from a handshake message and consumed by at most one
/// notification. A newer handshake replaces it wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingTurn {
    pub turn_id: Option<String>,
    pub participant_identity: Option<String>,
    pub display_name: Option<String>,
    pub utterance_text: Option<String>,
}

impl PendingTurn {
    /// Whether any attribution field is set.
    ///
    /// `utterance_text` alone does not count: without an identity, name or
    /// turn id there is nobody to attribute the reply to.
    pub fn has_attribution(&self) -> bool {
        self.turn_id.is_some() || self.participant_identity.is_some() || self.display_name.is_some()
    }
}

/// Fallback attribution: the most recent finalized user utterance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LastFinalTranscript {
    pub text: Option<String>,
    /// Known only when the text came from a handshake.
    pub speaker_name: Option<String>,
}

/// Handshake message body published by the client on [`HANDSHAKE_TOPIC`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnHandshake {
    #[serde(default)]
    pub turn_id: Option<String>,
    #[serde(default)]
    pub participant_identity: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

/// A speech recognition result reported by the speech session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptEvent {
    pub transcript: String,
    #[serde(default)]
    pub is_final: bool,
    #[serde(default)]
    pub speaker_id: Option<String>,
}

/// Author of a conversation item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemRole {
    User,
    Assistant,
}

/// A conversation item added to the chat context by the speech session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationItem {
    pub role: ItemRole,
    #[serde(default)]
    pub text_content: String,
}

/// Fixed `type` tag of outbound chat notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NotificationKind {
    #[default]
    #[serde(rename = "agent.chat")]
    AgentChat,
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Chat notification published on [`CHAT_TOPIC`] for each agent message.
///
/// Wire format (camelCase, absent attribution omitted):
/// `{"type":"agent.chat","text":..,"agentId":..,"ts":..,"isGreeting"?,"replyToIdentity"?,"replyToName"?,"replySnippet"?,"turnId"?}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundNotification {
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub text: String,
    pub agent_id: String,
    /// Construction time in milliseconds since the Unix epoch.
    pub ts: i64,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_greeting: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to_identity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_snippet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turn_id: Option<String>,
}

impl OutboundNotification {
    /// Whether the notification carries any attribution field.
    pub fn is_attributed(&self) -> bool {
        self.reply_to_identity.is_some()
            || self.reply_to_name.is_some()
            || self.reply_snippet.is_some()
            || self.turn_id.is_some()
    }

    /// Encodes the notification as the UTF-8 JSON data-message body.
    pub fn to_payload(&self) -> Result<Vec<u8>, crate::TurnError> {
        serde_json::to_vec(self).map_err(|e| crate::TurnError::Encoding(e.to_string()))
    }
}

/// One event delivered by the hosting speech framework.
///
/// Wire format is internally tagged on `type`:
///
/// | `type` | Body |
/// |--------|------|
/// | `data_received` | `{topic, participantIdentity?, payload}` |
/// | `user_input_transcribed` | `{transcript, isFinal, speakerId?}` |
/// | `conversation_item_added` | `{role, textContent}` |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    DataReceived {
        topic: String,
        #[serde(rename = "participantIdentity", default)]
        participant_identity: Option<String>,
        /// Raw data-message body, expected to be UTF-8 JSON.
        payload: String,
    },
    UserInputTranscribed(TranscriptEvent),
    ConversationItemAdded(ConversationItem),
}

impl SessionEvent {
    /// Decodes an event envelope, reporting unknown shapes as
    /// [`crate::TurnError::UnsupportedEvent`].
    pub fn from_value(value: serde_json::Value) -> Result<Self, crate::TurnError> {
        serde_json::from_value(value).map_err(|e| crate::TurnError::UnsupportedEvent(e.to_string()))
    }

    /// Short name used in log fields.
    pub fn name(&self) -> &'static str {
        match self {
            Self::DataReceived { .. } => "data_received",
            Self::UserInputTranscribed(_) => "user_input_transcribed",
            Self::ConversationItemAdded(_) => "conversation_item_added",
        }
    }
}
