//! The per-session turn correlator.

use crate::error::TurnError;
use crate::types::{
    ConversationItem, ItemRole, LastFinalTranscript, NotificationKind, OutboundNotification,
    PendingTurn, SessionEvent, TurnHandshake, HANDSHAKE_TOPIC,
};

/// Callbacks a hosting speech framework drives for one session.
pub trait TurnEvents {
    /// Handles a data message received on `topic` from `sender_identity`.
    ///
    /// Messages on any topic other than the handshake topic are ignored.
    fn on_handshake(
        &mut self,
        topic: &str,
        sender_identity: Option<&str>,
        payload: &[u8],
    ) -> Result<(), TurnError>;

    /// Handles a recognition result; only final, non-empty results count.
    fn on_transcript_finalized(&mut self, transcript: &str, is_final: bool)
        -> Result<(), TurnError>;

    /// Handles an assistant-authored conversation item, returning the chat
    /// notification to publish, if any.
    fn on_assistant_reply_added(
        &mut self,
        reply_text: &str,
    ) -> Result<Option<OutboundNotification>, TurnError>;
}

/// Trims a string field, treating blank values as absent.
fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Treats blank values as absent but keeps the original string.
///
/// Used for caller-generated tokens that are echoed back verbatim.
fn opaque(value: Option<&str>) -> Option<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(str::to_string)
}

/// Correlation state for one conversation session.
///
/// Not synchronized: hosts that deliver events from several tasks keep the
/// correlator behind a single mutex so each read-modify-clear is atomic.
#[derive(Debug, Clone)]
pub struct TurnCorrelator {
    agent_id: String,
    handshake_topic: String,
    pending: PendingTurn,
    last_final: LastFinalTranscript,
    greeted: bool,
}

impl TurnCorrelator {
    /// Creates an empty correlator listening on [`HANDSHAKE_TOPIC`].
    pub fn new(agent_id: impl Into<String>) -> Self {
        Self::with_handshake_topic(agent_id, HANDSHAKE_TOPIC)
    }

    pub fn with_handshake_topic(agent_id: impl Into<String>, topic: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
            handshake_topic: topic.into(),
            pending: PendingTurn::default(),
            last_final: LastFinalTranscript::default(),
            greeted: false,
        }
    }

    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    pub fn pending(&self) -> &PendingTurn {
        &self.pending
    }

    pub fn last_final(&self) -> &LastFinalTranscript {
        &self.last_final
    }

    /// Whether the first (greeting) notification has been constructed.
    pub fn has_greeted(&self) -> bool {
        self.greeted
    }

    /// Builds an unattributed notification for a message the agent
    /// originates itself, such as the session greeting.
    ///
    /// Pending turn state is left untouched.
    pub fn announce(&mut self, text: &str) -> Option<OutboundNotification> {
        if text.is_empty() {
            return None;
        }
        Some(self.notification(text))
    }

    /// Routes a conversation item by author.
    ///
    /// User items only mark the end of a user turn and are logged.
    pub fn on_conversation_item(
        &mut self,
        item: &ConversationItem,
    ) -> Result<Option<OutboundNotification>, TurnError> {
        match item.role {
            ItemRole::Assistant => self.on_assistant_reply_added(&item.text_content),
            ItemRole::User => {
                if !item.text_content.is_empty() {
                    tracing::info!(
                        agent_id = %self.agent_id,
                        text = %item.text_content,
                        "user turn completed"
                    );
                }
                Ok(None)
            }
        }
    }

    /// Applies one framework event, returning the notification it produced.
    pub fn dispatch(
        &mut self,
        event: &SessionEvent,
    ) -> Result<Option<OutboundNotification>, TurnError> {
        match event {
            SessionEvent::DataReceived {
                topic,
                participant_identity,
                payload,
            } => {
                self.on_handshake(topic, participant_identity.as_deref(), payload.as_bytes())?;
                Ok(None)
            }
            SessionEvent::UserInputTranscribed(ev) => {
                self.on_transcript_finalized(&ev.transcript, ev.is_final)?;
                Ok(None)
            }
            SessionEvent::ConversationItemAdded(item) => self.on_conversation_item(item),
        }
    }

    fn notification(&mut self, text: &str) -> OutboundNotification {
        let is_greeting = !self.greeted;
        self.greeted = true;
        OutboundNotification {
            kind: NotificationKind::AgentChat,
            text: text.to_string(),
            agent_id: self.agent_id.clone(),
            ts: chrono::Utc::now().timestamp_millis(),
            is_greeting,
            reply_to_identity: None,
            reply_to_name: None,
            reply_snippet: None,
            turn_id: None,
        }
    }
}

impl TurnEvents for TurnCorrelator {
    fn on_handshake(
        &mut self,
        topic: &str,
        sender_identity: Option<&str>,
        payload: &[u8],
    ) -> Result<(), TurnError> {
        if topic != self.handshake_topic {
            tracing::debug!(topic, "ignoring data message on unrelated topic");
            return Ok(());
        }

        let handshake: TurnHandshake = serde_json::from_slice(payload)?;

        let identity = opaque(handshake.participant_identity.as_deref())
            .or_else(|| opaque(sender_identity));
        let name = non_blank(handshake.user_name.as_deref()).or_else(|| identity.clone());
        let text = non_blank(handshake.text.as_deref());

        if let Some(text) = &text {
            self.last_final = LastFinalTranscript {
                text: Some(text.clone()),
                speaker_name: name.clone(),
            };
        }

        self.pending = PendingTurn {
            turn_id: opaque(handshake.turn_id.as_deref()),
            participant_identity: identity,
            display_name: name,
            utterance_text: text,
        };

        tracing::debug!(
            turn_id = ?self.pending.turn_id,
            identity = ?self.pending.participant_identity,
            "turn handshake received"
        );
        Ok(())
    }

    fn on_transcript_finalized(
        &mut self,
        transcript: &str,
        is_final: bool,
    ) -> Result<(), TurnError> {
        if !is_final {
            tracing::trace!(transcript, "partial transcript");
            return Ok(());
        }
        if transcript.is_empty() {
            return Ok(());
        }
        tracing::info!(transcript, "final user transcript");
        // The speaker of a transcript is unknown; never pair it with an older name.
        self.last_final = LastFinalTranscript {
            text: Some(transcript.to_string()),
            speaker_name: None,
        };
        Ok(())
    }

    fn on_assistant_reply_added(
        &mut self,
        reply_text: &str,
    ) -> Result<Option<OutboundNotification>, TurnError> {
        if reply_text.is_empty() {
            tracing::debug!("skipping empty assistant item");
            return Ok(None);
        }

        let mut notification = self.notification(reply_text);

        if self.pending.has_attribution() {
            let pending = std::mem::take(&mut self.pending);
            notification.reply_to_identity = pending.participant_identity;
            notification.reply_to_name = pending.display_name;
            notification.turn_id = pending.turn_id;
            notification.reply_snippet = pending
                .utterance_text
                .or_else(|| self.last_final.text.clone());
        } else if let Some(snippet) = &self.last_final.text {
            notification.reply_to_name = self.last_final.speaker_name.clone();
            notification.reply_snippet = Some(snippet.clone());
        }

        tracing::info!(
            agent_id = %self.agent_id,
            turn_id = ?notification.turn_id,
            reply_to = ?notification.reply_to_name,
            text = %notification.text,
            "agent reply"
        );
        Ok(Some(notification))
    }
}
