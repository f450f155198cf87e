//! Turn correlation for the Echo voice agent.
//!
//! A voice session produces three independent streams of events: handshake
//! data messages from the client (`agent:turn`), finalized transcripts from
//! the speech recognizer, and conversation items from the language model.
//! The [`TurnCorrelator`] merges them so that every assistant reply leaves
//! the agent as one `agent.chat` notification carrying best-effort
//! attribution to the human turn it answers.
//!
//! # Attribution sources
//!
//! | Source | Updated by | Cleared |
//! |--------|-----------|---------|
//! | [`PendingTurn`] | handshake messages | after one notification consumes it |
//! | [`LastFinalTranscript`] | finalized transcripts, handshake text | never (only superseded) |
//!
//! A notification takes its attribution from exactly one of the two.
//!
//! # Isolation
//!
//! Hosts wrap every callback in [`guarded`], which logs and swallows
//! errors and panics so one bad event never stops the session.
//!
//! ```rust,ignore
//! use echo_turn::{guarded, TurnCorrelator, TurnEvents};
//!
//! let mut correlator = TurnCorrelator::new("echo-ai");
//! guarded("data_received", || {
//!     correlator.on_handshake("agent:turn", Some("alice"), br#"{"turnId":"t1","text":"hi"}"#)
//! });
//! let notification = guarded("conversation_item_added", || {
//!     correlator.on_assistant_reply_added("Hello Alice")
//! })
//! .flatten();
//! ```

mod correlator;
mod error;
mod guard;
mod types;

pub use correlator::{TurnCorrelator, TurnEvents};
pub use error::TurnError;
pub use guard::guarded;
pub use types::{
    ConversationItem, ItemRole, LastFinalTranscript, NotificationKind, OutboundNotification,
    PendingTurn, SessionEvent, TranscriptEvent, TurnHandshake, CHAT_TOPIC, HANDSHAKE_TOPIC,
};
