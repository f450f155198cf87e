//! Error types for turn correlation.

/// Errors raised while handling a session event.
///
/// None of these escalate past [`crate::guarded`]; they exist so the
/// failing handler can stop early and the guard can log why.
#[derive(Debug, thiserror::Error)]
pub enum TurnError {
    /// The handshake payload was not valid JSON of the expected shape.
    #[error("malformed handshake payload: {0}")]
    MalformedHandshake(#[from] serde_json::Error),

    /// The host delivered an event missing a field the handler needs.
    #[error("unsupported event shape: {0}")]
    UnsupportedEvent(String),

    /// The notification could not be serialized for publishing.
    #[error("notification encoding failed: {0}")]
    Encoding(String),
}
