//! Session API handlers.
//!
//! The hosting speech framework registers a session when its agent is
//! dispatched to a room, forwards every room and speech event it sees, and
//! removes the session when the agent leaves.

use crate::background::enqueue_notification;
use crate::session::Session;
use crate::{api::ApiError, AppState};
use axum::{
    extract::{Extension, Json, Path},
    http::StatusCode,
};
use echo_voice::AgentProfile;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Request body for session registration.
#[derive(Debug, Deserialize)]
pub struct StartSessionRequest {
    /// The LiveKit room the agent is joining.
    pub room: String,
}

/// Response body for session registration.
///
/// Carries everything the framework needs to join the room as the agent and
/// configure its speech pipeline.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionResponse {
    pub room: String,
    /// LiveKit URL to join with.
    pub url: String,
    /// Agent join token.
    pub token: String,
    pub identity: String,
    pub agent_name: String,
    /// Text the session should speak once joined, if any.
    pub greeting: Option<String>,
    pub profile: AgentProfile,
}

/// Handler for `POST /api/sessions`.
pub async fn start_session_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<StartSessionRequest>,
) -> Result<(StatusCode, Json<StartSessionResponse>), ApiError> {
    let room = payload.room.trim().to_string();
    if room.is_empty() {
        return Err(ApiError::BadRequest("room must not be empty".to_string()));
    }
    if state.sessions.contains(&room) {
        return Err(ApiError::Conflict(format!("session already active: {}", room)));
    }

    let profile = state.profile.as_ref();

    if state.voice_service.is_enabled() {
        // LiveKit also creates rooms on first join, so this is best-effort.
        if let Err(e) = state.voice_service.create_room(&room).await {
            tracing::warn!(room = %room, "room creation failed, continuing: {}", e);
        }
    }

    let token = state
        .voice_service
        .generate_join_token(&room, &profile.identity, &profile.name)
        .map_err(|e| ApiError::InternalServerError(format!("failed to mint join token: {}", e)))?;

    // Greet before registering so no forwarded event can take the greeting slot.
    let session = Session::new(room.clone(), profile);
    let greeting = session.announce(&profile.greeting);

    let session = state
        .sessions
        .insert(session)
        .ok_or_else(|| ApiError::Conflict(format!("session already active: {}", room)))?;

    tracing::info!(room = %room, identity = %profile.identity, "agent session started");

    let greeting = greeting.map(|notification| {
        enqueue_notification(
            &state.outbound_tx,
            session.room(),
            session.chat_topic(),
            &notification,
        );
        notification.text
    });

    Ok((
        StatusCode::CREATED,
        Json(StartSessionResponse {
            room,
            url: state.voice_service.get_public_url().to_string(),
            token,
            identity: profile.identity.clone(),
            agent_name: profile.name.clone(),
            greeting,
            profile: profile.clone(),
        }),
    ))
}

/// Handler for `DELETE /api/sessions/{room}`.
pub async fn end_session_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(room): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .sessions
        .remove(&room)
        .ok_or_else(|| ApiError::NotFound(format!("no active session: {}", room)))?;

    if state.voice_service.is_enabled() {
        if let Err(e) = state
            .voice_service
            .remove_participant(&room, &state.profile.identity)
            .await
        {
            tracing::warn!(room = %room, "failed to remove agent participant: {}", e);
        }
    }

    tracing::info!(room = %room, "agent session ended");
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for `POST /api/sessions/{room}/events`.
///
/// Accepts any JSON body: events the session cannot use are logged and
/// dropped, so the framework never sees a failure for a bad event.
pub async fn session_event_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(room): Path<String>,
    Json(event): Json<Value>,
) -> Result<StatusCode, ApiError> {
    let session = state
        .sessions
        .get(&room)
        .ok_or_else(|| ApiError::NotFound(format!("no active session: {}", room)))?;

    if let Some(notification) = session.handle_event(event) {
        enqueue_notification(
            &state.outbound_tx,
            session.room(),
            session.chat_topic(),
            &notification,
        );
    }

    Ok(StatusCode::ACCEPTED)
}
