//! Echo server library logic.

pub mod api;
pub mod api_sessions;
pub mod background;
pub mod config;
pub mod session;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Extension, Router,
};
use background::OutboundData;
use echo_voice::{AgentProfile, VoiceService};
use session::SessionRegistry;
use std::sync::Arc;
use tokio::sync::mpsc;
use tower_http::trace::TraceLayer;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Agent persona and pipeline settings handed to each session.
    pub profile: Arc<AgentProfile>,
    /// LiveKit room and token service.
    pub voice_service: Arc<VoiceService>,
    /// Active sessions keyed by room.
    pub sessions: SessionRegistry,
    /// Queue drained by the outbound publisher task.
    pub outbound_tx: mpsc::Sender<OutboundData>,
}

/// Maximum request body size (256 KiB). Events are small JSON envelopes.
const MAX_REQUEST_BODY_BYTES: usize = 256 * 1024;

/// Health check handler.
///
/// Plain-text liveness check for the deployment platform.
async fn health() -> &'static str {
    "OK"
}

async fn hello() -> &'static str {
    "Hello from echo agent!"
}

/// Builds the application router with all routes.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(hello))
        .route("/health", get(health))
        .route("/api/sessions", post(api_sessions::start_session_handler))
        .route(
            "/api/sessions/{room}",
            delete(api_sessions::end_session_handler),
        )
        .route(
            "/api/sessions/{room}/events",
            post(api_sessions::session_event_handler),
        )
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(Arc::new(state)))
}
