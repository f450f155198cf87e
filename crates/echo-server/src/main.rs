//! Echo server binary: the turn-correlation service for the Echo voice agent.
//!
//! Starts an axum HTTP server with structured logging, the outbound
//! publisher task, and graceful shutdown on SIGTERM/SIGINT.

use echo_server::{app, background, config, session::SessionRegistry, AppState};
use echo_voice::VoiceService;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

fn resolve_config_path() -> (Option<String>, &'static str) {
    if let Some(path) = std::env::args()
        .nth(1)
        .filter(|value| !value.trim().is_empty())
    {
        return (Some(path), "cli-arg");
    }

    if let Ok(path) = std::env::var("ECHO_CONFIG_PATH") {
        if !path.trim().is_empty() {
            return (Some(path), "env-var");
        }
    }

    (None, "default")
}

#[tokio::main]
async fn main() {
    // A missing .env file is normal outside local development.
    let dotenv_loaded = dotenvy::dotenv().is_ok();

    let (resolved_config_path, config_source) = resolve_config_path();
    let selected_config_path = resolved_config_path.as_deref().or(Some("config.toml"));

    let config = config::load_config(selected_config_path)
        .expect("failed to load configuration — the server cannot start without valid config");

    let filter =
        EnvFilter::try_new(&config.logging.level).unwrap_or_else(|_| EnvFilter::new("info"));

    if config.logging.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    tracing::info!(
        source = config_source,
        path = selected_config_path.unwrap_or("<none>"),
        dotenv = dotenv_loaded,
        "resolved startup configuration path"
    );
    tracing::info!(
        agent = %config.agent.name,
        identity = %config.agent.identity,
        stt = %config.agent.stt.model,
        llm = %config.agent.llm.model,
        voice = %config.agent.tts.voice_id,
        "agent profile loaded"
    );

    let voice_service = Arc::new(VoiceService::new(config.livekit.clone()));
    if !voice_service.is_enabled() {
        tracing::warn!("livekit.url is not set; chat notifications will not be delivered");
    }

    let (outbound_tx, outbound_rx) = mpsc::channel(config.server.outbound_queue_capacity.max(1));
    tokio::spawn(background::start_publisher_task(
        voice_service.clone(),
        outbound_rx,
    ));

    let state = AppState {
        profile: Arc::new(config.agent.clone()),
        voice_service,
        sessions: SessionRegistry::new(),
        outbound_tx,
    };

    let app = app(state);
    let addr = SocketAddr::new(config.server.host, config.server.port);

    tracing::info!(%addr, "starting echo server");

    let listener = TcpListener::bind(addr)
        .await
        .expect("failed to bind to address — is another process using this port?");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    tracing::info!("echo server shut down");
}

/// Waits for a SIGINT (Ctrl+C) or SIGTERM signal for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { tracing::info!("received SIGINT, initiating graceful shutdown"); }
        () = terminate => { tracing::info!("received SIGTERM, initiating graceful shutdown"); }
    }
}
