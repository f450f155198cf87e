//! Server configuration loading from file and environment variables.

use echo_voice::{AgentProfile, LiveKitConfig};
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use thiserror::Error;

/// Top-level server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server network settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// LiveKit connection settings.
    #[serde(default)]
    pub livekit: LiveKitConfig,

    /// Agent persona and speech pipeline.
    #[serde(default)]
    pub agent: AgentProfile,
}

/// Network configuration for the HTTP server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Capacity of the outbound data-message queue. Messages beyond it are dropped.
    #[serde(default = "default_outbound_queue_capacity")]
    pub outbound_queue_capacity: usize,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "echo_turn=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    10000
}

fn default_outbound_queue_capacity() -> usize {
    256
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            outbound_queue_capacity: default_outbound_queue_capacity(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// The agent profile is unusable.
    #[error("invalid agent profile: {0}")]
    Profile(#[from] echo_voice::VoiceError),
}

/// Loads configuration from a TOML file, falling back to defaults.
///
/// Environment variable overrides:
/// - `ECHO_HOST` overrides `server.host`
/// - `PORT` or `ECHO_PORT` overrides `server.port` (`ECHO_PORT` wins)
/// - `ECHO_LOG_LEVEL` overrides `logging.level`
/// - `ECHO_LOG_JSON` overrides `logging.json` (set to "true" to enable)
/// - `LIVEKIT_URL`, `LIVEKIT_PUBLIC_URL`, `LIVEKIT_API_KEY`, `LIVEKIT_API_SECRET`
///   override the matching `livekit.*` keys
/// - `ECHO_AGENT_GREETING` overrides `agent.greeting`
/// - `ECHO_TTS_VOICE_ID` overrides `agent.tts.voice_id`
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed,
/// or if the resulting agent profile fails validation.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                Config::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    config.agent.validate()?;

    Ok(config)
}

/// Applies environment overrides using `lookup` to read variables.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(host) = lookup("ECHO_HOST") {
        if let Ok(parsed) = host.parse() {
            config.server.host = parsed;
        }
    }
    for key in ["PORT", "ECHO_PORT"] {
        if let Some(port) = lookup(key) {
            if let Ok(parsed) = port.parse() {
                config.server.port = parsed;
            }
        }
    }
    if let Some(level) = lookup("ECHO_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(json) = lookup("ECHO_LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }

    if let Some(url) = lookup("LIVEKIT_URL") {
        config.livekit.url = url;
    }
    if let Some(url) = lookup("LIVEKIT_PUBLIC_URL") {
        config.livekit.public_url = url;
    }
    if let Some(key) = lookup("LIVEKIT_API_KEY") {
        config.livekit.api_key = key;
    }
    if let Some(secret) = lookup("LIVEKIT_API_SECRET") {
        config.livekit.api_secret = secret;
    }

    if let Some(greeting) = lookup("ECHO_AGENT_GREETING") {
        config.agent.greeting = greeting;
    }
    if let Some(voice_id) = lookup("ECHO_TTS_VOICE_ID") {
        config.agent.tts.voice_id = voice_id;
    }
}
