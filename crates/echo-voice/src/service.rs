use crate::config::LiveKitConfig;
use crate::error::VoiceError;
use livekit_api::access_token::{AccessToken, VideoGrants};
use livekit_api::services::room::{CreateRoomOptions, RoomClient, SendDataOptions};
use livekit_protocol::data_packet::Kind as DataPacketKind;
use livekit_protocol::Room;
use std::future::Future;
use std::time::Duration;

/// Delivers data messages into a room on a topic.
///
/// Implementations must use reliable (ordered, lossless) delivery.
pub trait DataPublisher: Send + Sync + 'static {
    fn publish_data(
        &self,
        room: &str,
        topic: &str,
        payload: Vec<u8>,
    ) -> impl Future<Output = Result<(), VoiceError>> + Send;
}

#[derive(Debug)]
pub struct VoiceService {
    config: LiveKitConfig,
    room_client: RoomClient,
}

impl VoiceService {
    pub fn new(config: LiveKitConfig) -> Self {
        let room_client =
            RoomClient::with_api_key(&config.url, &config.api_key, &config.api_secret);
        Self {
            config,
            room_client,
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.config.url.is_empty()
    }

    pub fn get_url(&self) -> &str {
        &self.config.url
    }

    /// Returns the URL the agent joins with. Falls back to the internal URL
    /// if no public URL is configured.
    pub fn get_public_url(&self) -> &str {
        if self.config.public_url.is_empty() {
            &self.config.url
        } else {
            &self.config.public_url
        }
    }

    pub async fn create_room(&self, name: &str) -> Result<Room, VoiceError> {
        let options = CreateRoomOptions::default();

        self.room_client
            .create_room(name, options)
            .await
            .map_err(|e| VoiceError::RoomService(e.to_string()))
    }

    /// Mints a join token for the agent participant.
    ///
    /// The grant includes `can_publish_data` so the agent can post chat
    /// notifications alongside its audio track.
    pub fn generate_join_token(
        &self,
        room_name: &str,
        participant_identity: &str,
        participant_name: &str,
    ) -> Result<String, VoiceError> {
        if room_name.is_empty() {
            return Err(VoiceError::Config("room name must not be empty".to_string()));
        }
        if participant_identity.is_empty() {
            return Err(VoiceError::Config(
                "participant identity must not be empty".to_string(),
            ));
        }

        let token = AccessToken::with_api_key(&self.config.api_key, &self.config.api_secret)
            .with_identity(participant_identity)
            .with_name(participant_name)
            .with_grants(VideoGrants {
                room_join: true,
                room: room_name.to_string(),
                can_publish: true,
                can_subscribe: true,
                can_publish_data: true,
                ..Default::default()
            })
            .with_ttl(Duration::from_secs(self.config.token_ttl_seconds));

        token.to_jwt().map_err(VoiceError::LiveKit)
    }

    pub async fn remove_participant(&self, room: &str, identity: &str) -> Result<(), VoiceError> {
        self.room_client
            .remove_participant(room, identity)
            .await
            .map_err(|e| VoiceError::RoomService(e.to_string()))
    }
}

impl DataPublisher for VoiceService {
    async fn publish_data(
        &self,
        room: &str,
        topic: &str,
        payload: Vec<u8>,
    ) -> Result<(), VoiceError> {
        if !self.is_enabled() {
            return Err(VoiceError::Publish(
                "LiveKit URL is not configured".to_string(),
            ));
        }

        tracing::debug!(room, topic, bytes = payload.len(), "sending reliable data packet");

        let options = SendDataOptions {
            kind: DataPacketKind::Reliable,
            topic: Some(topic.to_string()),
            ..Default::default()
        };

        self.room_client
            .send_data(room, payload, options)
            .await
            .map_err(|e| VoiceError::Publish(e.to_string()))
    }
}
