//! Background tasks for the Echo server.
//!
//! Includes:
//! - Draining the outbound data-message queue into LiveKit.

use echo_turn::OutboundNotification;
use echo_voice::DataPublisher;
use std::sync::Arc;
use tokio::sync::mpsc;

/// One data message waiting to be published into a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundData {
    pub room: String,
    pub topic: String,
    pub payload: Vec<u8>,
}

/// Encodes a notification and queues it for publishing.
///
/// Never blocks and never fails the caller: encoding errors and a full or
/// closed queue are logged and the notification is dropped.
pub fn enqueue_notification(
    tx: &mpsc::Sender<OutboundData>,
    room: &str,
    topic: &str,
    notification: &OutboundNotification,
) {
    let payload = match notification.to_payload() {
        Ok(payload) => payload,
        Err(e) => {
            tracing::error!(room, "failed to encode chat notification: {}", e);
            return;
        }
    };

    let message = OutboundData {
        room: room.to_string(),
        topic: topic.to_string(),
        payload,
    };

    if let Err(e) = tx.try_send(message) {
        tracing::warn!(room, topic, "dropping chat notification, outbound queue unavailable: {}", e);
    }
}

/// Starts the outbound publisher task.
///
/// Runs until every sender is dropped. Messages are published one at a time
/// so per-room order is preserved; failures are logged and not retried.
pub async fn start_publisher_task<P: DataPublisher>(
    publisher: Arc<P>,
    mut rx: mpsc::Receiver<OutboundData>,
) {
    tracing::info!("starting outbound publisher task");

    while let Some(message) = rx.recv().await {
        let bytes = message.payload.len();
        match publisher
            .publish_data(&message.room, &message.topic, message.payload)
            .await
        {
            Ok(()) => {
                tracing::debug!(room = %message.room, topic = %message.topic, bytes, "published data message");
            }
            Err(e) => {
                tracing::warn!(
                    room = %message.room,
                    topic = %message.topic,
                    "failed to publish data message: {}",
                    e
                );
            }
        }
    }

    tracing::info!("outbound publisher task stopped");
}
