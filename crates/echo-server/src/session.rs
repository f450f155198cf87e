//! Per-room conversation sessions.
//!
//! Each session owns one [`TurnCorrelator`] behind a mutex. Every framework
//! event for the room runs through [`Session::handle_event`], which holds the
//! lock for the whole read-modify-clear so concurrent deliveries from
//! different event sources cannot consume a pending turn twice.

use echo_turn::{guarded, OutboundNotification, SessionEvent, TurnCorrelator};
use echo_voice::AgentProfile;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// One agent session in one room.
#[derive(Debug)]
pub struct Session {
    room: String,
    chat_topic: String,
    correlator: Mutex<TurnCorrelator>,
}

impl Session {
    pub fn new(room: impl Into<String>, profile: &AgentProfile) -> Self {
        Self {
            room: room.into(),
            chat_topic: profile.chat_topic.clone(),
            correlator: Mutex::new(TurnCorrelator::with_handshake_topic(
                profile.name.clone(),
                profile.handshake_topic.clone(),
            )),
        }
    }

    pub fn room(&self) -> &str {
        &self.room
    }

    pub fn chat_topic(&self) -> &str {
        &self.chat_topic
    }

    fn correlator(&self) -> MutexGuard<'_, TurnCorrelator> {
        self.correlator.lock().unwrap_or_else(|poisoned| {
            tracing::error!(room = %self.room, "correlator lock poisoned, recovering state");
            poisoned.into_inner()
        })
    }

    /// Applies one raw framework event.
    ///
    /// Unknown shapes and handler failures are logged and dropped; the
    /// session keeps accepting events.
    pub fn handle_event(&self, value: serde_json::Value) -> Option<OutboundNotification> {
        let event = guarded("session_event", || SessionEvent::from_value(value))?;
        let mut correlator = self.correlator();
        guarded(event.name(), || correlator.dispatch(&event)).flatten()
    }

    /// Builds a notification for a message the agent originates itself.
    pub fn announce(&self, text: &str) -> Option<OutboundNotification> {
        self.correlator().announce(text)
    }
}

/// Active sessions keyed by room name.
///
/// Uses `std::sync::RwLock`: every acquisition is a brief HashMap operation
/// that never spans an `.await`.
#[derive(Debug, Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<String, Arc<Session>>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Arc<Session>>> {
        self.sessions.read().unwrap_or_else(|poisoned| {
            tracing::error!("session registry lock poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Arc<Session>>> {
        self.sessions.write().unwrap_or_else(|poisoned| {
            tracing::error!("session registry lock poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Registers a session, returning `None` if the room already has one.
    pub fn insert(&self, session: Session) -> Option<Arc<Session>> {
        match self.write().entry(session.room.clone()) {
            Entry::Vacant(entry) => Some(entry.insert(Arc::new(session)).clone()),
            Entry::Occupied(_) => None,
        }
    }

    pub fn get(&self, room: &str) -> Option<Arc<Session>> {
        self.read().get(room).cloned()
    }

    pub fn remove(&self, room: &str) -> Option<Arc<Session>> {
        self.write().remove(room)
    }

    pub fn contains(&self, room: &str) -> bool {
        self.read().contains_key(room)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn session() -> Session {
        Session::new("lobby", &AgentProfile::default())
    }

    #[test]
    fn handle_event_produces_attributed_reply() {
        let s = session();
        assert!(s
            .handle_event(json!({
                "type": "data_received",
                "topic": "agent:turn",
                "participantIdentity": "ann",
                "payload": r#"{"turnId":"t1","userName":"Ann","text":"hi"}"#
            }))
            .is_none());

        let n = s
            .handle_event(json!({
                "type": "conversation_item_added",
                "role": "assistant",
                "textContent": "Hello Ann"
            }))
            .expect("assistant reply should produce a notification");
        assert_eq!(n.turn_id.as_deref(), Some("t1"));
        assert_eq!(n.agent_id, "echo-ai");
        assert!(n.is_greeting);
    }

    #[test]
    fn bad_events_do_not_stop_the_session() {
        let s = session();
        assert!(s.handle_event(json!({"type": "nonsense"})).is_none());
        assert!(s.handle_event(json!("not an object")).is_none());
        assert!(s
            .handle_event(json!({
                "type": "data_received",
                "topic": "agent:turn",
                "payload": "{broken"
            }))
            .is_none());

        let n = s.handle_event(json!({
            "type": "conversation_item_added",
            "role": "assistant",
            "textContent": "still here"
        }));
        assert!(n.is_some());
    }

    #[test]
    fn concurrent_replies_consume_pending_turn_once() {
        let s = Arc::new(session());
        s.handle_event(json!({
            "type": "data_received",
            "topic": "agent:turn",
            "payload": r#"{"turnId":"t1","userName":"Ann"}"#
        }));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let s = s.clone();
                std::thread::spawn(move || {
                    s.handle_event(json!({
                        "type": "conversation_item_added",
                        "role": "assistant",
                        "textContent": format!("reply {i}")
                    }))
                })
            })
            .collect();

        let attributed = handles
            .into_iter()
            .filter_map(|h| h.join().unwrap())
            .filter(|n| n.turn_id.as_deref() == Some("t1"))
            .count();
        assert_eq!(attributed, 1);
    }

    #[test]
    fn registry_rejects_duplicate_rooms() {
        let registry = SessionRegistry::new();
        assert!(registry.insert(session()).is_some());
        assert!(registry.insert(session()).is_none());
        assert_eq!(registry.len(), 1);

        assert!(registry.remove("lobby").is_some());
        assert!(registry.is_empty());
        assert!(!registry.contains("lobby"));
    }

    #[test]
    fn greeting_announced_before_registration_keeps_flag() {
        let registry = SessionRegistry::new();
        let s = session();
        let greeting = s.announce("Hello").expect("greeting should be built");
        assert!(greeting.is_greeting);

        let s = registry.insert(s).unwrap();
        let reply = s
            .handle_event(json!({
                "type": "conversation_item_added",
                "role": "assistant",
                "textContent": "first reply"
            }))
            .unwrap();
        assert!(!reply.is_greeting);
    }

    #[test]
    fn registry_survives_poisoned_lock() {
        let registry = SessionRegistry::new();
        registry.insert(session());

        let poisoner = registry.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.sessions.write().unwrap();
            panic!("poison the registry");
        })
        .join();
        assert!(registry.sessions.is_poisoned());

        assert_eq!(registry.len(), 1);
        assert!(!registry.is_empty());
        assert!(registry.contains("lobby"));
        assert!(registry.remove("lobby").is_some());
        assert!(registry.is_empty());
    }
}
