//! Channel events pushed to clients.
//!
//! Every event serializes to one flat JSON object:
//!
//! ```json
//! {
//!     "type": "message.new",
//!     "timestamp": "2026-01-12T10:30:00Z",
//!     ...event fields
//! }
//! ```
//!
//! Serialization happens in exactly one place; handlers never build event
//! JSON by hand.

use crate::websocket::presence::PresenceEntry;
use axum::extract::ws::Message;
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum WsEvent {
    /// A chat line, delivered in clear to both parties' rooms only after the
    /// encrypted record is durable.
    #[serde(rename = "message.new")]
    MessageNew {
        id: Uuid,
        sender_id: Uuid,
        sender_name: String,
        recipient_id: Uuid,
        text: String,
        listing_id: Option<Uuid>,
        created_at: String,
    },

    /// Persistence failed; sent to the submitting connection only.
    #[serde(rename = "message.send_failed")]
    MessageSendFailed { reason: String },

    /// An identity's first session came online.
    #[serde(rename = "presence.joined")]
    PresenceJoined { user: PresenceEntry },

    /// An identity went offline.
    #[serde(rename = "presence.left")]
    PresenceLeft { user_id: Uuid },

    /// Initial sync for a new connection.
    #[serde(rename = "presence.snapshot")]
    PresenceSnapshot { users: Vec<PresenceEntry> },
}

impl WsEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::MessageNew { .. } => "message.new",
            Self::MessageSendFailed { .. } => "message.send_failed",
            Self::PresenceJoined { .. } => "presence.joined",
            Self::PresenceLeft { .. } => "presence.left",
            Self::PresenceSnapshot { .. } => "presence.snapshot",
        }
    }

    /// Flat JSON payload with the server timestamp stamped in.
    pub fn to_payload(&self) -> Result<String, serde_json::Error> {
        let mut value = serde_json::to_value(self)?;
        value["timestamp"] = serde_json::Value::String(Utc::now().to_rfc3339());
        serde_json::to_string(&value)
    }

    pub fn to_ws_message(&self) -> Result<Message, serde_json::Error> {
        Ok(Message::Text(self.to_payload()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_is_flat_and_typed() {
        let user_id = Uuid::new_v4();
        let event = WsEvent::PresenceLeft { user_id };

        let payload = event.to_payload().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&payload).unwrap();

        assert_eq!(parsed["type"], "presence.left");
        assert_eq!(parsed["user_id"], user_id.to_string());
        assert!(parsed["timestamp"].is_string());
    }

    #[test]
    fn message_new_carries_plaintext_fields() {
        let event = WsEvent::MessageNew {
            id: Uuid::new_v4(),
            sender_id: Uuid::new_v4(),
            sender_name: "marta".into(),
            recipient_id: Uuid::new_v4(),
            text: "te cambio la lámpara por el taladro".into(),
            listing_id: None,
            created_at: Utc::now().to_rfc3339(),
        };

        let parsed: serde_json::Value =
            serde_json::from_str(&event.to_payload().unwrap()).unwrap();
        assert_eq!(parsed["type"], "message.new");
        assert_eq!(parsed["sender_name"], "marta");
        assert_eq!(parsed["text"], "te cambio la lámpara por el taladro");
        assert!(parsed["listing_id"].is_null());
    }

    #[test]
    fn event_types_are_unique() {
        let types = [
            "message.new",
            "message.send_failed",
            "presence.joined",
            "presence.left",
            "presence.snapshot",
        ];
        let unique: std::collections::HashSet<_> = types.iter().collect();
        assert_eq!(types.len(), unique.len());
    }
}
