use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Frames a client may send over the channel.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WsInboundEvent {
    #[serde(rename = "message.send")]
    MessageSend {
        recipient_id: Uuid,
        text: String,
        #[serde(default)]
        listing_id: Option<Uuid>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_message_send_with_and_without_listing() {
        let recipient = Uuid::new_v4();
        let raw = format!(
            r#"{{"type":"message.send","recipient_id":"{recipient}","text":"hola"}}"#
        );
        let event: WsInboundEvent = serde_json::from_str(&raw).unwrap();
        let WsInboundEvent::MessageSend {
            recipient_id,
            text,
            listing_id,
        } = event;
        assert_eq!(recipient_id, recipient);
        assert_eq!(text, "hola");
        assert!(listing_id.is_none());

        let listing = Uuid::new_v4();
        let raw = format!(
            r#"{{"type":"message.send","recipient_id":"{recipient}","text":"hola","listing_id":"{listing}"}}"#
        );
        let WsInboundEvent::MessageSend { listing_id, .. } =
            serde_json::from_str(&raw).unwrap();
        assert_eq!(listing_id, Some(listing));
    }

    #[test]
    fn rejects_unknown_frame_type() {
        assert!(serde_json::from_str::<WsInboundEvent>(r#"{"type":"presence.spoof"}"#).is_err());
    }
}
