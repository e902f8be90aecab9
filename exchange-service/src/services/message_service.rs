use crate::error::{AppError, AppResult};
use crate::models::message::{DecryptedMessage, MessageRecord, NewMessage};
use crate::services::encryption::EncryptionService;
use crate::store::Store;
use uuid::Uuid;

/// Shown in place of a stored message that no longer decrypts.
pub const CORRUPT_MESSAGE_MARKER: &str = "[unreadable message]";

pub struct MessageService;

impl MessageService {
    /// Encrypt and persist one chat line. The caller only fans the plaintext
    /// out after this returns Ok: a durable encrypted row is a precondition
    /// for delivery.
    pub async fn send(
        store: &dyn Store,
        encryption: &EncryptionService,
        sender_id: Uuid,
        recipient_id: Uuid,
        text: &str,
        listing_id: Option<Uuid>,
    ) -> AppResult<MessageRecord> {
        if text.is_empty() {
            return Err(AppError::BadRequest("message text cannot be empty".into()));
        }

        let ciphertext = encryption.encrypt(sender_id, recipient_id, text.as_bytes())?;
        store
            .append_message(NewMessage {
                sender_id,
                recipient_id,
                ciphertext,
                listing_id,
            })
            .await
    }

    /// Decrypted transcript between two identities, oldest first. A record
    /// that fails to decrypt becomes a marker entry; the rest of the
    /// transcript is unaffected.
    pub async fn history(
        store: &dyn Store,
        encryption: &EncryptionService,
        a: Uuid,
        b: Uuid,
    ) -> AppResult<Vec<DecryptedMessage>> {
        let records = store.messages_between(a, b).await?;

        Ok(records
            .into_iter()
            .map(|record| {
                let text = match encryption.decrypt(
                    record.sender_id,
                    record.recipient_id,
                    &record.ciphertext,
                ) {
                    Ok(bytes) => match String::from_utf8(bytes) {
                        Ok(text) => text,
                        Err(_) => {
                            tracing::warn!(message_id = %record.id, "decrypted message is not valid utf-8");
                            CORRUPT_MESSAGE_MARKER.to_string()
                        }
                    },
                    Err(e) => {
                        tracing::warn!(message_id = %record.id, error = %e, "failed to decrypt stored message");
                        CORRUPT_MESSAGE_MARKER.to_string()
                    }
                };
                DecryptedMessage {
                    id: record.id,
                    sender_id: record.sender_id,
                    recipient_id: record.recipient_id,
                    text,
                    listing_id: record.listing_id,
                    created_at: record.created_at,
                }
            })
            .collect())
    }
}
