use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A persisted chat line. The body is stored encrypted and is immutable once
/// written; ordering for history is by `created_at` ascending.
#[derive(Debug, Clone)]
pub struct MessageRecord {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    /// Sealed body: nonce packaged in front of the AES-GCM ciphertext.
    pub ciphertext: Vec<u8>,
    /// Optional listing this message is negotiating about.
    pub listing_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewMessage {
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub ciphertext: Vec<u8>,
    pub listing_id: Option<Uuid>,
}

/// A message as handed back to clients: body decrypted, or replaced with a
/// corrupt-message marker when the stored record no longer authenticates.
#[derive(Debug, Clone)]
pub struct DecryptedMessage {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub text: String,
    pub listing_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}
