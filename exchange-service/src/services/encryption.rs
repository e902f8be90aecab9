use crate::error::AppError;
use crypto_core::{decrypt_at_rest, encrypt_at_rest, CryptoError};
use hkdf::Hkdf;
use sha2::Sha256;
use uuid::Uuid;

/// Server-managed symmetric encryption derived from a process-wide master key.
#[derive(Clone)]
pub struct EncryptionService {
    master_key: [u8; 32],
}

impl EncryptionService {
    pub fn new(master_key: [u8; 32]) -> Self {
        Self { master_key }
    }

    /// Key for the message thread between two identities. The pair is
    /// canonicalized by ordering, so both directions of a conversation use
    /// the same key and history decrypts regardless of who asks.
    fn derive_thread_key(&self, a: Uuid, b: Uuid) -> [u8; 32] {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let mut info = [0u8; 32];
        info[..16].copy_from_slice(lo.as_bytes());
        info[16..].copy_from_slice(hi.as_bytes());

        let hk = Hkdf::<Sha256>::new(None, &self.master_key);
        let mut key = [0u8; 32];
        hk.expand(&info, &mut key)
            .expect("HKDF expand must succeed for 32 byte output");
        key
    }

    pub fn encrypt(&self, a: Uuid, b: Uuid, plaintext: &[u8]) -> Result<Vec<u8>, AppError> {
        let key = self.derive_thread_key(a, b);
        encrypt_at_rest(plaintext, &key).map_err(|e| AppError::Encryption(e.to_string()))
    }

    pub fn decrypt(&self, a: Uuid, b: Uuid, sealed: &[u8]) -> Result<Vec<u8>, AppError> {
        let key = self.derive_thread_key(a, b);
        decrypt_at_rest(sealed, &key).map_err(|e| match e {
            CryptoError::Corrupt => AppError::CorruptCiphertext,
            other => AppError::Encryption(other.to_string()),
        })
    }
}
