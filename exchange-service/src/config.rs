use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use dotenvy::dotenv;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub encryption_master_key: [u8; 32],
    /// Presence registry size above which the watchdog starts warning.
    pub presence_warn_threshold: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, crate::error::AppError> {
        dotenv().ok();
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| crate::error::AppError::Config("DATABASE_URL missing".into()))?;
        let port = env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        // The message store only ever holds ciphertext; a missing or malformed
        // master key must stop the process before it serves a single request.
        let master_key_b64 = env::var("MESSAGE_ENCRYPTION_MASTER_KEY").map_err(|_| {
            crate::error::AppError::Config("MESSAGE_ENCRYPTION_MASTER_KEY missing".into())
        })?;
        let master_key_bytes = STANDARD.decode(master_key_b64.trim()).map_err(|_| {
            crate::error::AppError::Config("MESSAGE_ENCRYPTION_MASTER_KEY invalid base64".into())
        })?;
        if master_key_bytes.len() != 32 {
            return Err(crate::error::AppError::Config(
                "MESSAGE_ENCRYPTION_MASTER_KEY must decode to 32 bytes".into(),
            ));
        }
        let mut encryption_master_key = [0u8; 32];
        encryption_master_key.copy_from_slice(&master_key_bytes);

        let presence_warn_threshold = env::var("PRESENCE_WARN_THRESHOLD")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(100);

        Ok(Self {
            database_url,
            port,
            encryption_master_key,
            presence_warn_threshold,
        })
    }

    #[cfg(test)]
    pub fn test_defaults() -> Self {
        Self {
            database_url: "postgres://localhost/test".into(),
            port: 3000,
            encryption_master_key: [0u8; 32],
            presence_warn_threshold: 100,
        }
    }
}
