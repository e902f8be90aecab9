pub mod encryption;
pub mod exchange_service;
pub mod message_service;
