pub mod exchange;
pub mod listing;
pub mod message;
