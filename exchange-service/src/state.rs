use crate::{
    config::Config,
    services::encryption::EncryptionService,
    store::Store,
    websocket::{presence::PresenceRegistry, ConnectionRegistry},
};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub registry: ConnectionRegistry,
    pub presence: PresenceRegistry,
    pub config: Arc<Config>,
    pub encryption: Arc<EncryptionService>,
}
