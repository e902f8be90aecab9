use axum::extract::ws::Message;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{
    mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender},
    RwLock,
};
use uuid::Uuid;

pub mod events;
pub mod handlers;
pub mod message_types;
pub mod presence;

/// Delivery rooms keyed by identity. Every active connection of an identity
/// holds one channel sender in that identity's room, so a targeted send
/// reaches all of their sessions.
#[derive(Default, Clone)]
pub struct ConnectionRegistry {
    inner: Arc<RwLock<HashMap<Uuid, Vec<(u64, UnboundedSender<Message>)>>>>,
    next_id: Arc<AtomicU64>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_subscriber(&self, user_id: Uuid) -> (u64, UnboundedReceiver<Message>) {
        let (tx, rx) = unbounded_channel();
        let subscriber_id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut guard = self.inner.write().await;
        guard.entry(user_id).or_default().push((subscriber_id, tx));
        (subscriber_id, rx)
    }

    pub async fn remove_subscriber(&self, user_id: Uuid, subscriber_id: u64) {
        let mut guard = self.inner.write().await;
        if let Some(list) = guard.get_mut(&user_id) {
            list.retain(|(id, _)| *id != subscriber_id);
            if list.is_empty() {
                guard.remove(&user_id);
            }
        }
    }

    /// Deliver to one identity's room. A missing room or a closed connection
    /// is a no-op; real-time delivery is best effort.
    pub async fn send_to(&self, user_id: Uuid, msg: Message) {
        let mut guard = self.inner.write().await;
        if let Some(list) = guard.get_mut(&user_id) {
            list.retain(|(_, sender)| sender.send(msg.clone()).is_ok());
        }
    }

    /// Deliver to every connected session (presence announcements).
    pub async fn broadcast_all(&self, msg: Message) {
        let mut guard = self.inner.write().await;
        for list in guard.values_mut() {
            list.retain(|(_, sender)| sender.send(msg.clone()).is_ok());
        }
    }

    #[cfg(test)]
    pub async fn room_count(&self) -> usize {
        self.inner.read().await.len()
    }
}
