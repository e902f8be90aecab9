use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Who is on the channel right now. Process-lifetime only; rebuilt from
/// scratch on restart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PresenceEntry {
    pub id: Uuid,
    pub name: String,
}

#[derive(Default, Clone)]
pub struct PresenceRegistry {
    inner: Arc<RwLock<HashMap<Uuid, PresenceEntry>>>,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent: returns true only when the identity was not present
    /// before, so a second device does not re-announce the join.
    pub async fn register(&self, id: Uuid, name: &str) -> bool {
        let mut guard = self.inner.write().await;
        if guard.contains_key(&id) {
            return false;
        }
        guard.insert(
            id,
            PresenceEntry {
                id,
                name: name.to_string(),
            },
        );
        true
    }

    /// Idempotent: returns true only when an entry was actually removed.
    pub async fn unregister(&self, id: Uuid) -> bool {
        self.inner.write().await.remove(&id).is_some()
    }

    /// Current set, for the initial sync of a new connection.
    pub async fn snapshot(&self) -> Vec<PresenceEntry> {
        self.inner.read().await.values().cloned().collect()
    }

    pub async fn contains(&self, id: Uuid) -> bool {
        self.inner.read().await.contains_key(&id)
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

/// Periodic leak check: an unexpectedly large registry means disconnect
/// cleanup is not keeping up. Logs, never fails.
pub fn spawn_presence_watchdog(
    registry: PresenceRegistry,
    warn_threshold: usize,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        loop {
            interval.tick().await;
            let connected = registry.len().await;
            if connected > warn_threshold {
                tracing::warn!(
                    connected,
                    threshold = warn_threshold,
                    "presence registry unusually large; possible session leak"
                );
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn register_is_idempotent_per_identity() {
        let presence = PresenceRegistry::new();
        let id = Uuid::new_v4();

        assert!(presence.register(id, "marta").await);
        // Second device, same identity: no new entry, no re-announce.
        assert!(!presence.register(id, "marta").await);
        assert_eq!(presence.len().await, 1);
    }

    #[tokio::test]
    async fn unregister_is_idempotent() {
        let presence = PresenceRegistry::new();
        let id = Uuid::new_v4();
        presence.register(id, "marta").await;

        assert!(presence.unregister(id).await);
        assert!(!presence.unregister(id).await);
        assert!(presence.is_empty().await);
    }

    #[tokio::test]
    async fn snapshot_reflects_current_set() {
        let presence = PresenceRegistry::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        presence.register(a, "marta").await;
        presence.register(b, "diego").await;
        presence.unregister(a).await;

        let snapshot = presence.snapshot().await;
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, b);
        assert_eq!(snapshot[0].name, "diego");
    }
}
