//! In-memory store used by tests (and handy for local experiments). One
//! mutex over the whole dataset gives the same conditional-write semantics
//! the Postgres partial index enforces.

use crate::error::AppResult;
use crate::models::exchange::{Exchange, ExchangeStatus, NewExchange};
use crate::models::listing::{Listing, ListingStatus};
use crate::models::message::{MessageRecord, NewMessage};
use crate::store::{ExchangeInsert, Store};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Default)]
struct Inner {
    users: HashMap<Uuid, String>,
    listings: HashMap<Uuid, Listing>,
    exchanges: Vec<Exchange>,
    messages: Vec<MessageRecord>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_user(&self, id: Uuid, name: &str) {
        self.inner.lock().await.users.insert(id, name.to_string());
    }

    pub async fn add_listing(&self, listing: Listing) {
        self.inner.lock().await.listings.insert(listing.id, listing);
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn listing(&self, id: Uuid) -> AppResult<Option<Listing>> {
        Ok(self.inner.lock().await.listings.get(&id).cloned())
    }

    async fn display_name(&self, user_id: Uuid) -> AppResult<Option<String>> {
        Ok(self.inner.lock().await.users.get(&user_id).cloned())
    }

    async fn insert_exchange(&self, new: NewExchange) -> AppResult<ExchangeInsert> {
        let mut inner = self.inner.lock().await;
        if let Some(existing) = inner.exchanges.iter().find(|e| {
            e.listing_id == new.listing_id
                && e.counterpart_id == new.counterpart_id
                && e.status.is_open()
        }) {
            return Ok(ExchangeInsert::AlreadyOpen(existing.clone()));
        }

        let exchange = Exchange {
            id: Uuid::new_v4(),
            listing_id: new.listing_id,
            owner_id: new.owner_id,
            counterpart_id: new.counterpart_id,
            offered_listing_id: new.offered_listing_id,
            status: ExchangeStatus::Pending,
            created_at: Utc::now(),
            completed_at: None,
        };
        inner.exchanges.push(exchange.clone());
        Ok(ExchangeInsert::Created(exchange))
    }

    async fn open_exchange(
        &self,
        listing_id: Uuid,
        counterpart_id: Uuid,
    ) -> AppResult<Option<Exchange>> {
        Ok(self
            .inner
            .lock()
            .await
            .exchanges
            .iter()
            .find(|e| {
                e.listing_id == listing_id
                    && e.counterpart_id == counterpart_id
                    && e.status.is_open()
            })
            .cloned())
    }

    async fn latest_exchange(
        &self,
        listing_id: Uuid,
        counterpart_id: Uuid,
    ) -> AppResult<Option<Exchange>> {
        Ok(self
            .inner
            .lock()
            .await
            .exchanges
            .iter()
            .filter(|e| e.listing_id == listing_id && e.counterpart_id == counterpart_id)
            .max_by_key(|e| e.created_at)
            .cloned())
    }

    async fn exchanges_for_identity(&self, user_id: Uuid) -> AppResult<Vec<Exchange>> {
        let mut out: Vec<Exchange> = self
            .inner
            .lock()
            .await
            .exchanges
            .iter()
            .filter(|e| e.owner_id == user_id || e.counterpart_id == user_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }

    async fn accept_exchange(
        &self,
        listing_id: Uuid,
        counterpart_id: Uuid,
    ) -> AppResult<Option<Exchange>> {
        let mut inner = self.inner.lock().await;
        let Some(idx) = inner.exchanges.iter().position(|e| {
            e.listing_id == listing_id
                && e.counterpart_id == counterpart_id
                && e.status == ExchangeStatus::Pending
        }) else {
            return Ok(None);
        };

        inner.exchanges[idx].status = ExchangeStatus::Accepted;
        let exchange = inner.exchanges[idx].clone();
        if let Some(listing) = inner.listings.get_mut(&listing_id) {
            listing.is_active = false;
        }
        Ok(Some(exchange))
    }

    async fn reject_exchange(
        &self,
        listing_id: Uuid,
        counterpart_id: Uuid,
    ) -> AppResult<Option<Exchange>> {
        let mut inner = self.inner.lock().await;
        let Some(idx) = inner.exchanges.iter().position(|e| {
            e.listing_id == listing_id
                && e.counterpart_id == counterpart_id
                && e.status == ExchangeStatus::Pending
        }) else {
            return Ok(None);
        };

        inner.exchanges[idx].status = ExchangeStatus::Rejected;
        let exchange = inner.exchanges[idx].clone();
        if let Some(listing) = inner.listings.get_mut(&listing_id) {
            listing.is_active = true;
            listing.exchange_status = ListingStatus::Active;
        }
        Ok(Some(exchange))
    }

    async fn complete_exchange(
        &self,
        listing_id: Uuid,
        counterpart_id: Uuid,
    ) -> AppResult<Option<Exchange>> {
        let mut inner = self.inner.lock().await;
        let Some(idx) = inner.exchanges.iter().position(|e| {
            e.listing_id == listing_id
                && e.counterpart_id == counterpart_id
                && e.status == ExchangeStatus::Accepted
        }) else {
            return Ok(None);
        };

        inner.exchanges[idx].status = ExchangeStatus::Completed;
        inner.exchanges[idx].completed_at = Some(Utc::now());
        let exchange = inner.exchanges[idx].clone();
        for id in [exchange.listing_id, exchange.offered_listing_id] {
            if let Some(listing) = inner.listings.get_mut(&id) {
                listing.is_active = false;
                listing.exchange_status = ListingStatus::Completed;
            }
        }
        Ok(Some(exchange))
    }

    async fn append_message(&self, new: NewMessage) -> AppResult<MessageRecord> {
        let record = MessageRecord {
            id: Uuid::new_v4(),
            sender_id: new.sender_id,
            recipient_id: new.recipient_id,
            ciphertext: new.ciphertext,
            listing_id: new.listing_id,
            created_at: Utc::now(),
        };
        self.inner.lock().await.messages.push(record.clone());
        Ok(record)
    }

    async fn messages_between(&self, a: Uuid, b: Uuid) -> AppResult<Vec<MessageRecord>> {
        let mut out: Vec<MessageRecord> = self
            .inner
            .lock()
            .await
            .messages
            .iter()
            .filter(|m| {
                (m.sender_id == a && m.recipient_id == b)
                    || (m.sender_id == b && m.recipient_id == a)
            })
            .cloned()
            .collect();
        // Stable sort keeps insertion order for identical timestamps.
        out.sort_by_key(|m| m.created_at);
        Ok(out)
    }
}
