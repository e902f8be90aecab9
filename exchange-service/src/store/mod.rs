//! Document-store boundary for the negotiation and messaging core.
//!
//! The trait methods for exchange transitions are conditional writes: the
//! status guard and the listing side effects land in one atomic write path,
//! so a transition observed by a client is always fully applied or not at
//! all. `PgStore` is the serving implementation; `MemoryStore` reproduces the
//! same conditional semantics for tests.

use crate::error::AppResult;
use crate::models::exchange::{Exchange, NewExchange};
use crate::models::listing::Listing;
use crate::models::message::{MessageRecord, NewMessage};
use async_trait::async_trait;
use uuid::Uuid;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Outcome of the conditional proposal insert.
#[derive(Debug, Clone)]
pub enum ExchangeInsert {
    Created(Exchange),
    /// An open (PENDING/ACCEPTED) proposal already existed for the pair; the
    /// caller gets that row back instead of a duplicate.
    AlreadyOpen(Exchange),
}

impl ExchangeInsert {
    pub fn into_exchange(self) -> Exchange {
        match self {
            ExchangeInsert::Created(exchange) | ExchangeInsert::AlreadyOpen(exchange) => exchange,
        }
    }
}

#[async_trait]
pub trait Store: Send + Sync {
    // Catalog and directory reads (records owned by external systems).
    async fn listing(&self, id: Uuid) -> AppResult<Option<Listing>>;
    async fn display_name(&self, user_id: Uuid) -> AppResult<Option<String>>;

    /// Insert a PENDING proposal unless an open one already exists for
    /// (listing, counterpart). The open-proposal uniqueness constraint is
    /// enforced here, not in callers.
    async fn insert_exchange(&self, new: NewExchange) -> AppResult<ExchangeInsert>;

    /// The open (PENDING/ACCEPTED) proposal for the pair, if any.
    async fn open_exchange(
        &self,
        listing_id: Uuid,
        counterpart_id: Uuid,
    ) -> AppResult<Option<Exchange>>;

    /// Most recent proposal for the pair across all statuses.
    async fn latest_exchange(
        &self,
        listing_id: Uuid,
        counterpart_id: Uuid,
    ) -> AppResult<Option<Exchange>>;

    /// Every proposal where the identity is owner or counterpart, newest
    /// first.
    async fn exchanges_for_identity(&self, user_id: Uuid) -> AppResult<Vec<Exchange>>;

    /// PENDING -> ACCEPTED, deactivating the listing in the same write path.
    /// `None` when no PENDING row exists for the pair anymore.
    async fn accept_exchange(
        &self,
        listing_id: Uuid,
        counterpart_id: Uuid,
    ) -> AppResult<Option<Exchange>>;

    /// PENDING -> REJECTED, returning the listing to circulation.
    async fn reject_exchange(
        &self,
        listing_id: Uuid,
        counterpart_id: Uuid,
    ) -> AppResult<Option<Exchange>>;

    /// ACCEPTED -> COMPLETED, closing out both listings symmetrically.
    async fn complete_exchange(
        &self,
        listing_id: Uuid,
        counterpart_id: Uuid,
    ) -> AppResult<Option<Exchange>>;

    // Messages: append-only, paired history.
    async fn append_message(&self, new: NewMessage) -> AppResult<MessageRecord>;

    /// All messages between the two identities in either direction, ascending
    /// by creation time.
    async fn messages_between(&self, a: Uuid, b: Uuid) -> AppResult<Vec<MessageRecord>>;
}
