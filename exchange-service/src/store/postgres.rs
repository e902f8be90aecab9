use crate::error::{AppError, AppResult};
use crate::models::exchange::{Exchange, ExchangeStatus, NewExchange};
use crate::models::listing::{Listing, ListingStatus};
use crate::models::message::{MessageRecord, NewMessage};
use crate::store::{ExchangeInsert, Store};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

const EXCHANGE_COLUMNS: &str =
    "id, listing_id, owner_id, counterpart_id, offered_listing_id, status, created_at, completed_at";

#[derive(Clone)]
pub struct PgStore {
    pool: Pool<Postgres>,
}

impl PgStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn parse_exchange_status(raw: &str) -> AppResult<ExchangeStatus> {
    ExchangeStatus::parse(raw).ok_or_else(|| {
        tracing::error!(status = raw, "unrecognized exchange status in store");
        AppError::Internal
    })
}

fn parse_listing_status(raw: &str) -> AppResult<ListingStatus> {
    ListingStatus::parse(raw).ok_or_else(|| {
        tracing::error!(status = raw, "unrecognized listing status in store");
        AppError::Internal
    })
}

fn exchange_from_row(row: &PgRow) -> AppResult<Exchange> {
    let status: String = row.get("status");
    Ok(Exchange {
        id: row.get("id"),
        listing_id: row.get("listing_id"),
        owner_id: row.get("owner_id"),
        counterpart_id: row.get("counterpart_id"),
        offered_listing_id: row.get("offered_listing_id"),
        status: parse_exchange_status(&status)?,
        created_at: row.get("created_at"),
        completed_at: row.get("completed_at"),
    })
}

#[async_trait]
impl Store for PgStore {
    async fn listing(&self, id: Uuid) -> AppResult<Option<Listing>> {
        let row = sqlx::query(
            "SELECT id, owner_id, title, is_active, exchange_status FROM listings WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| {
            let status: String = r.get("exchange_status");
            Ok(Listing {
                id: r.get("id"),
                owner_id: r.get("owner_id"),
                title: r.get("title"),
                is_active: r.get("is_active"),
                exchange_status: parse_listing_status(&status)?,
            })
        })
        .transpose()
    }

    async fn display_name(&self, user_id: Uuid) -> AppResult<Option<String>> {
        let row = sqlx::query("SELECT name FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| r.get("name")))
    }

    async fn insert_exchange(&self, new: NewExchange) -> AppResult<ExchangeInsert> {
        // The partial unique index on open rows is the authoritative guard;
        // a conflicting insert falls through to fetching the existing row.
        // The fetch can miss if the open row is transitioned concurrently,
        // hence the bounded retry.
        for _ in 0..3 {
            if let Some(existing) = self
                .open_exchange(new.listing_id, new.counterpart_id)
                .await?
            {
                return Ok(ExchangeInsert::AlreadyOpen(existing));
            }

            let inserted = sqlx::query(&format!(
                "INSERT INTO exchanges (id, listing_id, owner_id, counterpart_id, offered_listing_id, status) \
                 VALUES ($1, $2, $3, $4, $5, 'PENDING') \
                 ON CONFLICT (listing_id, counterpart_id) WHERE status IN ('PENDING', 'ACCEPTED') DO NOTHING \
                 RETURNING {EXCHANGE_COLUMNS}"
            ))
            .bind(Uuid::new_v4())
            .bind(new.listing_id)
            .bind(new.owner_id)
            .bind(new.counterpart_id)
            .bind(new.offered_listing_id)
            .fetch_optional(&self.pool)
            .await?;

            if let Some(row) = inserted {
                return Ok(ExchangeInsert::Created(exchange_from_row(&row)?));
            }
        }

        tracing::error!(
            listing_id = %new.listing_id,
            counterpart_id = %new.counterpart_id,
            "proposal insert kept conflicting with a vanishing open row"
        );
        Err(AppError::Internal)
    }

    async fn open_exchange(
        &self,
        listing_id: Uuid,
        counterpart_id: Uuid,
    ) -> AppResult<Option<Exchange>> {
        let row = sqlx::query(&format!(
            "SELECT {EXCHANGE_COLUMNS} FROM exchanges \
             WHERE listing_id = $1 AND counterpart_id = $2 AND status IN ('PENDING', 'ACCEPTED')"
        ))
        .bind(listing_id)
        .bind(counterpart_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(|r| exchange_from_row(&r)).transpose()
    }

    async fn latest_exchange(
        &self,
        listing_id: Uuid,
        counterpart_id: Uuid,
    ) -> AppResult<Option<Exchange>> {
        let row = sqlx::query(&format!(
            "SELECT {EXCHANGE_COLUMNS} FROM exchanges \
             WHERE listing_id = $1 AND counterpart_id = $2 \
             ORDER BY created_at DESC LIMIT 1"
        ))
        .bind(listing_id)
        .bind(counterpart_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(|r| exchange_from_row(&r)).transpose()
    }

    async fn exchanges_for_identity(&self, user_id: Uuid) -> AppResult<Vec<Exchange>> {
        let rows = sqlx::query(&format!(
            "SELECT {EXCHANGE_COLUMNS} FROM exchanges \
             WHERE owner_id = $1 OR counterpart_id = $1 \
             ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(exchange_from_row).collect()
    }

    async fn accept_exchange(
        &self,
        listing_id: Uuid,
        counterpart_id: Uuid,
    ) -> AppResult<Option<Exchange>> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(&format!(
            "UPDATE exchanges SET status = 'ACCEPTED' \
             WHERE listing_id = $1 AND counterpart_id = $2 AND status = 'PENDING' \
             RETURNING {EXCHANGE_COLUMNS}"
        ))
        .bind(listing_id)
        .bind(counterpart_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            tx.rollback().await?;
            return Ok(None);
        };

        // The listing leaves discovery while the negotiation proceeds.
        sqlx::query("UPDATE listings SET is_active = FALSE WHERE id = $1")
            .bind(listing_id)
            .execute(&mut *tx)
            .await?;

        let exchange = exchange_from_row(&row)?;
        tx.commit().await?;
        Ok(Some(exchange))
    }

    async fn reject_exchange(
        &self,
        listing_id: Uuid,
        counterpart_id: Uuid,
    ) -> AppResult<Option<Exchange>> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(&format!(
            "UPDATE exchanges SET status = 'REJECTED' \
             WHERE listing_id = $1 AND counterpart_id = $2 AND status = 'PENDING' \
             RETURNING {EXCHANGE_COLUMNS}"
        ))
        .bind(listing_id)
        .bind(counterpart_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            tx.rollback().await?;
            return Ok(None);
        };

        sqlx::query("UPDATE listings SET is_active = TRUE, exchange_status = 'ACTIVE' WHERE id = $1")
            .bind(listing_id)
            .execute(&mut *tx)
            .await?;

        let exchange = exchange_from_row(&row)?;
        tx.commit().await?;
        Ok(Some(exchange))
    }

    async fn complete_exchange(
        &self,
        listing_id: Uuid,
        counterpart_id: Uuid,
    ) -> AppResult<Option<Exchange>> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(&format!(
            "UPDATE exchanges SET status = 'COMPLETED', completed_at = NOW() \
             WHERE listing_id = $1 AND counterpart_id = $2 AND status = 'ACCEPTED' \
             RETURNING {EXCHANGE_COLUMNS}"
        ))
        .bind(listing_id)
        .bind(counterpart_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            tx.rollback().await?;
            return Ok(None);
        };

        let exchange = exchange_from_row(&row)?;

        // Completion is symmetric: both sides leave circulation for good.
        sqlx::query(
            "UPDATE listings SET is_active = FALSE, exchange_status = 'COMPLETED' \
             WHERE id = $1 OR id = $2",
        )
        .bind(exchange.listing_id)
        .bind(exchange.offered_listing_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(exchange))
    }

    async fn append_message(&self, new: NewMessage) -> AppResult<MessageRecord> {
        let id = Uuid::new_v4();
        let row = sqlx::query(
            "INSERT INTO messages (id, sender_id, recipient_id, ciphertext, listing_id) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING created_at",
        )
        .bind(id)
        .bind(new.sender_id)
        .bind(new.recipient_id)
        .bind(&new.ciphertext)
        .bind(new.listing_id)
        .fetch_one(&self.pool)
        .await?;

        let created_at: DateTime<Utc> = row.get("created_at");
        Ok(MessageRecord {
            id,
            sender_id: new.sender_id,
            recipient_id: new.recipient_id,
            ciphertext: new.ciphertext,
            listing_id: new.listing_id,
            created_at,
        })
    }

    async fn messages_between(&self, a: Uuid, b: Uuid) -> AppResult<Vec<MessageRecord>> {
        let rows = sqlx::query(
            "SELECT id, sender_id, recipient_id, ciphertext, listing_id, created_at \
             FROM messages \
             WHERE (sender_id = $1 AND recipient_id = $2) \
                OR (sender_id = $2 AND recipient_id = $1) \
             ORDER BY created_at ASC",
        )
        .bind(a)
        .bind(b)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| MessageRecord {
                id: r.get("id"),
                sender_id: r.get("sender_id"),
                recipient_id: r.get("recipient_id"),
                ciphertext: r.get("ciphertext"),
                listing_id: r.get("listing_id"),
                created_at: r.get("created_at"),
            })
            .collect())
    }
}
