//! The negotiation state machine.
//!
//! Lifecycle: a counterpart proposes (PENDING); only the listing owner may
//! accept or reject; an accepted exchange may be completed by either party.
//! REJECTED and COMPLETED are terminal. At most one open (PENDING/ACCEPTED)
//! proposal exists per (listing, counterpart) pair; a duplicate propose
//! returns the existing row instead of failing.

use crate::error::{AppError, AppResult};
use crate::models::exchange::{Exchange, ExchangeOverview, ExchangeStatus, NewExchange};
use crate::models::listing::ListingStatus;
use crate::store::{ExchangeInsert, Store};
use uuid::Uuid;

pub struct ExchangeService;

impl ExchangeService {
    pub async fn propose(
        store: &dyn Store,
        listing_id: Uuid,
        owner_id: Uuid,
        counterpart_id: Uuid,
        offered_listing_id: Uuid,
    ) -> AppResult<ExchangeInsert> {
        let listing = store
            .listing(listing_id)
            .await?
            .ok_or_else(|| AppError::NotFound("listing not found".into()))?;
        if listing.owner_id != owner_id
            || !listing.is_active
            || listing.exchange_status != ListingStatus::Active
        {
            return Err(AppError::Forbidden(
                "listing is not owned by the stated owner or is no longer active".into(),
            ));
        }

        let offered = store
            .listing(offered_listing_id)
            .await?
            .ok_or_else(|| AppError::NotFound("offered listing not found".into()))?;
        if offered.owner_id != counterpart_id {
            return Err(AppError::Forbidden(
                "offered listing does not belong to the proposing identity".into(),
            ));
        }

        let outcome = store
            .insert_exchange(NewExchange {
                listing_id,
                owner_id,
                counterpart_id,
                offered_listing_id,
            })
            .await?;

        match &outcome {
            ExchangeInsert::Created(exchange) => {
                tracing::info!(exchange_id = %exchange.id, %listing_id, %counterpart_id, "exchange proposed");
            }
            ExchangeInsert::AlreadyOpen(exchange) => {
                tracing::debug!(
                    exchange_id = %exchange.id,
                    status = exchange.status.as_str(),
                    "open proposal already exists for this pair; returning it"
                );
            }
        }
        Ok(outcome)
    }

    pub async fn accept(
        store: &dyn Store,
        listing_id: Uuid,
        counterpart_id: Uuid,
        acting_id: Uuid,
    ) -> AppResult<Exchange> {
        let current = store
            .latest_exchange(listing_id, counterpart_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound("no exchange proposal for this listing and counterpart".into())
            })?;
        if current.status != ExchangeStatus::Pending {
            return Err(AppError::InvalidState(format!(
                "cannot accept an exchange in status {}",
                current.status.as_str()
            )));
        }
        if current.owner_id != acting_id {
            return Err(AppError::Forbidden(
                "only the listing owner may accept".into(),
            ));
        }

        let accepted = store
            .accept_exchange(listing_id, counterpart_id)
            .await?
            .ok_or_else(|| {
                AppError::InvalidState("exchange was transitioned by a concurrent request".into())
            })?;
        tracing::info!(exchange_id = %accepted.id, %listing_id, "exchange accepted; listing withdrawn from discovery");
        Ok(accepted)
    }

    pub async fn reject(
        store: &dyn Store,
        listing_id: Uuid,
        counterpart_id: Uuid,
        acting_id: Uuid,
    ) -> AppResult<Exchange> {
        let current = store
            .latest_exchange(listing_id, counterpart_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound("no exchange proposal for this listing and counterpart".into())
            })?;
        if current.status != ExchangeStatus::Pending {
            return Err(AppError::InvalidState(format!(
                "cannot reject an exchange in status {}",
                current.status.as_str()
            )));
        }
        if current.owner_id != acting_id {
            return Err(AppError::Forbidden(
                "only the listing owner may reject".into(),
            ));
        }

        let rejected = store
            .reject_exchange(listing_id, counterpart_id)
            .await?
            .ok_or_else(|| {
                AppError::InvalidState("exchange was transitioned by a concurrent request".into())
            })?;
        tracing::info!(exchange_id = %rejected.id, %listing_id, "exchange rejected; listing back in circulation");
        Ok(rejected)
    }

    pub async fn complete(
        store: &dyn Store,
        listing_id: Uuid,
        counterpart_id: Uuid,
        acting_id: Uuid,
    ) -> AppResult<Exchange> {
        let current = store
            .latest_exchange(listing_id, counterpart_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound("no exchange proposal for this listing and counterpart".into())
            })?;
        if current.status != ExchangeStatus::Accepted {
            return Err(AppError::InvalidState(format!(
                "only an accepted exchange can be completed, current status is {}",
                current.status.as_str()
            )));
        }
        // Either party may finalize; completion does not require a second
        // confirmation from the other side.
        if acting_id != current.owner_id && acting_id != current.counterpart_id {
            return Err(AppError::Forbidden(
                "only a party to the exchange may complete it".into(),
            ));
        }

        let completed = store
            .complete_exchange(listing_id, counterpart_id)
            .await?
            .ok_or_else(|| {
                AppError::InvalidState("exchange was transitioned by a concurrent request".into())
            })?;
        tracing::info!(
            exchange_id = %completed.id,
            %listing_id,
            offered_listing_id = %completed.offered_listing_id,
            "exchange completed; both listings closed out"
        );
        Ok(completed)
    }

    /// Most recent proposal for the pair, whatever its status.
    pub async fn status(
        store: &dyn Store,
        listing_id: Uuid,
        counterpart_id: Uuid,
    ) -> AppResult<Exchange> {
        store
            .latest_exchange(listing_id, counterpart_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound("no exchange found for this listing and counterpart".into())
            })
    }

    /// Every proposal the identity participates in, enriched for display.
    pub async fn list_for_identity(
        store: &dyn Store,
        user_id: Uuid,
    ) -> AppResult<Vec<ExchangeOverview>> {
        let exchanges = store.exchanges_for_identity(user_id).await?;

        let mut out = Vec::with_capacity(exchanges.len());
        for exchange in exchanges {
            let listing_title = store.listing(exchange.listing_id).await?.map(|l| l.title);
            let offered_listing_title = store
                .listing(exchange.offered_listing_id)
                .await?
                .map(|l| l.title);
            let owner_name = store.display_name(exchange.owner_id).await?;
            let counterpart_name = store.display_name(exchange.counterpart_id).await?;
            out.push(ExchangeOverview {
                exchange,
                listing_title,
                offered_listing_title,
                owner_name,
                counterpart_name,
            });
        }
        Ok(out)
    }
}
