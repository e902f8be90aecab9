//! Negotiation state machine tests against the in-memory store.

mod common;

use common::scenario;
use exchange_service::error::AppError;
use exchange_service::models::exchange::ExchangeStatus;
use exchange_service::models::listing::ListingStatus;
use exchange_service::services::exchange_service::ExchangeService;
use exchange_service::store::{ExchangeInsert, Store};
use std::sync::Arc;
use uuid::Uuid;

#[tokio::test]
async fn propose_creates_a_pending_exchange() {
    let s = scenario().await;

    let outcome = ExchangeService::propose(
        &s.store,
        s.listing_id,
        s.owner,
        s.counterpart,
        s.offered_id,
    )
    .await
    .expect("propose");

    let exchange = match outcome {
        ExchangeInsert::Created(e) => e,
        ExchangeInsert::AlreadyOpen(_) => panic!("fresh pair must create a new proposal"),
    };
    assert_eq!(exchange.status, ExchangeStatus::Pending);
    assert_eq!(exchange.owner_id, s.owner);
    assert_eq!(exchange.counterpart_id, s.counterpart);
    assert!(exchange.completed_at.is_none());

    // Proposing alone does not touch the listing.
    let listing = s.store.listing(s.listing_id).await.unwrap().unwrap();
    assert!(listing.is_active);
}

#[tokio::test]
async fn propose_validates_references_and_ownership() {
    let s = scenario().await;

    // Unknown target listing
    let err = ExchangeService::propose(
        &s.store,
        Uuid::new_v4(),
        s.owner,
        s.counterpart,
        s.offered_id,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    // Unknown offered listing
    let err = ExchangeService::propose(
        &s.store,
        s.listing_id,
        s.owner,
        s.counterpart,
        Uuid::new_v4(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    // Stated owner is wrong
    let err = ExchangeService::propose(
        &s.store,
        s.listing_id,
        s.counterpart,
        s.counterpart,
        s.offered_id,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    // Offered listing does not belong to the proposer
    let err = ExchangeService::propose(
        &s.store,
        s.offered_id,
        s.counterpart,
        s.owner,
        s.offered_id,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
}

#[tokio::test]
async fn duplicate_propose_returns_the_open_row() {
    let s = scenario().await;

    let first = ExchangeService::propose(
        &s.store,
        s.listing_id,
        s.owner,
        s.counterpart,
        s.offered_id,
    )
    .await
    .unwrap()
    .into_exchange();

    let second = ExchangeService::propose(
        &s.store,
        s.listing_id,
        s.owner,
        s.counterpart,
        s.offered_id,
    )
    .await
    .unwrap();

    match second {
        ExchangeInsert::AlreadyOpen(existing) => assert_eq!(existing.id, first.id),
        ExchangeInsert::Created(_) => panic!("second propose must not create a duplicate"),
    }

    let all = s.store.exchanges_for_identity(s.owner).await.unwrap();
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn concurrent_proposes_converge_on_one_row() {
    let s = scenario().await;
    let store = Arc::new(s.store);

    let mut handles = Vec::new();
    for _ in 0..8 {
        let store = Arc::clone(&store);
        let (listing_id, owner, counterpart, offered_id) =
            (s.listing_id, s.owner, s.counterpart, s.offered_id);
        handles.push(tokio::spawn(async move {
            ExchangeService::propose(store.as_ref(), listing_id, owner, counterpart, offered_id)
                .await
                .map(|o| o.into_exchange().id)
        }));
    }

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap().expect("propose must not fail"));
    }

    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 1, "every caller must see the same proposal id");

    let all = store.exchanges_for_identity(s.owner).await.unwrap();
    assert_eq!(all.len(), 1, "exactly one row must exist afterwards");
}

#[tokio::test]
async fn accept_requires_the_owner_and_withdraws_the_listing() {
    let s = scenario().await;
    ExchangeService::propose(&s.store, s.listing_id, s.owner, s.counterpart, s.offered_id)
        .await
        .unwrap();

    // The counterpart cannot accept their own proposal.
    let err = ExchangeService::accept(&s.store, s.listing_id, s.counterpart, s.counterpart)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let accepted = ExchangeService::accept(&s.store, s.listing_id, s.counterpart, s.owner)
        .await
        .unwrap();
    assert_eq!(accepted.status, ExchangeStatus::Accepted);

    let listing = s.store.listing(s.listing_id).await.unwrap().unwrap();
    assert!(!listing.is_active, "accepted listing leaves discovery");
}

#[tokio::test]
async fn accept_without_a_proposal_is_not_found() {
    let s = scenario().await;
    let err = ExchangeService::accept(&s.store, s.listing_id, s.counterpart, s.owner)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn reject_restores_the_listing_and_blocks_further_accepts() {
    let s = scenario().await;
    ExchangeService::propose(&s.store, s.listing_id, s.owner, s.counterpart, s.offered_id)
        .await
        .unwrap();

    let rejected = ExchangeService::reject(&s.store, s.listing_id, s.counterpart, s.owner)
        .await
        .unwrap();
    assert_eq!(rejected.status, ExchangeStatus::Rejected);

    let listing = s.store.listing(s.listing_id).await.unwrap().unwrap();
    assert!(listing.is_active);
    assert_eq!(listing.exchange_status, ListingStatus::Active);

    // REJECTED is terminal for this proposal.
    let err = ExchangeService::accept(&s.store, s.listing_id, s.counterpart, s.owner)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));
}

#[tokio::test]
async fn rejected_pair_can_negotiate_again() {
    let s = scenario().await;
    ExchangeService::propose(&s.store, s.listing_id, s.owner, s.counterpart, s.offered_id)
        .await
        .unwrap();
    ExchangeService::reject(&s.store, s.listing_id, s.counterpart, s.owner)
        .await
        .unwrap();

    // The uniqueness constraint is scoped to open rows only.
    let outcome = ExchangeService::propose(
        &s.store,
        s.listing_id,
        s.owner,
        s.counterpart,
        s.offered_id,
    )
    .await
    .unwrap();
    assert!(matches!(outcome, ExchangeInsert::Created(_)));

    let all = s.store.exchanges_for_identity(s.owner).await.unwrap();
    assert_eq!(all.len(), 2, "the rejected row stays as history");
}

#[tokio::test]
async fn complete_closes_out_both_listings() {
    let s = scenario().await;
    ExchangeService::propose(&s.store, s.listing_id, s.owner, s.counterpart, s.offered_id)
        .await
        .unwrap();
    ExchangeService::accept(&s.store, s.listing_id, s.counterpart, s.owner)
        .await
        .unwrap();

    // A third identity is not a party to the exchange.
    let err = ExchangeService::complete(&s.store, s.listing_id, s.counterpart, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    // Either party may finalize; here the counterpart does.
    let completed = ExchangeService::complete(&s.store, s.listing_id, s.counterpart, s.counterpart)
        .await
        .unwrap();
    assert_eq!(completed.status, ExchangeStatus::Completed);
    assert!(completed.completed_at.is_some());

    for id in [s.listing_id, s.offered_id] {
        let listing = s.store.listing(id).await.unwrap().unwrap();
        assert!(!listing.is_active);
        assert_eq!(listing.exchange_status, ListingStatus::Completed);
    }

    // COMPLETED is terminal.
    let err = ExchangeService::complete(&s.store, s.listing_id, s.counterpart, s.owner)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));
    let err = ExchangeService::reject(&s.store, s.listing_id, s.counterpart, s.owner)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));
}

#[tokio::test]
async fn complete_requires_an_accepted_exchange() {
    let s = scenario().await;
    ExchangeService::propose(&s.store, s.listing_id, s.owner, s.counterpart, s.offered_id)
        .await
        .unwrap();

    let err = ExchangeService::complete(&s.store, s.listing_id, s.counterpart, s.owner)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));
}

#[tokio::test]
async fn status_returns_the_most_recent_proposal() {
    let s = scenario().await;

    let err = ExchangeService::status(&s.store, s.listing_id, s.counterpart)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    ExchangeService::propose(&s.store, s.listing_id, s.owner, s.counterpart, s.offered_id)
        .await
        .unwrap();
    ExchangeService::reject(&s.store, s.listing_id, s.counterpart, s.owner)
        .await
        .unwrap();

    // Terminal rows stay visible to status lookups.
    let latest = ExchangeService::status(&s.store, s.listing_id, s.counterpart)
        .await
        .unwrap();
    assert_eq!(latest.status, ExchangeStatus::Rejected);
}

#[tokio::test]
async fn profile_listing_is_enriched_for_both_parties() {
    let s = scenario().await;
    ExchangeService::propose(&s.store, s.listing_id, s.owner, s.counterpart, s.offered_id)
        .await
        .unwrap();

    for identity in [s.owner, s.counterpart] {
        let overviews = ExchangeService::list_for_identity(&s.store, identity)
            .await
            .unwrap();
        assert_eq!(overviews.len(), 1);
        let overview = &overviews[0];
        assert_eq!(overview.listing_title.as_deref(), Some("lámpara de pie"));
        assert_eq!(
            overview.offered_listing_title.as_deref(),
            Some("taladro percutor")
        );
        assert_eq!(overview.owner_name.as_deref(), Some("marta"));
        assert_eq!(overview.counterpart_name.as_deref(), Some("diego"));
    }
}
