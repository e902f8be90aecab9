use exchange_service::models::listing::{Listing, ListingStatus};
use exchange_service::store::MemoryStore;
use uuid::Uuid;

pub fn listing(id: Uuid, owner_id: Uuid, title: &str) -> Listing {
    Listing {
        id,
        owner_id,
        title: title.to_string(),
        is_active: true,
        exchange_status: ListingStatus::Active,
    }
}

/// Two identities, one listing each: `owner` offers `listing_id`,
/// `counterpart` owns `offered_id` and wants the trade.
pub struct Scenario {
    pub store: MemoryStore,
    pub owner: Uuid,
    pub counterpart: Uuid,
    pub listing_id: Uuid,
    pub offered_id: Uuid,
}

pub async fn scenario() -> Scenario {
    let store = MemoryStore::new();
    let owner = Uuid::new_v4();
    let counterpart = Uuid::new_v4();
    let listing_id = Uuid::new_v4();
    let offered_id = Uuid::new_v4();

    store.add_user(owner, "marta").await;
    store.add_user(counterpart, "diego").await;
    store.add_listing(listing(listing_id, owner, "lámpara de pie")).await;
    store
        .add_listing(listing(offered_id, counterpart, "taladro percutor"))
        .await;

    Scenario {
        store,
        owner,
        counterpart,
        listing_id,
        offered_id,
    }
}
