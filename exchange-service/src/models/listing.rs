use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Catalog-side lifecycle of a listed item. The catalog system owns the full
/// record; negotiation only ever flips `is_active`/`exchange_status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ListingStatus {
    Active,
    Completed,
    Canceled,
}

impl ListingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingStatus::Active => "ACTIVE",
            ListingStatus::Completed => "COMPLETED",
            ListingStatus::Canceled => "CANCELED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ACTIVE" => Some(ListingStatus::Active),
            "COMPLETED" => Some(ListingStatus::Completed),
            "CANCELED" => Some(ListingStatus::Canceled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Listing {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub is_active: bool,
    pub exchange_status: ListingStatus,
}
