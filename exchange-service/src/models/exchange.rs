use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExchangeStatus {
    Pending,
    Accepted,
    Rejected,
    Completed,
}

impl ExchangeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExchangeStatus::Pending => "PENDING",
            ExchangeStatus::Accepted => "ACCEPTED",
            ExchangeStatus::Rejected => "REJECTED",
            ExchangeStatus::Completed => "COMPLETED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(ExchangeStatus::Pending),
            "ACCEPTED" => Some(ExchangeStatus::Accepted),
            "REJECTED" => Some(ExchangeStatus::Rejected),
            "COMPLETED" => Some(ExchangeStatus::Completed),
            _ => None,
        }
    }

    /// PENDING and ACCEPTED block new proposals for the same pair.
    pub fn is_open(&self) -> bool {
        matches!(self, ExchangeStatus::Pending | ExchangeStatus::Accepted)
    }
}

/// One negotiation between two identities over two listings.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Exchange {
    pub id: Uuid,
    /// The listing the counterpart wants.
    pub listing_id: Uuid,
    pub owner_id: Uuid,
    pub counterpart_id: Uuid,
    /// The listing the counterpart offers in return.
    pub offered_listing_id: Uuid,
    pub status: ExchangeStatus,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewExchange {
    pub listing_id: Uuid,
    pub owner_id: Uuid,
    pub counterpart_id: Uuid,
    pub offered_listing_id: Uuid,
}

/// An exchange enriched with listing titles and party names for presentation.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ExchangeOverview {
    pub exchange: Exchange,
    pub listing_title: Option<String>,
    pub offered_listing_title: Option<String>,
    pub owner_name: Option<String>,
    pub counterpart_name: Option<String>,
}
