use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::exchange::{Exchange, ExchangeOverview};
use crate::services::exchange_service::ExchangeService;
use crate::state::AppState;
use crate::store::ExchangeInsert;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProposeExchangeRequest {
    /// The listing being asked for.
    pub listing_id: Uuid,
    /// Its owner, as the client believes.
    pub owner_id: Uuid,
    /// The caller's own listing offered in return.
    pub offered_listing_id: Uuid,
}

pub async fn propose_exchange(
    State(state): State<AppState>,
    Extension(user_id): Extension<Uuid>,
    Json(body): Json<ProposeExchangeRequest>,
) -> Result<(StatusCode, Json<Exchange>), AppError> {
    let outcome = ExchangeService::propose(
        state.store.as_ref(),
        body.listing_id,
        body.owner_id,
        user_id,
        body.offered_listing_id,
    )
    .await?;

    Ok(match outcome {
        ExchangeInsert::Created(exchange) => (StatusCode::CREATED, Json(exchange)),
        // Duplicate proposal: hand back the open row, not an error.
        ExchangeInsert::AlreadyOpen(exchange) => (StatusCode::OK, Json(exchange)),
    })
}

pub async fn accept_exchange(
    State(state): State<AppState>,
    Extension(user_id): Extension<Uuid>,
    Path((listing_id, counterpart_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Exchange>, AppError> {
    let exchange =
        ExchangeService::accept(state.store.as_ref(), listing_id, counterpart_id, user_id).await?;
    Ok(Json(exchange))
}

pub async fn reject_exchange(
    State(state): State<AppState>,
    Extension(user_id): Extension<Uuid>,
    Path((listing_id, counterpart_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Exchange>, AppError> {
    let exchange =
        ExchangeService::reject(state.store.as_ref(), listing_id, counterpart_id, user_id).await?;
    Ok(Json(exchange))
}

pub async fn complete_exchange(
    State(state): State<AppState>,
    Extension(user_id): Extension<Uuid>,
    Path((listing_id, counterpart_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Exchange>, AppError> {
    let exchange =
        ExchangeService::complete(state.store.as_ref(), listing_id, counterpart_id, user_id)
            .await?;
    Ok(Json(exchange))
}

pub async fn exchange_status(
    State(state): State<AppState>,
    Path((listing_id, counterpart_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Exchange>, AppError> {
    let exchange = ExchangeService::status(state.store.as_ref(), listing_id, counterpart_id).await?;
    Ok(Json(exchange))
}

pub async fn profile_exchanges(
    State(state): State<AppState>,
    Extension(user_id): Extension<Uuid>,
) -> Result<Json<Vec<ExchangeOverview>>, AppError> {
    let exchanges = ExchangeService::list_for_identity(state.store.as_ref(), user_id).await?;
    Ok(Json(exchanges))
}
