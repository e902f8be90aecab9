use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppError;
use crate::services::message_service::MessageService;
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct ChatMessageDto {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub text: String,
    pub listing_id: Option<Uuid>,
    pub created_at: String,
}

/// Decrypted transcript between the caller and the counterpart, oldest first.
pub async fn chat_history(
    State(state): State<AppState>,
    Extension(user_id): Extension<Uuid>,
    Path(counterpart_id): Path<Uuid>,
) -> Result<Json<Vec<ChatMessageDto>>, AppError> {
    let messages = MessageService::history(
        state.store.as_ref(),
        &state.encryption,
        user_id,
        counterpart_id,
    )
    .await?;

    Ok(Json(
        messages
            .into_iter()
            .map(|m| ChatMessageDto {
                id: m.id,
                sender_id: m.sender_id,
                text: m.text,
                listing_id: m.listing_id,
                created_at: m.created_at.to_rfc3339(),
            })
            .collect(),
    ))
}
