//! Conversation read handler.
//!
//! GET /api/v1/conversations/{id} - Fetch one conversation by id. Used by
//! the library page's deep links to open the session view pre-loaded to a
//! given conversation.

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;

use confab_core::conversation::repository::ConversationRepository;
use confab_types::conversation::{Conversation, ConversationId};

use crate::http::error::AppError;
use crate::http::extractors::identity::CurrentUser;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// GET /api/v1/conversations/{id} - Fetch a conversation by id.
///
/// Only the owner can read it; anything else is indistinguishable from a
/// missing document.
pub async fn get_conversation(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Conversation>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let id: ConversationId = id
        .parse()
        .map_err(|_| AppError::Validation(format!("Invalid conversation id: {id}")))?;

    let conversation = state
        .conversation_repo
        .get(&id)
        .await?
        .filter(|c| c.owner == user.username)
        .ok_or_else(|| AppError::NotFound("Conversation not found".to_string()))?;

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(conversation, request_id, elapsed)
        .with_link("self", &format!("/api/v1/conversations/{id}"))
        .with_link("session", "/api/v1/session");

    Ok(Json(resp))
}
