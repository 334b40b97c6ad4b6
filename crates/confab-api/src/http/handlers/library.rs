//! Keyword library handler.
//!
//! GET /api/v1/library - The current user's extracted words, each linking
//! back to the conversations that mention it. Read-only; a failed query
//! renders as an empty library rather than an error page.

use std::time::Instant;

use axum::Json;
use axum::extract::State;
use uuid::Uuid;

use confab_types::library::KeywordEntry;

use crate::http::error::AppError;
use crate::http::extractors::identity::CurrentUser;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// GET /api/v1/library - List the user's extracted words.
pub async fn list_words(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<ApiResponse<Vec<KeywordEntry>>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let words = state.library_service.list_words(&user.username).await;

    let elapsed = start.elapsed().as_millis() as u64;
    let resp =
        ApiResponse::success(words, request_id, elapsed).with_link("self", "/api/v1/library");

    Ok(Json(resp))
}
