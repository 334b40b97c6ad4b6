//! Personality selection and message-send handlers.
//!
//! Endpoints:
//! - POST /api/v1/session/personality - Choose a personality (creates the conversation)
//! - POST /api/v1/session/messages    - Submit a user message, await the reply
//!
//! Both operate on the caller's mounted session. The send endpoint
//! returns only after the completion service answered (or failed); a
//! second submit while one is outstanding gets 409.

use std::time::Instant;

use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use uuid::Uuid;

use confab_core::session::service::SessionSnapshot;
use confab_types::personality::PersonalityKey;

use crate::http::error::AppError;
use crate::http::extractors::identity::CurrentUser;
use crate::http::handlers::session::session_of;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Request body for choosing a personality.
#[derive(Debug, Deserialize)]
pub struct ChoosePersonalityRequest {
    pub key: PersonalityKey,
}

/// POST /api/v1/session/personality - Choose a personality.
///
/// Builds the opening greeting, persists the new conversation (assigning
/// its id), and binds it as the active conversation. On store failure the
/// session stays idle and the error surfaces; nothing is retried.
pub async fn choose_personality(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(body): Json<ChoosePersonalityRequest>,
) -> Result<Json<ApiResponse<SessionSnapshot>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let service = session_of(&state, &user)?;
    let snapshot = service.start_conversation(body.key).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    let resp =
        ApiResponse::success(snapshot, request_id, elapsed).with_link("self", "/api/v1/session");

    Ok(Json(resp))
}

/// Request body for submitting a user message.
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub text: String,
}

/// POST /api/v1/session/messages - Submit a user message.
pub async fn send_message(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(body): Json<SendMessageRequest>,
) -> Result<Json<ApiResponse<SessionSnapshot>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    if body.text.trim().is_empty() {
        return Err(AppError::Validation(
            "Message text must not be empty".to_string(),
        ));
    }

    let service = session_of(&state, &user)?;
    let snapshot = service.send_message(&body.text).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    let resp =
        ApiResponse::success(snapshot, request_id, elapsed).with_link("self", "/api/v1/session");

    Ok(Json(resp))
}
