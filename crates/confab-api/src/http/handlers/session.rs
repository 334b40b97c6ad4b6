//! Session lifecycle HTTP handlers.
//!
//! Endpoints:
//! - POST   /api/v1/session                      - Mount: open the user's session
//! - GET    /api/v1/session                      - Current session snapshot
//! - DELETE /api/v1/session                      - Unmount: discard the session
//! - POST   /api/v1/session/conversations/select - Bind a roster entry
//! - POST   /api/v1/session/reset                - New-conversation intent

use std::sync::Arc;
use std::time::Instant;

use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use uuid::Uuid;

use confab_core::session::service::SessionSnapshot;

use crate::http::error::AppError;
use crate::http::extractors::identity::CurrentUser;
use crate::http::response::ApiResponse;
use crate::state::{AppState, ConcreteSessionService};

/// Fetch the caller's mounted session or 404.
pub(crate) fn session_of(
    state: &AppState,
    user: &CurrentUser,
) -> Result<Arc<ConcreteSessionService>, AppError> {
    state
        .sessions
        .get(&user.username)
        .map(|entry| entry.value().clone())
        .ok_or_else(|| {
            AppError::NotFound("No open session. POST /api/v1/session first.".to_string())
        })
}

/// POST /api/v1/session - Open the user's session and load the roster.
///
/// Remounting replaces any previous session wholesale: state is
/// re-fetched fresh, matching a page reload.
pub async fn open_session(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<ApiResponse<SessionSnapshot>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let service = Arc::new(state.new_session_service());
    let snapshot = service.open(&user.username).await;
    state.sessions.insert(user.username.clone(), service);

    let elapsed = start.elapsed().as_millis() as u64;
    let resp =
        ApiResponse::success(snapshot, request_id, elapsed).with_link("self", "/api/v1/session");

    Ok(Json(resp))
}

/// GET /api/v1/session - Snapshot of the current session.
pub async fn get_session(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<ApiResponse<SessionSnapshot>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let service = session_of(&state, &user)?;
    let snapshot = service.snapshot().await;

    let elapsed = start.elapsed().as_millis() as u64;
    let resp =
        ApiResponse::success(snapshot, request_id, elapsed).with_link("self", "/api/v1/session");

    Ok(Json(resp))
}

/// DELETE /api/v1/session - Discard the session (sign-out / navigation away).
///
/// The roster and conversations stay in the store; only the in-memory
/// session state is dropped.
pub async fn close_session(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let existed = state.sessions.remove(&user.username).is_some();

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(
        serde_json::json!({"closed": existed}),
        request_id,
        elapsed,
    );

    Ok(Json(resp))
}

/// Request body for binding a roster entry.
#[derive(Debug, Deserialize)]
pub struct SelectConversationRequest {
    pub index: usize,
}

/// POST /api/v1/session/conversations/select - Bind a roster entry.
pub async fn select_conversation(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(body): Json<SelectConversationRequest>,
) -> Result<Json<ApiResponse<SessionSnapshot>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let service = session_of(&state, &user)?;
    let snapshot = service.select_conversation(body.index).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    let resp =
        ApiResponse::success(snapshot, request_id, elapsed).with_link("self", "/api/v1/session");

    Ok(Json(resp))
}

/// POST /api/v1/session/reset - New-conversation intent.
pub async fn reset_session(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<ApiResponse<SessionSnapshot>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let service = session_of(&state, &user)?;
    let snapshot = service.new_conversation().await;

    let elapsed = start.elapsed().as_millis() as u64;
    let resp =
        ApiResponse::success(snapshot, request_id, elapsed).with_link("self", "/api/v1/session");

    Ok(Json(resp))
}
