//! Identity passthrough handler.
//!
//! GET /api/v1/identity - The resolved identity session for the current
//! request: username plus display image for the profile chrome. The
//! identity itself is resolved by the fronting provider; this endpoint
//! just reflects it back so the UI has one origin to talk to.

use std::time::Instant;

use axum::Json;
use uuid::Uuid;

use confab_types::identity::AuthSession;

use crate::http::extractors::identity::CurrentUser;
use crate::http::response::ApiResponse;

/// GET /api/v1/identity - Reflect the resolved identity session.
pub async fn get_identity(user: CurrentUser) -> Json<ApiResponse<AuthSession>> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let session = AuthSession::authenticated(user.username, user.display_image_url);

    let elapsed = start.elapsed().as_millis() as u64;
    let resp =
        ApiResponse::success(session, request_id, elapsed).with_link("self", "/api/v1/identity");

    Json(resp)
}
