//! Identity extraction from the fronting identity provider.
//!
//! The identity provider (login surface, OAuth, profile pages) is external
//! to this system. Deployments put it in front of the API, and it injects
//! the resolved identity as headers:
//!
//! - `x-auth-username` -- stable username (required)
//! - `x-auth-picture`  -- display image URL (optional)
//!
//! Requests without a username are rejected with 401, which the UI turns
//! into a login redirect. This is also the gate that keeps roster and
//! library queries from ever running against an unresolved identity.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::http::error::AppError;
use crate::state::AppState;

/// The authenticated user on a request.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub username: String,
    pub display_image_url: Option<String>,
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let username = parts
            .headers
            .get("x-auth-username")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .ok_or_else(|| {
                AppError::Unauthorized(
                    "Missing identity. The identity provider must supply the 'x-auth-username' header.".to_string(),
                )
            })?;

        let display_image_url = parts
            .headers
            .get("x-auth-picture")
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        Ok(CurrentUser {
            username,
            display_image_url,
        })
    }
}
