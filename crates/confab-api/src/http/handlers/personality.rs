//! Personality table handler.
//!
//! GET /api/v1/personalities - The static personality table for the
//! selection screen. No identity required; the table is fixed
//! configuration.

use std::time::Instant;

use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use confab_types::personality::PersonalityKey;

use crate::http::response::ApiResponse;

/// One selectable personality.
#[derive(Debug, Serialize)]
pub struct PersonalityInfo {
    pub key: PersonalityKey,
    pub greeting: &'static str,
}

/// GET /api/v1/personalities - List the available personalities.
pub async fn list_personalities() -> Json<ApiResponse<Vec<PersonalityInfo>>> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let personalities = PersonalityKey::ALL
        .into_iter()
        .map(|key| PersonalityInfo {
            key,
            greeting: key.greeting(),
        })
        .collect();

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(personalities, request_id, elapsed)
        .with_link("self", "/api/v1/personalities");

    Json(resp)
}
