//! Axum router configuration with middleware.
//!
//! All routes are under `/api/v1/`. Middleware: CORS, request tracing.
//!
//! In production, the built SPA is served from `web/dist/` (configurable
//! via `CONFAB_WEB_DIR`). API routes take priority; unknown paths fall
//! through to the SPA's `index.html` for client-side routing. If the
//! directory does not exist, only the API is served.

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Session lifecycle
        .route(
            "/session",
            post(handlers::session::open_session)
                .get(handlers::session::get_session)
                .delete(handlers::session::close_session),
        )
        .route(
            "/session/personality",
            post(handlers::chat::choose_personality),
        )
        .route("/session/messages", post(handlers::chat::send_message))
        .route(
            "/session/conversations/select",
            post(handlers::session::select_conversation),
        )
        .route("/session/reset", post(handlers::session::reset_session))
        // Conversation reads (library deep links)
        .route(
            "/conversations/{id}",
            get(handlers::conversation::get_conversation),
        )
        // Identity passthrough (profile chrome)
        .route("/identity", get(handlers::identity::get_identity))
        // Static personality table
        .route(
            "/personalities",
            get(handlers::personality::list_personalities),
        )
        // Keyword library
        .route("/library", get(handlers::library::list_words));

    let mut router = Router::new()
        .nest("/api/v1", api_routes)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Serve the built SPA from disk if the directory exists. API routes
    // and /health take priority; unknown paths fall through to index.html
    // for client-side routing.
    let web_dir = std::env::var("CONFAB_WEB_DIR").unwrap_or_else(|_| "web/dist".to_string());
    if std::path::Path::new(&web_dir).exists() {
        let index_path = format!("{web_dir}/index.html");
        let serve_dir = ServeDir::new(&web_dir).fallback(ServeFile::new(index_path));
        router = router.fallback_service(serve_dir);
        tracing::info!(path = %web_dir, "SPA static file serving enabled");
    }

    router
}

/// GET /health - Simple health check endpoint (no auth required).
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
