use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    http::{StatusCode, Uri},
    routing::get,
};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer};

use crate::{
    response::{ApiResponse, Meta},
    state::AppState,
};

/// Largest accepted request body; image uploads are the biggest payloads.
pub const MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

pub mod admin;
pub mod auth;
pub mod cart;
pub mod categories;
pub mod doc;
pub mod health;
pub mod messages;
pub mod notifications;
pub mod orders;
pub mod params;
pub mod souvenirs;
pub mod storage;
pub mod users;
pub mod wishlist;
pub mod ws;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/souvenirs", souvenirs::router())
        .nest("/categories", categories::router())
        .nest("/cart", cart::router())
        .nest("/wishlist", wishlist::router())
        .nest("/orders", orders::router())
        .nest("/notifications", notifications::router())
        .nest("/messages", messages::router())
        .nest("/storage", storage::router())
        .nest("/admin", admin::router())
}

/// The complete application: health, WebSocket, REST API and docs, with the
/// body limit and CORS applied. Tracing and request ids are layered on in `main`.
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/ws", get(ws::ws_handler))
        .nest("/api", create_api_router())
        .merge(doc::scalar_docs())
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn not_found(uri: Uri) -> (StatusCode, Json<ApiResponse<serde_json::Value>>) {
    let body = ApiResponse::success(
        "Not Found",
        serde_json::json!({ "path": uri.path() }),
        Some(Meta::empty()),
    );
    (StatusCode::NOT_FOUND, Json(body))
}
