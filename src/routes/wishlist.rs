use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, post},
};
use uuid::Uuid;

use crate::{
    dto::wishlist::{ToggleResult, ToggleWishlistRequest, WishlistList},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::wishlist_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_wishlist))
        .route("/toggle", post(toggle_wishlist))
        .route("/{id}", delete(remove_from_wishlist))
}

#[utoipa::path(
    get,
    path = "/api/wishlist",
    responses(
        (status = 200, description = "Wishlist of the current user", body = ApiResponse<WishlistList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Wishlist"
)]
pub async fn list_wishlist(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<WishlistList>>> {
    let resp = wishlist_service::list_wishlist(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/wishlist/toggle",
    request_body = ToggleWishlistRequest,
    responses(
        (status = 200, description = "Added or removed", body = ApiResponse<ToggleResult>),
        (status = 400, description = "Unknown souvenir")
    ),
    security(("bearer_auth" = [])),
    tag = "Wishlist"
)]
pub async fn toggle_wishlist(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<ToggleWishlistRequest>,
) -> AppResult<Json<ApiResponse<ToggleResult>>> {
    let resp = wishlist_service::toggle_wishlist(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/wishlist/{id}",
    params(("id" = Uuid, Path, description = "Wishlist item ID")),
    responses(
        (status = 200, description = "Removed from wishlist"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Wishlist"
)]
pub async fn remove_from_wishlist(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = wishlist_service::remove_from_wishlist(&state, &user, id).await?;
    Ok(Json(resp))
}
