use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, post},
};
use uuid::Uuid;

use crate::{
    dto::notifications::NotificationList,
    error::AppResult,
    middleware::auth::AuthUser,
    response::{Affected, ApiResponse},
    services::notification_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_notifications).delete(clear_notifications))
        .route("/read-all", post(mark_all_read))
        .route("/{id}", delete(remove_notification))
}

#[utoipa::path(
    get,
    path = "/api/notifications",
    responses(
        (status = 200, description = "Notifications with the unread count", body = ApiResponse<NotificationList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Notifications"
)]
pub async fn list_notifications(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<NotificationList>>> {
    let resp = notification_service::list_notifications(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/notifications/read-all",
    responses(
        (status = 200, description = "Unread notifications marked read", body = ApiResponse<Affected>)
    ),
    security(("bearer_auth" = [])),
    tag = "Notifications"
)]
pub async fn mark_all_read(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<Affected>>> {
    let resp = notification_service::mark_all_read(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/notifications",
    responses(
        (status = 200, description = "All notifications deleted", body = ApiResponse<Affected>)
    ),
    security(("bearer_auth" = [])),
    tag = "Notifications"
)]
pub async fn clear_notifications(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<Affected>>> {
    let resp = notification_service::clear_all(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/notifications/{id}",
    params(("id" = Uuid, Path, description = "Notification ID")),
    responses(
        (status = 200, description = "Notification deleted"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Notifications"
)]
pub async fn remove_notification(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = notification_service::remove_notification(&state, &user, id).await?;
    Ok(Json(resp))
}
