use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get, patch, post},
};
use uuid::Uuid;

use crate::{
    dto::{
        analytics::DashboardStats,
        messages::{MessageList, ReplyMessageRequest},
        notifications::CreateNotificationRequest,
        orders::{BulkOrderStatusRequest, OrderList, UpdateOrderStatusRequest},
        souvenirs::BulkDeleteRequest,
        users::{UpdateUserRoleRequest, UpdateUserStatusRequest, UserList},
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::{ContactMessage, Notification, Order, User},
    response::{Affected, ApiResponse},
    routes::params::OrderListQuery,
    services::{
        analytics_service, message_service, notification_service, order_service, user_service,
    },
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/{id}", delete(delete_user))
        .route("/users/{id}/status", patch(update_user_status))
        .route("/users/{id}/role", patch(update_user_role))
        .route("/orders", get(list_all_orders))
        .route("/orders/status", patch(update_order_statuses))
        .route("/orders/bulk-delete", post(delete_orders))
        .route("/orders/{id}", delete(delete_order))
        .route("/orders/{id}/status", patch(update_order_status))
        .route("/notifications", post(create_notification))
        .route("/messages", get(list_messages))
        .route("/messages/{id}", delete(delete_message))
        .route("/messages/{id}/reply", post(reply_message))
        .route("/analytics", get(analytics))
}

#[utoipa::path(
    get,
    path = "/api/admin/users",
    responses(
        (status = 200, description = "All users, newest first", body = ApiResponse<UserList>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_users(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<UserList>>> {
    let resp = user_service::list_users(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/admin/users/{id}/status",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateUserStatusRequest,
    responses(
        (status = 200, description = "Status changed and user notified", body = ApiResponse<User>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_user_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserStatusRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    let resp = user_service::update_status(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/admin/users/{id}/role",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateUserRoleRequest,
    responses(
        (status = 200, description = "Role changed and user notified", body = ApiResponse<User>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_user_role(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserRoleRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    let resp = user_service::update_role(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/admin/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User and personal data deleted"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_user(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = user_service::remove_user(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/orders",
    params(OrderListQuery),
    responses(
        (status = 200, description = "Get all orders (admin only)", body = ApiResponse<OrderList>),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal Server Error"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_all_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = order_service::list_all(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/admin/orders/{id}/status",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Update order status", body = ApiResponse<Order>),
        (status = 400, description = "Invalid status"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let resp = order_service::update_status(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/admin/orders/status",
    request_body = BulkOrderStatusRequest,
    responses(
        (status = 200, description = "Bulk status overwrite", body = ApiResponse<Affected>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_order_statuses(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<BulkOrderStatusRequest>,
) -> AppResult<Json<ApiResponse<Affected>>> {
    let resp = order_service::update_statuses(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/admin/orders/{id}",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order and its lines deleted"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = order_service::remove_order(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/orders/bulk-delete",
    request_body = BulkDeleteRequest,
    responses(
        (status = 200, description = "Orders deleted", body = ApiResponse<Affected>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<BulkDeleteRequest>,
) -> AppResult<Json<ApiResponse<Affected>>> {
    let resp = order_service::remove_many(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/notifications",
    request_body = CreateNotificationRequest,
    responses(
        (status = 200, description = "Notification delivered", body = ApiResponse<Notification>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Unknown user")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_notification(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateNotificationRequest>,
) -> AppResult<Json<ApiResponse<Notification>>> {
    let resp = notification_service::create_notification(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/messages",
    responses(
        (status = 200, description = "Contact inbox, newest first", body = ApiResponse<MessageList>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_messages(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<MessageList>>> {
    let resp = message_service::list_messages(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/messages/{id}/reply",
    params(("id" = Uuid, Path, description = "Message ID")),
    request_body = ReplyMessageRequest,
    responses(
        (status = 200, description = "Reply stored", body = ApiResponse<ContactMessage>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn reply_message(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReplyMessageRequest>,
) -> AppResult<Json<ApiResponse<ContactMessage>>> {
    let resp = message_service::reply_message(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/admin/messages/{id}",
    params(("id" = Uuid, Path, description = "Message ID")),
    responses(
        (status = 200, description = "Message deleted"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_message(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = message_service::remove_message(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/analytics",
    responses(
        (status = 200, description = "Dashboard figures", body = ApiResponse<DashboardStats>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn analytics(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<DashboardStats>>> {
    let resp = analytics_service::dashboard(&state, &user).await?;
    Ok(Json(resp))
}
