use axum::{Json, Router, extract::State, http::StatusCode, routing::post};

use crate::{
    dto::messages::SendMessageRequest,
    error::AppResult,
    middleware::auth::MaybeAuthUser,
    models::ContactMessage,
    response::ApiResponse,
    services::message_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(send_message))
}

#[utoipa::path(
    post,
    path = "/api/messages",
    request_body = SendMessageRequest,
    responses(
        (status = 201, description = "Inquiry stored, admins notified", body = ApiResponse<ContactMessage>),
        (status = 400, description = "Missing fields")
    ),
    tag = "Messages"
)]
pub async fn send_message(
    State(state): State<AppState>,
    MaybeAuthUser(sender): MaybeAuthUser,
    Json(payload): Json<SendMessageRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<ContactMessage>>)> {
    let resp = message_service::send_message(&state, sender.as_ref(), payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}
