use axum::{Json, Router, extract::State, http::StatusCode, routing::post};

use crate::{
    dto::auth::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse},
    error::{AppError, AppResult},
    middleware::auth::SessionToken,
    response::{ApiResponse, Meta},
    services::auth_service::{login_user, logout, register_user},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout_session))
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Register user", body = ApiResponse<RegisterResponse>),
        (status = 409, description = "Email already registered")
    ),
    tag = "Auth"
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<RegisterResponse>>)> {
    let resp = register_user(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login user", body = ApiResponse<LoginResponse>),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<LoginResponse>>> {
    let resp = login_user(&state, payload)
        .await?
        .ok_or(AppError::InvalidCredentials)?;
    Ok(Json(ApiResponse::success("Login success", resp, Some(Meta::empty()))))
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Session revoked"),
        (status = 401, description = "Unknown session")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn logout_session(
    State(state): State<AppState>,
    SessionToken(token): SessionToken,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = logout(&state, &token).await?;
    Ok(Json(resp))
}
