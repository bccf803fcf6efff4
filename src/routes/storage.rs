use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::storage::UploadUrl,
    error::AppResult,
    middleware::auth::AuthUser,
    models::StoredFile,
    response::ApiResponse,
    services::storage_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(upload))
        .route("/upload-url", post(upload_url))
        .route("/{id}", get(download))
}

#[utoipa::path(
    post,
    path = "/api/storage/upload-url",
    responses(
        (status = 200, description = "Where to POST the file bytes", body = ApiResponse<UploadUrl>)
    ),
    security(("bearer_auth" = [])),
    tag = "Storage"
)]
pub async fn upload_url(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<UploadUrl>>> {
    let resp = storage_service::generate_upload_url(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/storage",
    request_body(content = Vec<u8>, content_type = "application/octet-stream"),
    responses(
        (status = 201, description = "File stored", body = ApiResponse<StoredFile>),
        (status = 400, description = "Empty body")
    ),
    security(("bearer_auth" = [])),
    tag = "Storage"
)]
pub async fn upload(
    State(state): State<AppState>,
    user: AuthUser,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<(StatusCode, Json<ApiResponse<StoredFile>>)> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());
    let resp = storage_service::upload(&state, &user, content_type, &body).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/storage/{id}",
    params(("id" = Uuid, Path, description = "Storage ID")),
    responses(
        (status = 200, description = "File bytes with their stored content type"),
        (status = 404, description = "Not Found")
    ),
    tag = "Storage"
)]
pub async fn download(State(state): State<AppState>, Path(id): Path<Uuid>) -> AppResult<Response> {
    let (content_type, bytes) = storage_service::download(&state, id).await?;
    let content_type = HeaderValue::from_str(&content_type)
        .unwrap_or(HeaderValue::from_static("application/octet-stream"));
    Ok(([(header::CONTENT_TYPE, content_type)], bytes).into_response())
}
