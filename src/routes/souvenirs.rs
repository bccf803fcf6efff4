use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post},
};
use uuid::Uuid;

use crate::{
    dto::{
        reviews::{AddReviewRequest, ReviewList},
        souvenirs::{
            BulkDeleteRequest, BulkSouvenirStatusRequest, CreateSouvenirRequest, SouvenirList,
            UpdateSouvenirRequest, UpdateSouvenirStatusRequest,
        },
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::{Review, Souvenir},
    response::{Affected, ApiResponse},
    routes::params::SouvenirQuery,
    services::{review_service, souvenir_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_souvenirs).post(create_souvenir))
        .route("/status", patch(update_statuses))
        .route("/bulk-delete", post(delete_souvenirs))
        .route(
            "/{id}",
            get(get_souvenir).patch(update_souvenir).delete(delete_souvenir),
        )
        .route("/{id}/status", patch(update_status))
        .route("/{id}/reviews", get(list_reviews).post(add_review))
}

#[utoipa::path(
    get,
    path = "/api/souvenirs",
    params(SouvenirQuery),
    responses(
        (status = 200, description = "List souvenirs", body = ApiResponse<SouvenirList>)
    ),
    tag = "Souvenirs"
)]
pub async fn list_souvenirs(
    State(state): State<AppState>,
    Query(query): Query<SouvenirQuery>,
) -> AppResult<Json<ApiResponse<SouvenirList>>> {
    let resp = souvenir_service::list_souvenirs(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/souvenirs/{id}",
    params(("id" = Uuid, Path, description = "Souvenir ID")),
    responses(
        (status = 200, description = "Souvenir detail", body = ApiResponse<Souvenir>),
        (status = 404, description = "Not Found")
    ),
    tag = "Souvenirs"
)]
pub async fn get_souvenir(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Souvenir>>> {
    let resp = souvenir_service::get_souvenir(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/souvenirs",
    request_body = CreateSouvenirRequest,
    responses(
        (status = 201, description = "Souvenir created, customers notified", body = ApiResponse<Souvenir>),
        (status = 400, description = "Invalid payload or unknown image"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Souvenirs"
)]
pub async fn create_souvenir(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateSouvenirRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Souvenir>>)> {
    let resp = souvenir_service::create_souvenir(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    patch,
    path = "/api/souvenirs/{id}",
    params(("id" = Uuid, Path, description = "Souvenir ID")),
    request_body = UpdateSouvenirRequest,
    responses(
        (status = 200, description = "Souvenir updated", body = ApiResponse<Souvenir>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Souvenirs"
)]
pub async fn update_souvenir(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSouvenirRequest>,
) -> AppResult<Json<ApiResponse<Souvenir>>> {
    let resp = souvenir_service::update_souvenir(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/souvenirs/{id}/status",
    params(("id" = Uuid, Path, description = "Souvenir ID")),
    request_body = UpdateSouvenirStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = ApiResponse<Souvenir>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Souvenirs"
)]
pub async fn update_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSouvenirStatusRequest>,
) -> AppResult<Json<ApiResponse<Souvenir>>> {
    let resp = souvenir_service::update_status(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/souvenirs/status",
    request_body = BulkSouvenirStatusRequest,
    responses(
        (status = 200, description = "Statuses changed", body = ApiResponse<Affected>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Souvenirs"
)]
pub async fn update_statuses(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<BulkSouvenirStatusRequest>,
) -> AppResult<Json<ApiResponse<Affected>>> {
    let resp = souvenir_service::update_statuses(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/souvenirs/{id}",
    params(("id" = Uuid, Path, description = "Souvenir ID")),
    responses(
        (status = 200, description = "Souvenir and its image deleted"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Souvenirs"
)]
pub async fn delete_souvenir(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = souvenir_service::remove_souvenir(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/souvenirs/bulk-delete",
    request_body = BulkDeleteRequest,
    responses(
        (status = 200, description = "Souvenirs deleted", body = ApiResponse<Affected>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Souvenirs"
)]
pub async fn delete_souvenirs(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<BulkDeleteRequest>,
) -> AppResult<Json<ApiResponse<Affected>>> {
    let resp = souvenir_service::remove_many(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/souvenirs/{id}/reviews",
    params(("id" = Uuid, Path, description = "Souvenir ID")),
    responses(
        (status = 200, description = "Reviews, newest first", body = ApiResponse<ReviewList>)
    ),
    tag = "Reviews"
)]
pub async fn list_reviews(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ReviewList>>> {
    let resp = review_service::list_by_souvenir(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/souvenirs/{id}/reviews",
    params(("id" = Uuid, Path, description = "Souvenir ID")),
    request_body = AddReviewRequest,
    responses(
        (status = 201, description = "Review added, admins notified", body = ApiResponse<Review>),
        (status = 400, description = "Rating out of range"),
        (status = 404, description = "Unknown souvenir")
    ),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
pub async fn add_review(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddReviewRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Review>>)> {
    let resp = review_service::add_review(&state, &user, id, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}
