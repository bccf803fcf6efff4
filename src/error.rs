use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::response::{ApiResponse, Meta};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not Found")]
    NotFound,

    #[error("Bad Request {0}")]
    BadRequest(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("{0}")]
    AuthorizationFailed(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("ORM error")]
    OrmError(#[from] sea_orm::DbErr),

    #[error("Storage error")]
    Io(#[from] std::io::Error),

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

/// Machine-readable discriminator carried by every error body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    NotFound,
    BadRequest,
    InvalidCredentials,
    Unauthorized,
    AuthorizationFailed,
    Forbidden,
    Conflict,
    Internal,
}

/// Whether the database refused a write because of a unique index.
pub fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::NotFound => ErrorKind::NotFound,
            AppError::BadRequest(_) => ErrorKind::BadRequest,
            AppError::InvalidCredentials => ErrorKind::InvalidCredentials,
            AppError::Unauthorized(_) => ErrorKind::Unauthorized,
            AppError::AuthorizationFailed(_) => ErrorKind::AuthorizationFailed,
            AppError::Forbidden => ErrorKind::Forbidden,
            AppError::Conflict(_) => ErrorKind::Conflict,
            AppError::OrmError(_) | AppError::Io(_) | AppError::Internal(_) => ErrorKind::Internal,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
            ErrorKind::InvalidCredentials | ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::AuthorizationFailed | ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct ErrorData {
    pub kind: ErrorKind,
    pub error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            AppError::OrmError(err) => tracing::error!(error = %err, "database error"),
            AppError::Io(err) => tracing::error!(error = %err, "storage error"),
            AppError::Internal(err) => tracing::error!(error = %err, "internal error"),
            _ => {}
        }

        let body = ApiResponse {
            message: self.to_string(),
            data: Some(ErrorData {
                kind: self.kind(),
                error: self.to_string(),
            }),
            meta: Some(Meta::empty()),
        };

        (status, axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_errors_are_distinguishable_by_kind() {
        let wrong_password = AppError::AuthorizationFailed("Incorrect current password.".into());
        assert_eq!(wrong_password.kind(), ErrorKind::AuthorizationFailed);
        assert_eq!(wrong_password.status(), StatusCode::FORBIDDEN);

        assert_eq!(AppError::InvalidCredentials.kind(), ErrorKind::InvalidCredentials);
        assert_eq!(AppError::InvalidCredentials.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::NotFound.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn conflict_maps_to_409() {
        let err = AppError::Conflict("email already registered".into());
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(err.to_string(), "Conflict: email already registered");
    }
}
