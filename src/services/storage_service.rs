use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, Set};
use uuid::Uuid;

use crate::{
    dto::storage::UploadUrl,
    entity::stored_files::{ActiveModel as FileActive, Entity as StoredFiles},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::StoredFile,
    response::{ApiResponse, Meta},
    state::AppState,
};

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

pub async fn generate_upload_url(
    state: &AppState,
    _user: &AuthUser,
) -> AppResult<ApiResponse<UploadUrl>> {
    Ok(ApiResponse::success(
        "Upload URL",
        UploadUrl {
            upload_url: state.storage.upload_url(),
        },
        Some(Meta::empty()),
    ))
}

pub async fn upload(
    state: &AppState,
    user: &AuthUser,
    content_type: Option<&str>,
    bytes: &[u8],
) -> AppResult<ApiResponse<StoredFile>> {
    if bytes.is_empty() {
        return Err(AppError::BadRequest("upload body must not be empty".into()));
    }
    let content_type = content_type
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(DEFAULT_CONTENT_TYPE)
        .to_string();

    let id = Uuid::new_v4();
    state.storage.write(id, bytes).await?;

    let inserted = FileActive {
        id: Set(id),
        content_type: Set(content_type),
        size_bytes: Set(bytes.len() as i64),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await;

    let file = match inserted {
        Ok(file) => file,
        Err(err) => {
            // Keep disk and metadata in step.
            if let Err(io) = state.storage.remove(id).await {
                tracing::warn!(error = %io, storage_id = %id, "orphaned upload");
            }
            return Err(err.into());
        }
    };

    tracing::debug!(storage_id = %id, size = file.size_bytes, uploader = %user.user_id, "file stored");
    Ok(ApiResponse::success(
        "File stored",
        StoredFile {
            storage_id: file.id,
            url: state.storage.url_for(file.id),
            content_type: file.content_type,
            size_bytes: file.size_bytes,
        },
        Some(Meta::empty()),
    ))
}

/// Returns the content type and bytes of a stored file.
pub async fn download(state: &AppState, id: Uuid) -> AppResult<(String, Vec<u8>)> {
    let file = StoredFiles::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let bytes = match state.storage.read(id).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Err(AppError::NotFound),
        Err(err) => return Err(err.into()),
    };
    Ok((file.content_type, bytes))
}

pub async fn ensure_exists<C: ConnectionTrait>(db: &C, id: Uuid) -> AppResult<()> {
    match StoredFiles::find_by_id(id).one(db).await? {
        Some(_) => Ok(()),
        None => Err(AppError::BadRequest(format!("unknown storage id {id}"))),
    }
}

pub async fn delete_file(state: &AppState, id: Uuid) -> AppResult<()> {
    StoredFiles::delete_by_id(id).exec(&state.orm).await?;
    state.storage.remove(id).await?;
    Ok(())
}

/// Deletes a file that no longer has an owner; failures are only logged.
pub async fn discard(state: &AppState, id: Uuid) {
    if let Err(err) = delete_file(state, id).await {
        tracing::warn!(error = %err, storage_id = %id, "failed to delete stored file");
    }
}
