use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::users::{UpdateProfileRequest, UpdateUserRoleRequest, UpdateUserStatusRequest, UserList},
    entity::{
        cart_items::{Column as CartCol, Entity as CartItems},
        notifications::{Column as NotificationCol, Entity as Notifications},
        sessions::{Column as SessionCol, Entity as Sessions},
        users::{ActiveModel as UserActive, Column as UserCol, Entity as Users, Model as UserModel},
        wishlist_items::{Column as WishlistCol, Entity as WishlistItems},
    },
    error::{AppError, AppResult},
    events::{ChangeAction, Collection},
    middleware::auth::{AuthUser, ensure_admin},
    models::User,
    response::{ApiResponse, Meta},
    services::{auth_service, notification_service, storage_service},
    storage::FileStorage,
    state::AppState,
};

pub async fn get_me(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<User>> {
    let model = Users::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success(
        "OK",
        user_from_entity(model, &state.storage),
        Some(Meta::empty()),
    ))
}

pub async fn list_users(state: &AppState, admin: &AuthUser) -> AppResult<ApiResponse<UserList>> {
    ensure_admin(admin)?;
    let items: Vec<User> = Users::find()
        .order_by_desc(UserCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|u| user_from_entity(u, &state.storage))
        .collect();

    let meta = Meta::total(items.len());
    Ok(ApiResponse::success("Users", UserList { items }, Some(meta)))
}

pub async fn update_profile(
    state: &AppState,
    user: &AuthUser,
    payload: UpdateProfileRequest,
) -> AppResult<ApiResponse<User>> {
    let existing = Users::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    if payload.is_sensitive() {
        let Some(current) = payload.current_password.as_deref() else {
            return Err(AppError::AuthorizationFailed(
                "Current password is required to update sensitive information.".into(),
            ));
        };
        if !auth_service::verify_password(current, &existing.password_hash)? {
            return Err(AppError::AuthorizationFailed(
                "Incorrect current password.".into(),
            ));
        }
    }

    let previous_image = existing.profile_image;
    let mut active: UserActive = existing.into();

    if let Some(name) = payload.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        active.name = Set(name.to_string());
    }
    if let Some(email) = payload.email.as_deref() {
        let email = auth_service::normalize_email(email)?;
        let taken = Users::find()
            .filter(UserCol::Email.eq(email.as_str()))
            .filter(UserCol::Id.ne(user.user_id))
            .one(&state.orm)
            .await?;
        if taken.is_some() {
            return Err(AppError::Conflict("Email is already registered".into()));
        }
        active.email = Set(email);
    }
    if let Some(password) = payload.password.as_deref() {
        auth_service::validate_password(password)?;
        active.password_hash = Set(auth_service::hash_password(password)?);
    }
    let replaced_image = match payload.profile_image {
        Some(image) => {
            storage_service::ensure_exists(&state.orm, image).await?;
            active.profile_image = Set(Some(image));
            previous_image.filter(|old| *old != image)
        }
        None => None,
    };

    let updated = active
        .update(&state.orm)
        .await
        .map_err(auth_service::email_conflict)?;

    if let Some(old) = replaced_image {
        storage_service::discard(state, old).await;
    }
    state
        .events
        .notify(Collection::Users, ChangeAction::Updated, vec![updated.id]);

    Ok(ApiResponse::success(
        "Profile updated",
        user_from_entity(updated, &state.storage),
        Some(Meta::empty()),
    ))
}

pub async fn update_status(
    state: &AppState,
    admin: &AuthUser,
    id: Uuid,
    payload: UpdateUserStatusRequest,
) -> AppResult<ApiResponse<User>> {
    ensure_admin(admin)?;
    let txn = state.orm.begin().await?;
    let existing = Users::find_by_id(id).one(&txn).await?.ok_or(AppError::NotFound)?;

    let mut active: UserActive = existing.into();
    active.status = Set(payload.status);
    let updated = active.update(&txn).await?;

    notification_service::notify_user(
        &txn,
        id,
        format!(
            "Your account status has been updated to: {}",
            payload.status.as_str()
        ),
    )
    .await?;
    txn.commit().await?;

    state.events.notify(Collection::Users, ChangeAction::Updated, vec![id]);
    notification_service::announce(state, &[id]);
    audit::record(
        &state.orm,
        Some(admin.user_id),
        "user_status_update",
        "users",
        serde_json::json!({ "user_id": id, "status": payload.status.as_str() }),
    )
    .await;

    Ok(ApiResponse::success(
        "User status updated",
        user_from_entity(updated, &state.storage),
        Some(Meta::empty()),
    ))
}

pub async fn update_role(
    state: &AppState,
    admin: &AuthUser,
    id: Uuid,
    payload: UpdateUserRoleRequest,
) -> AppResult<ApiResponse<User>> {
    ensure_admin(admin)?;
    let txn = state.orm.begin().await?;
    let existing = Users::find_by_id(id).one(&txn).await?.ok_or(AppError::NotFound)?;

    let mut active: UserActive = existing.into();
    active.role = Set(payload.role);
    let updated = active.update(&txn).await?;

    notification_service::notify_user(
        &txn,
        id,
        format!("Your account role has been updated to: {}", payload.role.as_str()),
    )
    .await?;
    txn.commit().await?;

    state.events.notify(Collection::Users, ChangeAction::Updated, vec![id]);
    notification_service::announce(state, &[id]);
    audit::record(
        &state.orm,
        Some(admin.user_id),
        "user_role_update",
        "users",
        serde_json::json!({ "user_id": id, "role": payload.role.as_str() }),
    )
    .await;

    Ok(ApiResponse::success(
        "User role updated",
        user_from_entity(updated, &state.storage),
        Some(Meta::empty()),
    ))
}

/// Deletes the user together with their cart, wishlist, notifications and
/// sessions. Orders, reviews and contact messages are kept for the records.
pub async fn remove_user(
    state: &AppState,
    admin: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(admin)?;
    let txn = state.orm.begin().await?;
    let user = Users::find_by_id(id).one(&txn).await?.ok_or(AppError::NotFound)?;

    CartItems::delete_many()
        .filter(CartCol::UserId.eq(id))
        .exec(&txn)
        .await?;
    WishlistItems::delete_many()
        .filter(WishlistCol::UserId.eq(id))
        .exec(&txn)
        .await?;
    Notifications::delete_many()
        .filter(NotificationCol::UserId.eq(id))
        .exec(&txn)
        .await?;
    Sessions::delete_many()
        .filter(SessionCol::UserId.eq(id))
        .exec(&txn)
        .await?;
    Users::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;

    if let Some(image) = user.profile_image {
        storage_service::discard(state, image).await;
    }
    state.events.notify(Collection::Users, ChangeAction::Deleted, vec![id]);
    audit::record(
        &state.orm,
        Some(admin.user_id),
        "user_delete",
        "users",
        serde_json::json!({ "user_id": id, "email": user.email }),
    )
    .await;

    Ok(ApiResponse::success(
        "User deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub(crate) fn user_from_entity(model: UserModel, storage: &FileStorage) -> User {
    User {
        id: model.id,
        name: model.name,
        email: model.email,
        role: model.role,
        status: model.status,
        profile_image: model.profile_image,
        profile_image_url: model.profile_image.map(|id| storage.url_for(id)),
        created_at: model.created_at.with_timezone(&Utc),
    }
}
