use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::notifications::{CreateNotificationRequest, NotificationList},
    entity::{
        enums::Role,
        notifications::{
            ActiveModel as NotificationActive, Column as NotificationCol,
            Entity as Notifications, Model as NotificationModel,
        },
        users::{Column as UserCol, Entity as Users},
    },
    error::{AppError, AppResult},
    events::{ChangeAction, Collection},
    middleware::auth::{AuthUser, ensure_admin},
    models::Notification,
    response::{Affected, ApiResponse, Meta},
    state::AppState,
};

/// Inserts one unread notification for `user_id`.
pub async fn notify_user<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    message: impl Into<String>,
) -> AppResult<NotificationModel> {
    let notification = NotificationActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        message: Set(message.into()),
        read: Set(false),
        created_at: Set(Utc::now().into()),
    }
    .insert(db)
    .await?;
    Ok(notification)
}

/// Fans a notification out to every user holding `role`, returning the recipients.
pub async fn notify_role<C: ConnectionTrait>(
    db: &C,
    role: Role,
    message: &str,
) -> AppResult<Vec<Uuid>> {
    let recipients: Vec<Uuid> = Users::find()
        .filter(UserCol::Role.eq(role))
        .all(db)
        .await?
        .into_iter()
        .map(|u| u.id)
        .collect();

    for user_id in &recipients {
        notify_user(db, *user_id, message).await?;
    }
    tracing::info!(role = role.as_str(), recipients = recipients.len(), "notification fan-out");
    Ok(recipients)
}

pub async fn notify_admins<C: ConnectionTrait>(db: &C, message: &str) -> AppResult<Vec<Uuid>> {
    notify_role(db, Role::Admin, message).await
}

/// Publishes one change event per notified user once the writes are committed.
pub fn announce(state: &AppState, recipients: &[Uuid]) {
    for user_id in recipients {
        state
            .events
            .notify_user(Collection::Notifications, ChangeAction::Created, vec![], *user_id);
    }
}

pub async fn list_notifications(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<NotificationList>> {
    let items: Vec<Notification> = Notifications::find()
        .filter(NotificationCol::UserId.eq(user.user_id))
        .order_by_desc(NotificationCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(notification_from_entity)
        .collect();

    let unread = Notifications::find()
        .filter(NotificationCol::UserId.eq(user.user_id))
        .filter(NotificationCol::Read.eq(false))
        .count(&state.orm)
        .await?;

    let meta = Meta::total(items.len());
    Ok(ApiResponse::success(
        "OK",
        NotificationList { items, unread },
        Some(meta),
    ))
}

pub async fn create_notification(
    state: &AppState,
    admin: &AuthUser,
    payload: CreateNotificationRequest,
) -> AppResult<ApiResponse<Notification>> {
    ensure_admin(admin)?;
    let message = payload.message.trim();
    if message.is_empty() {
        return Err(AppError::BadRequest("message must not be empty".into()));
    }
    if Users::find_by_id(payload.user_id).one(&state.orm).await?.is_none() {
        return Err(AppError::NotFound);
    }

    let notification = notify_user(&state.orm, payload.user_id, message).await?;
    announce(state, &[payload.user_id]);
    audit::record(
        &state.orm,
        Some(admin.user_id),
        "notification_create",
        "notifications",
        serde_json::json!({ "user_id": payload.user_id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Notification sent",
        notification_from_entity(notification),
        Some(Meta::empty()),
    ))
}

pub async fn mark_all_read(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<Affected>> {
    let result = Notifications::update_many()
        .col_expr(NotificationCol::Read, Expr::value(true))
        .filter(NotificationCol::UserId.eq(user.user_id))
        .filter(NotificationCol::Read.eq(false))
        .exec(&state.orm)
        .await?;

    if result.rows_affected > 0 {
        state.events.notify_user(
            Collection::Notifications,
            ChangeAction::Updated,
            vec![],
            user.user_id,
        );
    }
    Ok(ApiResponse::success(
        "Marked as read",
        Affected {
            affected: result.rows_affected,
        },
        Some(Meta::empty()),
    ))
}

pub async fn clear_all(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<Affected>> {
    let result = Notifications::delete_many()
        .filter(NotificationCol::UserId.eq(user.user_id))
        .exec(&state.orm)
        .await?;

    state.events.notify_user(
        Collection::Notifications,
        ChangeAction::Deleted,
        vec![],
        user.user_id,
    );
    Ok(ApiResponse::success(
        "Notifications cleared",
        Affected {
            affected: result.rows_affected,
        },
        Some(Meta::empty()),
    ))
}

pub async fn remove_notification(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = Notifications::delete_many()
        .filter(NotificationCol::Id.eq(id))
        .filter(NotificationCol::UserId.eq(user.user_id))
        .exec(&state.orm)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    state
        .events
        .notify_user(Collection::Notifications, ChangeAction::Deleted, vec![id], user.user_id);
    Ok(ApiResponse::success(
        "Notification removed",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

fn notification_from_entity(model: NotificationModel) -> Notification {
    Notification {
        id: model.id,
        user_id: model.user_id,
        message: model.message,
        read: model.read,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
