use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set, TransactionTrait};
use uuid::Uuid;

use crate::{
    audit,
    dto::messages::{MessageList, ReplyMessageRequest, SendMessageRequest},
    entity::messages::{ActiveModel as MessageActive, Column as MessageCol, Entity as Messages, Model as MessageModel},
    error::{AppError, AppResult},
    events::{ChangeAction, Collection},
    middleware::auth::{AuthUser, ensure_admin},
    models::ContactMessage,
    response::{ApiResponse, Meta},
    services::{auth_service, notification_service},
    state::AppState,
};

const REPLY_PREVIEW_CHARS: usize = 50;

/// Stores a contact inquiry. `sender` links it to an account so replies can
/// be delivered as notifications.
pub async fn send_message(
    state: &AppState,
    sender: Option<&AuthUser>,
    payload: SendMessageRequest,
) -> AppResult<ApiResponse<ContactMessage>> {
    let name = payload.name.trim().to_string();
    let body = payload.message.trim().to_string();
    if name.is_empty() || body.is_empty() {
        return Err(AppError::BadRequest("name and message are required".into()));
    }
    let email = auth_service::normalize_email(&payload.email)?;
    let subject = payload
        .subject
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    let txn = state.orm.begin().await?;
    let message = MessageActive {
        id: Set(Uuid::new_v4()),
        name: Set(name.clone()),
        email: Set(email),
        subject: Set(subject.clone()),
        message: Set(body),
        user_id: Set(sender.map(|u| u.user_id)),
        replied: Set(false),
        reply_text: Set(None),
        created_at: Set(Utc::now().into()),
    }
    .insert(&txn)
    .await?;

    let recipients = notification_service::notify_admins(
        &txn,
        &format!(
            "New message from {name}: \"{}\"",
            subject.as_deref().unwrap_or("No subject")
        ),
    )
    .await?;
    txn.commit().await?;

    state
        .events
        .notify(Collection::Messages, ChangeAction::Created, vec![message.id]);
    notification_service::announce(state, &recipients);

    Ok(ApiResponse::success(
        "Message sent",
        message_from_entity(message),
        Some(Meta::empty()),
    ))
}

pub async fn list_messages(
    state: &AppState,
    admin: &AuthUser,
) -> AppResult<ApiResponse<MessageList>> {
    ensure_admin(admin)?;
    let items: Vec<ContactMessage> = Messages::find()
        .order_by_desc(MessageCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(message_from_entity)
        .collect();

    let meta = Meta::total(items.len());
    Ok(ApiResponse::success("Messages", MessageList { items }, Some(meta)))
}

pub async fn reply_message(
    state: &AppState,
    admin: &AuthUser,
    id: Uuid,
    payload: ReplyMessageRequest,
) -> AppResult<ApiResponse<ContactMessage>> {
    ensure_admin(admin)?;
    let text = payload.text;
    if text.trim().is_empty() {
        return Err(AppError::BadRequest("reply text must not be empty".into()));
    }

    let txn = state.orm.begin().await?;
    let existing = Messages::find_by_id(id).one(&txn).await?.ok_or(AppError::NotFound)?;
    let linked_user = existing.user_id;

    let mut active: MessageActive = existing.into();
    active.replied = Set(true);
    active.reply_text = Set(Some(text.clone()));
    let updated = active.update(&txn).await?;

    // The preview is cut from the text as written, leading whitespace included.
    if let Some(user_id) = linked_user {
        notification_service::notify_user(&txn, user_id, reply_notice(&text)).await?;
    }
    txn.commit().await?;

    state
        .events
        .notify(Collection::Messages, ChangeAction::Updated, vec![id]);
    if let Some(user_id) = linked_user {
        notification_service::announce(state, &[user_id]);
    }
    audit::record(
        &state.orm,
        Some(admin.user_id),
        "message_reply",
        "messages",
        serde_json::json!({ "message_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Reply sent",
        message_from_entity(updated),
        Some(Meta::empty()),
    ))
}

pub async fn remove_message(
    state: &AppState,
    admin: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(admin)?;
    let result = Messages::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    state
        .events
        .notify(Collection::Messages, ChangeAction::Deleted, vec![id]);
    Ok(ApiResponse::success(
        "Message deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

fn reply_notice(text: &str) -> String {
    let preview: String = text.chars().take(REPLY_PREVIEW_CHARS).collect();
    format!("Boutique Support replied to your inquiry: \"{preview}...\"")
}

fn message_from_entity(model: MessageModel) -> ContactMessage {
    ContactMessage {
        id: model.id,
        name: model.name,
        email: model.email,
        subject: model.subject,
        message: model.message,
        user_id: model.user_id,
        replied: model.replied,
        reply_text: model.reply_text,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

#[cfg(test)]
mod tests {
    use super::reply_notice;

    #[test]
    fn reply_preview_is_cut_at_fifty_characters() {
        let long = "a".repeat(80);
        let notice = reply_notice(&long);
        assert_eq!(
            notice,
            format!("Boutique Support replied to your inquiry: \"{}...\"", "a".repeat(50))
        );
        assert_eq!(
            reply_notice("Thanks!"),
            "Boutique Support replied to your inquiry: \"Thanks!...\""
        );
    }

    #[test]
    fn reply_preview_keeps_leading_whitespace() {
        let text = format!("  {}", "b".repeat(60));
        assert_eq!(
            reply_notice(&text),
            format!("Boutique Support replied to your inquiry: \"  {}...\"", "b".repeat(48))
        );
    }
}
