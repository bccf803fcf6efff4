use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set};
use serde_json::Value;
use uuid::Uuid;

use crate::entity::audit_logs::ActiveModel as AuditActive;

/// Records an audit row after the mutation it describes has committed.
/// A failed write is logged and never fails the caller's request.
pub async fn record<C: ConnectionTrait>(
    db: &C,
    actor_id: Option<Uuid>,
    action: &str,
    collection: &str,
    details: Value,
) {
    let row = AuditActive {
        id: Set(Uuid::new_v4()),
        actor_id: Set(actor_id),
        action: Set(action.to_string()),
        collection: Set(collection.to_string()),
        details: Set(details),
        created_at: Set(Utc::now().into()),
    };
    if let Err(err) = row.insert(db).await {
        tracing::warn!(error = %err, action, collection, "audit log failed");
    }
}
