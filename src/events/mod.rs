//! Change notifications that replace the hosted backend's live queries.
//!
//! Services publish a [`ChangeEvent`] after every committed mutation. The
//! WebSocket endpoint forwards events to clients that subscribed to the
//! affected collection, and clients re-fetch the collection on receipt.

mod bus;
mod subscription;

pub use bus::EventBus;
pub use subscription::{SubscriptionFilter, Viewer};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Collections a client can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Users,
    Souvenirs,
    Categories,
    CartItems,
    WishlistItems,
    Orders,
    Reviews,
    Notifications,
    Messages,
}

/// Who may receive events of a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    /// Readable without a session over REST as well.
    Public,
    /// Only the user owning the affected rows.
    Owner,
    Admin,
}

impl Collection {
    pub fn audience(&self) -> Audience {
        match self {
            Collection::Souvenirs | Collection::Categories | Collection::Reviews => Audience::Public,
            Collection::CartItems | Collection::WishlistItems | Collection::Notifications => {
                Audience::Owner
            }
            Collection::Users | Collection::Orders | Collection::Messages => Audience::Admin,
        }
    }

    /// Whether rows of this collection belong to a single user.
    pub fn is_user_scoped(&self) -> bool {
        self.audience() == Audience::Owner
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ChangeAction {
    Created,
    Updated,
    Deleted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ChangeEvent {
    pub collection: Collection,
    pub action: ChangeAction,
    pub ids: Vec<Uuid>,
    /// Owner of the affected rows for user-scoped collections.
    pub user_id: Option<Uuid>,
    pub timestamp: DateTime<Utc>,
}

impl ChangeEvent {
    pub fn new(collection: Collection, action: ChangeAction, ids: Vec<Uuid>) -> Self {
        Self {
            collection,
            action,
            ids,
            user_id: None,
            timestamp: Utc::now(),
        }
    }

    pub fn for_user(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }
}
