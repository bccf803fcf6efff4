use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

pub use crate::entity::enums::{OrderStatus, Role, SouvenirStatus, UserStatus};

/// A user as exposed over the API; the password hash never leaves the service.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub status: UserStatus,
    pub profile_image: Option<Uuid>,
    pub profile_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Souvenir {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    /// Price in pesewas.
    pub price: i64,
    pub storage_id: Uuid,
    pub image_url: String,
    pub category: String,
    pub status: SouvenirStatus,
    pub stock: i32,
    /// Mean review rating, 0 when the souvenir has no reviews.
    pub rating: f64,
    pub review_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CartItem {
    pub id: Uuid,
    pub user_id: Uuid,
    pub souvenir_id: Uuid,
    pub quantity: i32,
    /// `None` when the souvenir was deleted after being added.
    pub souvenir: Option<Souvenir>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WishlistItem {
    pub id: Uuid,
    pub user_id: Uuid,
    pub souvenir_id: Uuid,
    pub souvenir: Option<Souvenir>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderLine {
    pub souvenir_id: Uuid,
    pub quantity: i32,
    pub price_at_time: i64,
    pub souvenir_name: String,
    pub souvenir_image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_name: Option<String>,
    pub items: Vec<OrderLine>,
    pub total_price: i64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Review {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_name: String,
    pub souvenir_id: Uuid,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// Inbound contact inquiry.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ContactMessage {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub subject: Option<String>,
    pub message: String,
    pub user_id: Option<Uuid>,
    pub replied: bool,
    pub reply_text: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StoredFile {
    pub storage_id: Uuid,
    pub url: String,
    pub content_type: String,
    pub size_bytes: i64,
}
