use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::WishlistItem;

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct ToggleWishlistRequest {
    pub souvenir_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ToggleResult {
    /// `true` when the souvenir was added, `false` when it was removed.
    pub added: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct WishlistList {
    #[schema(value_type = Vec<WishlistItem>)]
    pub items: Vec<WishlistItem>,
}
