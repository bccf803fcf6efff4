use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::CartItem;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddToCartRequest {
    pub souvenir_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateQuantityRequest {
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct CartList {
    #[schema(value_type = Vec<CartItem>)]
    pub items: Vec<CartItem>,
}
