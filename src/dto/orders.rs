use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Order, OrderStatus};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct OrderLineRequest {
    pub souvenir_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub items: Vec<OrderLineRequest>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderCreated {
    pub order: Order,
    /// Pre-filled WhatsApp compose link for the manual payment hand-off.
    pub whatsapp_url: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BulkOrderStatusRequest {
    pub ids: Vec<Uuid>,
    pub status: OrderStatus,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct OrderList {
    #[schema(value_type = Vec<Order>)]
    pub items: Vec<Order>,
}
