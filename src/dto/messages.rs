use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::ContactMessage;

#[derive(Debug, Deserialize, ToSchema)]
pub struct SendMessageRequest {
    pub name: String,
    pub email: String,
    pub subject: Option<String>,
    pub message: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReplyMessageRequest {
    pub text: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct MessageList {
    #[schema(value_type = Vec<ContactMessage>)]
    pub items: Vec<ContactMessage>,
}
