use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Souvenir, SouvenirStatus};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSouvenirRequest {
    pub name: String,
    pub description: String,
    pub price: i64,
    /// Storage id returned by the upload endpoint.
    pub image: Uuid,
    pub category: String,
    pub status: SouvenirStatus,
    pub stock: i32,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateSouvenirRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub image: Option<Uuid>,
    pub category: Option<String>,
    pub status: Option<SouvenirStatus>,
    pub stock: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateSouvenirStatusRequest {
    pub status: SouvenirStatus,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BulkSouvenirStatusRequest {
    pub ids: Vec<Uuid>,
    pub status: SouvenirStatus,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BulkDeleteRequest {
    pub ids: Vec<Uuid>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct SouvenirList {
    #[schema(value_type = Vec<Souvenir>)]
    pub items: Vec<Souvenir>,
}
