use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::models::{OrderStatus, SouvenirStatus};

/// Pages past this are clamped; the catalog never gets near it.
const MAX_PAGE: i64 = 1_000_000;

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct Pagination {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl Pagination {
    pub fn normalize(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).clamp(1, MAX_PAGE);
        let per_page = self.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1).saturating_mul(per_page);
        (page, per_page, offset)
    }
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SouvenirSortBy {
    CreatedAt,
    Price,
    Name,
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SouvenirQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    /// Case-insensitive match against name and description.
    pub q: Option<String>,
    pub category: Option<String>,
    pub status: Option<SouvenirStatus>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub sort_by: Option<SouvenirSortBy>,
    pub sort_order: Option<SortOrder>,
}

impl SouvenirQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OrderListQuery {
    pub status: Option<OrderStatus>,
}
