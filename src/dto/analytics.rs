use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
pub struct RevenuePoint {
    pub date: NaiveDate,
    pub amount: i64,
}

#[derive(Debug, Clone, Default, Serialize, ToSchema, PartialEq, Eq)]
pub struct StatusBreakdown {
    pub pending: u64,
    pub completed: u64,
    pub cancelled: u64,
}

#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
pub struct CategoryCount {
    pub name: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DashboardStats {
    /// Sum of totals over orders that were not cancelled.
    pub total_revenue: i64,
    pub total_orders: u64,
    pub approved_users: u64,
    /// Sum of price times stock across the catalog.
    pub inventory_value: i64,
    pub revenue_timeline: Vec<RevenuePoint>,
    pub status_breakdown: StatusBreakdown,
    pub category_breakdown: Vec<CategoryCount>,
}
