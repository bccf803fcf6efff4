use std::collections::BTreeMap;

use chrono::{Days, NaiveDate, Utc};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};

use crate::{
    dto::analytics::{CategoryCount, DashboardStats, RevenuePoint, StatusBreakdown},
    entity::{
        enums::{OrderStatus, UserStatus},
        orders::{Entity as Orders, Model as OrderModel},
        souvenirs::{Entity as Souvenirs, Model as SouvenirModel},
        users::{Column as UserCol, Entity as Users},
    },
    error::AppResult,
    middleware::auth::{AuthUser, ensure_admin},
    money::line_total,
    response::{ApiResponse, Meta},
    state::AppState,
};

const TIMELINE_DAYS: u64 = 30;

pub async fn dashboard(state: &AppState, admin: &AuthUser) -> AppResult<ApiResponse<DashboardStats>> {
    ensure_admin(admin)?;
    let orders = Orders::find().all(&state.orm).await?;
    let souvenirs = Souvenirs::find().all(&state.orm).await?;
    let approved_users = Users::find()
        .filter(UserCol::Status.eq(UserStatus::Approved))
        .count(&state.orm)
        .await?;

    let stats = compute_dashboard(&orders, &souvenirs, approved_users, Utc::now().date_naive());
    Ok(ApiResponse::success("Dashboard", stats, Some(Meta::empty())))
}

/// Aggregates the dashboard figures. Cancelled orders count towards the
/// status breakdown and the order total but never towards revenue.
pub fn compute_dashboard(
    orders: &[OrderModel],
    souvenirs: &[SouvenirModel],
    approved_users: u64,
    today: NaiveDate,
) -> DashboardStats {
    let mut status_breakdown = StatusBreakdown::default();
    for order in orders {
        match order.status {
            OrderStatus::PendingWhatsapp => status_breakdown.pending += 1,
            OrderStatus::Completed => status_breakdown.completed += 1,
            OrderStatus::Cancelled => status_breakdown.cancelled += 1,
        }
    }

    let successful = || orders.iter().filter(|o| o.status != OrderStatus::Cancelled);
    let total_revenue = successful().fold(0i64, |acc, o| acc.saturating_add(o.total_price));

    let start = today
        .checked_sub_days(Days::new(TIMELINE_DAYS - 1))
        .unwrap_or(today);
    let mut timeline: BTreeMap<NaiveDate, i64> = start
        .iter_days()
        .take(TIMELINE_DAYS as usize)
        .map(|day| (day, 0))
        .collect();
    for order in successful() {
        let day = order.created_at.with_timezone(&Utc).date_naive();
        if let Some(amount) = timeline.get_mut(&day) {
            *amount = amount.saturating_add(order.total_price);
        }
    }

    let inventory_value = souvenirs.iter().fold(0i64, |acc, s| {
        acc.saturating_add(line_total(s.price, s.stock).unwrap_or(i64::MAX))
    });

    let mut categories: BTreeMap<&str, u64> = BTreeMap::new();
    for souvenir in souvenirs {
        *categories.entry(souvenir.category.as_str()).or_default() += 1;
    }

    DashboardStats {
        total_revenue,
        total_orders: orders.len() as u64,
        approved_users,
        inventory_value,
        revenue_timeline: timeline
            .into_iter()
            .map(|(date, amount)| RevenuePoint { date, amount })
            .collect(),
        status_breakdown,
        category_breakdown: categories
            .into_iter()
            .map(|(name, count)| CategoryCount {
                name: name.to_string(),
                count,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, TimeZone};
    use uuid::Uuid;

    use super::*;
    use crate::entity::enums::SouvenirStatus;

    fn order(total_price: i64, status: OrderStatus, day: NaiveDate) -> OrderModel {
        let at = Utc
            .from_utc_datetime(&day.and_hms_opt(12, 0, 0).unwrap())
            .with_timezone(&FixedOffset::east_opt(0).unwrap());
        OrderModel {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            total_price,
            status,
            created_at: at,
        }
    }

    fn souvenir(category: &str, price: i64, stock: i32) -> SouvenirModel {
        let now = Utc::now().fixed_offset();
        SouvenirModel {
            id: Uuid::new_v4(),
            name: "Item".into(),
            description: String::new(),
            price,
            image: Uuid::new_v4(),
            category: category.into(),
            status: SouvenirStatus::Available,
            stock,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn revenue_skips_cancelled_orders() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 31).unwrap();
        let orders = vec![
            order(1000, OrderStatus::PendingWhatsapp, today),
            order(2500, OrderStatus::Completed, today.pred_opt().unwrap()),
            order(9999, OrderStatus::Cancelled, today),
            // Outside the 30-day window but still revenue.
            order(400, OrderStatus::Completed, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()),
        ];
        let stats = compute_dashboard(&orders, &[], 3, today);

        assert_eq!(stats.total_revenue, 3900);
        assert_eq!(stats.total_orders, 4);
        assert_eq!(stats.approved_users, 3);
        assert_eq!(
            stats.status_breakdown,
            StatusBreakdown {
                pending: 1,
                completed: 2,
                cancelled: 1
            }
        );

        assert_eq!(stats.revenue_timeline.len(), 30);
        let first = &stats.revenue_timeline[0];
        let last = &stats.revenue_timeline[29];
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2025, 3, 2).unwrap());
        assert_eq!(last.date, today);
        assert_eq!(last.amount, 1000);
        assert_eq!(stats.revenue_timeline[28].amount, 2500);
        assert_eq!(stats.revenue_timeline.iter().map(|p| p.amount).sum::<i64>(), 3500);
    }

    #[test]
    fn inventory_and_categories() {
        let souvenirs = vec![
            souvenir("Jewelry", 1500, 4),
            souvenir("Art", 20000, 1),
            souvenir("Jewelry", 500, 0),
        ];
        let stats = compute_dashboard(&[], &souvenirs, 0, Utc::now().date_naive());

        assert_eq!(stats.inventory_value, 26000);
        assert_eq!(
            stats.category_breakdown,
            vec![
                CategoryCount {
                    name: "Art".into(),
                    count: 1
                },
                CategoryCount {
                    name: "Jewelry".into(),
                    count: 2
                },
            ]
        );
        assert!(stats.revenue_timeline.iter().all(|p| p.amount == 0));
    }

    #[test]
    fn huge_amounts_saturate() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 31).unwrap();
        let orders = vec![
            order(i64::MAX, OrderStatus::Completed, today),
            order(1, OrderStatus::Completed, today),
        ];
        let souvenirs = vec![souvenir("Art", i64::MAX, 2), souvenir("Art", 1, 1)];
        let stats = compute_dashboard(&orders, &souvenirs, 0, today);

        assert_eq!(stats.total_revenue, i64::MAX);
        assert_eq!(stats.inventory_value, i64::MAX);
        assert_eq!(stats.revenue_timeline[29].amount, i64::MAX);
    }
}
