use std::collections::HashMap;

use chrono::Utc;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait, sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::orders::{
        BulkOrderStatusRequest, CreateOrderRequest, OrderCreated, OrderList,
        UpdateOrderStatusRequest,
    },
    dto::souvenirs::BulkDeleteRequest,
    entity::{
        cart_items::{Column as CartCol, Entity as CartItems},
        enums::OrderStatus,
        order_items::{ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems, Model as OrderItemModel},
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
        souvenirs::{Column as SouvenirCol, Entity as Souvenirs},
        users::{Column as UserCol, Entity as Users},
    },
    error::{AppError, AppResult},
    events::{ChangeAction, Collection},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Order, OrderLine},
    money::{format_cedis, line_total},
    response::{Affected, ApiResponse, Meta},
    routes::params::OrderListQuery,
    services::{cart_service, notification_service},
    state::AppState,
    storage::FileStorage,
};

const DELETED_ITEM: &str = "Deleted Item";
const UNKNOWN_USER: &str = "Unknown User";

/// Characters left intact by JavaScript's `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Places an order from the submitted lines. Prices are snapshotted from the
/// catalog, the caller's cart is emptied and every admin is notified.
pub async fn create_order(
    state: &AppState,
    user: &AuthUser,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<OrderCreated>> {
    if payload.items.is_empty() {
        return Err(AppError::BadRequest("Order must contain at least one item".into()));
    }
    for line in &payload.items {
        cart_service::validate_quantity(line.quantity)?;
    }

    let txn = state.orm.begin().await?;

    let ids: Vec<Uuid> = payload.items.iter().map(|l| l.souvenir_id).collect();
    let souvenirs: HashMap<Uuid, _> = Souvenirs::find()
        .filter(SouvenirCol::Id.is_in(ids))
        .all(&txn)
        .await?
        .into_iter()
        .map(|s| (s.id, s))
        .collect();

    let mut total_price: i64 = 0;
    let mut priced = Vec::with_capacity(payload.items.len());
    for line in &payload.items {
        let souvenir = souvenirs.get(&line.souvenir_id).ok_or_else(|| {
            AppError::BadRequest(format!("souvenir {} not found", line.souvenir_id))
        })?;
        total_price = line_total(souvenir.price, line.quantity)
            .and_then(|amount| total_price.checked_add(amount))
            .ok_or_else(|| AppError::BadRequest("order total too large".into()))?;
        priced.push((souvenir, line.quantity));
    }

    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        total_price: Set(total_price),
        status: Set(OrderStatus::PendingWhatsapp),
        created_at: Set(Utc::now().into()),
    }
    .insert(&txn)
    .await?;

    let mut lines = Vec::with_capacity(priced.len());
    for (souvenir, quantity) in &priced {
        let item = OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            souvenir_id: Set(souvenir.id),
            quantity: Set(*quantity),
            price_at_time: Set(souvenir.price),
        }
        .insert(&txn)
        .await?;
        lines.push(OrderLine {
            souvenir_id: item.souvenir_id,
            quantity: item.quantity,
            price_at_time: item.price_at_time,
            souvenir_name: souvenir.name.clone(),
            souvenir_image: Some(state.storage.url_for(souvenir.image)),
        });
    }

    let cleared = CartItems::delete_many()
        .filter(CartCol::UserId.eq(user.user_id))
        .exec(&txn)
        .await?;

    let recipients = notification_service::notify_admins(
        &txn,
        &format!("New order placed! Total: {}", format_cedis(total_price)),
    )
    .await?;

    txn.commit().await?;

    state
        .events
        .notify(Collection::Orders, ChangeAction::Created, vec![order.id]);
    if cleared.rows_affected > 0 {
        state
            .events
            .notify_user(Collection::CartItems, ChangeAction::Deleted, vec![], user.user_id);
    }
    notification_service::announce(state, &recipients);
    audit::record(
        &state.orm,
        Some(user.user_id),
        "order_create",
        "orders",
        serde_json::json!({ "order_id": order.id, "total_price": total_price }),
    )
    .await;
    tracing::info!(order_id = %order.id, total_price, lines = lines.len(), "order placed");

    let whatsapp_url = whatsapp_url(
        &state.config.whatsapp_number,
        &whatsapp_message(&state.config.shop_name, &user.name, total_price, &lines),
    );
    let order = order_from_entity(order, None, lines);

    Ok(ApiResponse::success(
        "Order placed",
        OrderCreated {
            order,
            whatsapp_url,
        },
        Some(Meta::empty()),
    ))
}

pub async fn list_by_user(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<OrderList>> {
    let orders = Orders::find()
        .filter(OrderCol::UserId.eq(user.user_id))
        .order_by_desc(OrderCol::CreatedAt)
        .all(&state.orm)
        .await?;

    let items = hydrate(&state.orm, &state.storage, orders, false).await?;
    let meta = Meta::total(items.len());
    Ok(ApiResponse::success("OK", OrderList { items }, Some(meta)))
}

pub async fn list_all(
    state: &AppState,
    admin: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    ensure_admin(admin)?;
    let mut finder = Orders::find();
    if let Some(status) = query.status {
        finder = finder.filter(OrderCol::Status.eq(status));
    }
    let orders = finder
        .order_by_desc(OrderCol::CreatedAt)
        .all(&state.orm)
        .await?;

    let items = hydrate(&state.orm, &state.storage, orders, true).await?;
    let meta = Meta::total(items.len());
    Ok(ApiResponse::success("OK", OrderList { items }, Some(meta)))
}

pub async fn update_status(
    state: &AppState,
    admin: &AuthUser,
    id: Uuid,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<Order>> {
    ensure_admin(admin)?;
    let txn = state.orm.begin().await?;
    let existing = Orders::find_by_id(id).one(&txn).await?.ok_or(AppError::NotFound)?;
    let owner = existing.user_id;

    let mut active: OrderActive = existing.into();
    active.status = Set(payload.status);
    let updated = active.update(&txn).await?;

    notification_service::notify_user(
        &txn,
        owner,
        format!(
            "Your order status has been updated to: {}",
            payload.status.as_str()
        ),
    )
    .await?;
    txn.commit().await?;

    state
        .events
        .notify(Collection::Orders, ChangeAction::Updated, vec![id]);
    notification_service::announce(state, &[owner]);
    audit::record(
        &state.orm,
        Some(admin.user_id),
        "order_status_update",
        "orders",
        serde_json::json!({ "order_id": id, "status": payload.status.as_str() }),
    )
    .await;

    let order = hydrate(&state.orm, &state.storage, vec![updated], true)
        .await?
        .pop()
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Order status updated", order, Some(Meta::empty())))
}

/// Bulk status overwrite. Owners are not notified.
pub async fn update_statuses(
    state: &AppState,
    admin: &AuthUser,
    payload: BulkOrderStatusRequest,
) -> AppResult<ApiResponse<Affected>> {
    ensure_admin(admin)?;
    if payload.ids.is_empty() {
        return Ok(ApiResponse::success(
            "Nothing to update",
            Affected { affected: 0 },
            Some(Meta::empty()),
        ));
    }

    let result = Orders::update_many()
        .col_expr(OrderCol::Status, Expr::value(payload.status))
        .filter(OrderCol::Id.is_in(payload.ids.clone()))
        .exec(&state.orm)
        .await?;

    state
        .events
        .notify(Collection::Orders, ChangeAction::Updated, payload.ids);
    audit::record(
        &state.orm,
        Some(admin.user_id),
        "order_bulk_status_update",
        "orders",
        serde_json::json!({ "status": payload.status.as_str(), "affected": result.rows_affected }),
    )
    .await;

    Ok(ApiResponse::success(
        "Statuses updated",
        Affected {
            affected: result.rows_affected,
        },
        Some(Meta::empty()),
    ))
}

pub async fn remove_order(
    state: &AppState,
    admin: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(admin)?;
    let txn = state.orm.begin().await?;
    if Orders::find_by_id(id).one(&txn).await?.is_none() {
        return Err(AppError::NotFound);
    }
    OrderItems::delete_many()
        .filter(OrderItemCol::OrderId.eq(id))
        .exec(&txn)
        .await?;
    Orders::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    state
        .events
        .notify(Collection::Orders, ChangeAction::Deleted, vec![id]);
    audit::record(
        &state.orm,
        Some(admin.user_id),
        "order_delete",
        "orders",
        serde_json::json!({ "order_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn remove_many(
    state: &AppState,
    admin: &AuthUser,
    payload: BulkDeleteRequest,
) -> AppResult<ApiResponse<Affected>> {
    ensure_admin(admin)?;
    let txn = state.orm.begin().await?;
    OrderItems::delete_many()
        .filter(OrderItemCol::OrderId.is_in(payload.ids.clone()))
        .exec(&txn)
        .await?;
    let result = Orders::delete_many()
        .filter(OrderCol::Id.is_in(payload.ids.clone()))
        .exec(&txn)
        .await?;
    txn.commit().await?;

    state
        .events
        .notify(Collection::Orders, ChangeAction::Deleted, payload.ids);
    audit::record(
        &state.orm,
        Some(admin.user_id),
        "order_bulk_delete",
        "orders",
        serde_json::json!({ "affected": result.rows_affected }),
    )
    .await;

    Ok(ApiResponse::success(
        "Orders deleted",
        Affected {
            affected: result.rows_affected,
        },
        Some(Meta::empty()),
    ))
}

/// Resolves order lines to souvenir names and images, and optionally the
/// customer name. Missing souvenirs and users fall back to placeholders.
async fn hydrate<C: ConnectionTrait>(
    db: &C,
    storage: &FileStorage,
    orders: Vec<OrderModel>,
    with_user_name: bool,
) -> AppResult<Vec<Order>> {
    if orders.is_empty() {
        return Ok(Vec::new());
    }
    let order_ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();

    let mut lines_by_order: HashMap<Uuid, Vec<OrderItemModel>> = HashMap::new();
    for item in OrderItems::find()
        .filter(OrderItemCol::OrderId.is_in(order_ids))
        .all(db)
        .await?
    {
        lines_by_order.entry(item.order_id).or_default().push(item);
    }

    let souvenir_ids: Vec<Uuid> = lines_by_order
        .values()
        .flatten()
        .map(|i| i.souvenir_id)
        .collect();
    let souvenirs: HashMap<Uuid, (String, Uuid)> = if souvenir_ids.is_empty() {
        HashMap::new()
    } else {
        Souvenirs::find()
            .filter(SouvenirCol::Id.is_in(souvenir_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|s| (s.id, (s.name, s.image)))
            .collect()
    };

    let user_names: HashMap<Uuid, String> = if with_user_name {
        let user_ids: Vec<Uuid> = orders.iter().map(|o| o.user_id).collect();
        Users::find()
            .filter(UserCol::Id.is_in(user_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|u| (u.id, u.name))
            .collect()
    } else {
        HashMap::new()
    };

    Ok(orders
        .into_iter()
        .map(|order| {
            let lines = lines_by_order
                .remove(&order.id)
                .unwrap_or_default()
                .into_iter()
                .map(|item| {
                    let (souvenir_name, souvenir_image) = match souvenirs.get(&item.souvenir_id) {
                        Some((name, image)) => (name.clone(), Some(storage.url_for(*image))),
                        None => (DELETED_ITEM.to_string(), None),
                    };
                    OrderLine {
                        souvenir_id: item.souvenir_id,
                        quantity: item.quantity,
                        price_at_time: item.price_at_time,
                        souvenir_name,
                        souvenir_image,
                    }
                })
                .collect();
            let user_name = with_user_name.then(|| {
                user_names
                    .get(&order.user_id)
                    .cloned()
                    .unwrap_or_else(|| UNKNOWN_USER.to_string())
            });
            order_from_entity(order, user_name, lines)
        })
        .collect())
}

fn order_from_entity(model: OrderModel, user_name: Option<String>, items: Vec<OrderLine>) -> Order {
    Order {
        id: model.id,
        user_id: model.user_id,
        user_name,
        items,
        total_price: model.total_price,
        status: model.status,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

/// The order summary the customer forwards to the shop on WhatsApp.
pub fn whatsapp_message(shop_name: &str, customer: &str, total_price: i64, lines: &[OrderLine]) -> String {
    let items = lines
        .iter()
        .map(|l| format!("• {} (x{})", l.souvenir_name, l.quantity))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "🌸 *New Order from {shop_name}*\n\n*Customer:* {customer}\n*Total:* {}\n\n*Items:*\n{items}\n\n_Payment via MoMo has been initiated._",
        format_cedis(total_price)
    )
}

pub fn whatsapp_url(number: &str, message: &str) -> String {
    format!(
        "https://wa.me/{number}?text={}",
        utf8_percent_encode(message, URI_COMPONENT)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(name: &str, quantity: i32) -> OrderLine {
        OrderLine {
            souvenir_id: Uuid::new_v4(),
            quantity,
            price_at_time: 1000,
            souvenir_name: name.to_string(),
            souvenir_image: None,
        }
    }

    #[test]
    fn message_lists_customer_total_and_lines() {
        let msg = whatsapp_message(
            "Blossom Souvenir",
            "Ama",
            4500,
            &[line("Kente Scarf", 2), line("Beaded Bracelet", 1)],
        );
        assert!(msg.contains("*Customer:* Ama"));
        assert!(msg.contains("*Total:* GH₵45.00"));
        assert!(msg.contains("• Kente Scarf (x2)\n• Beaded Bracelet (x1)"));
    }

    #[test]
    fn url_is_percent_encoded_like_a_uri_component() {
        let url = whatsapp_url("233553301044", "Hi there (x2)\n*Total*");
        assert_eq!(
            url,
            "https://wa.me/233553301044?text=Hi%20there%20(x2)%0A*Total*"
        );
    }
}
