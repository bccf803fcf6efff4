mod common;

use blossom_souvenir_api::{
    dto::{
        cart::AddToCartRequest,
        orders::{BulkOrderStatusRequest, CreateOrderRequest, OrderLineRequest, UpdateOrderStatusRequest},
        souvenirs::{BulkDeleteRequest, UpdateSouvenirRequest},
    },
    error::AppError,
    models::OrderStatus,
    routes::params::OrderListQuery,
    services::{
        analytics_service, cart_service, notification_service, order_service, souvenir_service,
    },
};

use common::{admin, auth_user, register, setup_state, souvenir};

// Integration flow: customer fills the cart -> places the order -> admin moves it along.
#[tokio::test]
async fn order_snapshots_prices_clears_cart_and_notifies_admins() -> anyhow::Result<()> {
    let (state, _dir) = setup_state().await?;
    let admin = admin(&state).await?;
    let second_admin_user = register(&state, "Second Admin", "second@example.com").await?;
    blossom_souvenir_api::services::user_service::update_role(
        &state,
        &admin,
        second_admin_user.id,
        blossom_souvenir_api::dto::users::UpdateUserRoleRequest {
            role: blossom_souvenir_api::models::Role::Admin,
        },
    )
    .await?;
    let second_admin = auth_user(&state, second_admin_user.id).await?;

    let bookmark = souvenir(&state, &admin, "Kente Bookmark", "Textiles", 2500).await?;
    let basket = souvenir(&state, &admin, "Bolga Basket", "Home Decor", 18000).await?;

    let customer = register(&state, "Ama Mensah", "ama@example.com").await?;
    let ama = auth_user(&state, customer.id).await?;
    for (souvenir_id, quantity) in [(bookmark.id, 2), (basket.id, 1)] {
        cart_service::add_to_cart(
            &state,
            &ama,
            AddToCartRequest {
                souvenir_id,
                quantity,
            },
        )
        .await?;
    }

    // Admin inboxes before the order, so only the order notice is counted below.
    let before = |n: &blossom_souvenir_api::dto::notifications::NotificationList| n.items.len();
    let admin_before = before(
        &notification_service::list_notifications(&state, &admin)
            .await?
            .into_data()
            .expect("notifications"),
    );
    let second_before = before(
        &notification_service::list_notifications(&state, &second_admin)
            .await?
            .into_data()
            .expect("notifications"),
    );

    let created = order_service::create_order(
        &state,
        &ama,
        CreateOrderRequest {
            items: vec![
                OrderLineRequest {
                    souvenir_id: bookmark.id,
                    quantity: 2,
                },
                OrderLineRequest {
                    souvenir_id: basket.id,
                    quantity: 1,
                },
            ],
        },
    )
    .await?
    .into_data()
    .expect("order");

    let order = created.order;
    assert_eq!(order.items.len(), 2);
    assert_eq!(order.total_price, 2 * 2500 + 18000);
    assert_eq!(order.status, OrderStatus::PendingWhatsapp);
    assert!(
        created
            .whatsapp_url
            .starts_with("https://wa.me/233553301044?text=")
    );
    assert!(created.whatsapp_url.contains("GH%E2%82%B5230.00"));

    let cart = cart_service::list_cart(&state, &ama)
        .await?
        .into_data()
        .expect("cart");
    assert!(cart.items.is_empty());

    for (who, count_before) in [(&admin, admin_before), (&second_admin, second_before)] {
        let inbox = notification_service::list_notifications(&state, who)
            .await?
            .into_data()
            .expect("notifications");
        assert_eq!(inbox.items.len(), count_before + 1);
        let placed = inbox
            .items
            .iter()
            .filter(|n| n.message == "New order placed! Total: GH₵230.00")
            .count();
        assert_eq!(placed, 1);
    }

    // A later price change does not touch the stored line price.
    souvenir_service::update_souvenir(
        &state,
        &admin,
        bookmark.id,
        UpdateSouvenirRequest {
            price: Some(9900),
            ..Default::default()
        },
    )
    .await?;
    let mine = order_service::list_by_user(&state, &ama)
        .await?
        .into_data()
        .expect("orders");
    let line = mine.items[0]
        .items
        .iter()
        .find(|l| l.souvenir_id == bookmark.id)
        .expect("bookmark line");
    assert_eq!(line.price_at_time, 2500);
    assert_eq!(line.souvenir_name, "Kente Bookmark");

    // Deleted souvenirs fall back to a placeholder name.
    souvenir_service::remove_many(
        &state,
        &admin,
        BulkDeleteRequest {
            ids: vec![basket.id],
        },
    )
    .await?;
    let all = order_service::list_all(&state, &admin, OrderListQuery::default())
        .await?
        .into_data()
        .expect("orders");
    let listed = &all.items[0];
    assert_eq!(listed.user_name.as_deref(), Some("Ama Mensah"));
    let ghost = listed
        .items
        .iter()
        .find(|l| l.souvenir_id == basket.id)
        .expect("basket line");
    assert_eq!(ghost.souvenir_name, "Deleted Item");
    assert!(ghost.souvenir_image.is_none());

    // Status change reaches the customer.
    order_service::update_status(
        &state,
        &admin,
        order.id,
        UpdateOrderStatusRequest {
            status: OrderStatus::Completed,
        },
    )
    .await?;
    let inbox = notification_service::list_notifications(&state, &ama)
        .await?
        .into_data()
        .expect("notifications");
    assert!(
        inbox
            .items
            .iter()
            .any(|n| n.message == "Your order status has been updated to: COMPLETED")
    );

    let stats = analytics_service::dashboard(&state, &admin)
        .await?
        .into_data()
        .expect("stats");
    assert_eq!(stats.total_revenue, 23000);
    assert_eq!(stats.status_breakdown.completed, 1);
    Ok(())
}

#[tokio::test]
async fn invalid_orders_are_rejected() -> anyhow::Result<()> {
    let (state, _dir) = setup_state().await?;
    let admin = admin(&state).await?;
    let item = souvenir(&state, &admin, "Kente Bookmark", "Textiles", 2500).await?;

    let empty = order_service::create_order(&state, &admin, CreateOrderRequest { items: vec![] }).await;
    assert!(matches!(empty, Err(AppError::BadRequest(_))));

    let zero = order_service::create_order(
        &state,
        &admin,
        CreateOrderRequest {
            items: vec![OrderLineRequest {
                souvenir_id: item.id,
                quantity: 0,
            }],
        },
    )
    .await;
    assert!(matches!(zero, Err(AppError::BadRequest(_))));

    let huge = order_service::create_order(
        &state,
        &admin,
        CreateOrderRequest {
            items: vec![OrderLineRequest {
                souvenir_id: item.id,
                quantity: 2_000_000_000,
            }],
        },
    )
    .await;
    assert!(matches!(huge, Err(AppError::BadRequest(_))));

    let unknown = order_service::create_order(
        &state,
        &admin,
        CreateOrderRequest {
            items: vec![OrderLineRequest {
                souvenir_id: uuid::Uuid::new_v4(),
                quantity: 1,
            }],
        },
    )
    .await;
    assert!(matches!(unknown, Err(AppError::BadRequest(_))));

    let orders = order_service::list_by_user(&state, &admin)
        .await?
        .into_data()
        .expect("orders");
    assert!(orders.items.is_empty());
    Ok(())
}

#[tokio::test]
async fn bulk_status_and_bulk_delete() -> anyhow::Result<()> {
    let (state, _dir) = setup_state().await?;
    let admin = admin(&state).await?;
    let item = souvenir(&state, &admin, "Kente Bookmark", "Textiles", 2500).await?;

    let mut ids = Vec::new();
    for _ in 0..3 {
        let created = order_service::create_order(
            &state,
            &admin,
            CreateOrderRequest {
                items: vec![OrderLineRequest {
                    souvenir_id: item.id,
                    quantity: 1,
                }],
            },
        )
        .await?
        .into_data()
        .expect("order");
        ids.push(created.order.id);
    }

    let updated = order_service::update_statuses(
        &state,
        &admin,
        BulkOrderStatusRequest {
            ids: ids[..2].to_vec(),
            status: OrderStatus::Cancelled,
        },
    )
    .await?
    .into_data()
    .expect("affected");
    assert_eq!(updated.affected, 2);

    let cancelled = order_service::list_all(
        &state,
        &admin,
        OrderListQuery {
            status: Some(OrderStatus::Cancelled),
        },
    )
    .await?
    .into_data()
    .expect("orders");
    assert_eq!(cancelled.items.len(), 2);

    let deleted = order_service::remove_many(&state, &admin, BulkDeleteRequest { ids })
        .await?
        .into_data()
        .expect("affected");
    assert_eq!(deleted.affected, 3);
    Ok(())
}
