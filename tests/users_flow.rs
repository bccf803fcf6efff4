mod common;

use blossom_souvenir_api::{
    dto::{
        auth::LoginRequest,
        cart::AddToCartRequest,
        notifications::CreateNotificationRequest,
        users::{UpdateProfileRequest, UpdateUserStatusRequest},
        wishlist::ToggleWishlistRequest,
    },
    entity::{
        cart_items::{Column as CartCol, Entity as CartItems},
        notifications::{Column as NotificationCol, Entity as Notifications},
        sessions::{ActiveModel as SessionActive, Column as SessionCol, Entity as Sessions},
        wishlist_items::{Column as WishlistCol, Entity as WishlistItems},
    },
    error::AppError,
    models::{Role, UserStatus},
    services::{
        auth_service, cart_service, notification_service, storage_service, user_service,
        wishlist_service,
    },
};
use chrono::{Duration, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};

use common::{admin, auth_user, register, setup_state, souvenir, upload_image};

#[tokio::test]
async fn first_user_is_admin_and_later_users_wait_for_approval() -> anyhow::Result<()> {
    let (state, _dir) = setup_state().await?;

    let first = auth_service::register_user(
        &state,
        blossom_souvenir_api::dto::auth::RegisterRequest {
            name: "Boutique Admin".into(),
            email: "admin@example.com".into(),
            password: "secret-pass".into(),
        },
    )
    .await?
    .into_data()
    .expect("data");
    assert_eq!(first.user.role, Role::Admin);
    assert_eq!(first.user.status, UserStatus::Approved);
    assert!(first.token.is_some());

    let second = register(&state, "Ama Mensah", "ama@example.com").await?;
    assert_eq!(second.role, Role::Customer);
    assert_eq!(second.status, UserStatus::Pending);

    // The admin heard about the new registration.
    let admin = auth_user(&state, first.user.id).await?;
    let inbox = notification_service::list_notifications(&state, &admin)
        .await?
        .into_data()
        .expect("notifications");
    assert_eq!(inbox.unread, 1);
    assert_eq!(
        inbox.items[0].message,
        "New user registration: Ama Mensah (ama@example.com)"
    );

    let duplicate = register(&state, "Someone", "ama@example.com").await;
    assert!(duplicate.is_err());
    Ok(())
}

#[tokio::test]
async fn login_checks_credentials_and_sessions_resolve() -> anyhow::Result<()> {
    let (state, _dir) = setup_state().await?;
    register(&state, "Boutique Admin", "admin@example.com").await?;

    let wrong = auth_service::login_user(
        &state,
        LoginRequest {
            email: "admin@example.com".into(),
            password: "nope-nope".into(),
        },
    )
    .await?;
    assert!(wrong.is_none());

    let unknown = auth_service::login_user(
        &state,
        LoginRequest {
            email: "ghost@example.com".into(),
            password: "secret-pass".into(),
        },
    )
    .await?;
    assert!(unknown.is_none());

    let login = auth_service::login_user(
        &state,
        LoginRequest {
            email: "admin@example.com".into(),
            password: "secret-pass".into(),
        },
    )
    .await?
    .expect("valid credentials");

    let (_, user) = auth_service::resolve_session(&state, &login.token).await?;
    assert_eq!(user.email, "admin@example.com");

    auth_service::logout(&state, &login.token).await?;
    let revoked = auth_service::resolve_session(&state, &login.token).await;
    assert!(matches!(revoked, Err(AppError::Unauthorized(_))));
    Ok(())
}

#[tokio::test]
async fn sensitive_profile_changes_need_the_current_password() -> anyhow::Result<()> {
    let (state, _dir) = setup_state().await?;
    let admin = register(&state, "Boutique Admin", "admin@example.com").await?;
    let me = auth_user(&state, admin.id).await?;

    let missing = user_service::update_profile(
        &state,
        &me,
        UpdateProfileRequest {
            email: Some("new@example.com".into()),
            ..Default::default()
        },
    )
    .await;
    match missing {
        Err(AppError::AuthorizationFailed(msg)) => assert_eq!(
            msg,
            "Current password is required to update sensitive information."
        ),
        other => panic!("expected AuthorizationFailed, got {:?}", other.map(|_| ())),
    }

    let wrong = user_service::update_profile(
        &state,
        &me,
        UpdateProfileRequest {
            password: Some("another-pass".into()),
            current_password: Some("not-it".into()),
            ..Default::default()
        },
    )
    .await;
    match wrong {
        Err(AppError::AuthorizationFailed(msg)) => assert_eq!(msg, "Incorrect current password."),
        other => panic!("expected AuthorizationFailed, got {:?}", other.map(|_| ())),
    }

    // A plain name change needs no password.
    let renamed = user_service::update_profile(
        &state,
        &me,
        UpdateProfileRequest {
            name: Some("Head of Boutique".into()),
            ..Default::default()
        },
    )
    .await?
    .into_data()
    .expect("user");
    assert_eq!(renamed.name, "Head of Boutique");

    let moved = user_service::update_profile(
        &state,
        &me,
        UpdateProfileRequest {
            email: Some("boss@example.com".into()),
            current_password: Some("secret-pass".into()),
            ..Default::default()
        },
    )
    .await?
    .into_data()
    .expect("user");
    assert_eq!(moved.email, "boss@example.com");
    Ok(())
}

#[tokio::test]
async fn approving_a_user_notifies_them() -> anyhow::Result<()> {
    let (state, _dir) = setup_state().await?;
    let admin_user = register(&state, "Boutique Admin", "admin@example.com").await?;
    let admin = auth_user(&state, admin_user.id).await?;
    let customer = register(&state, "Kofi", "kofi@example.com").await?;

    let updated = user_service::update_status(
        &state,
        &admin,
        customer.id,
        UpdateUserStatusRequest {
            status: UserStatus::Approved,
        },
    )
    .await?
    .into_data()
    .expect("user");
    assert_eq!(updated.status, UserStatus::Approved);

    let kofi = auth_user(&state, customer.id).await?;
    let inbox = notification_service::list_notifications(&state, &kofi)
        .await?
        .into_data()
        .expect("notifications");
    assert_eq!(inbox.items.len(), 1);
    assert_eq!(
        inbox.items[0].message,
        "Your account status has been updated to: APPROVED"
    );

    // Customers cannot use admin operations.
    let denied = user_service::list_users(&state, &kofi).await;
    assert!(matches!(denied, Err(AppError::Forbidden)));
    Ok(())
}

#[tokio::test]
async fn removing_a_user_cascades_their_private_rows() -> anyhow::Result<()> {
    let (state, _dir) = setup_state().await?;
    let admin = admin(&state).await?;
    let item = souvenir(&state, &admin, "Adinkra Mug", "Ceramics", 4000).await?;
    let customer = register(&state, "Esi", "esi@example.com").await?;
    let esi = auth_user(&state, customer.id).await?;

    let image = upload_image(&state, &esi).await?;
    user_service::update_profile(
        &state,
        &esi,
        UpdateProfileRequest {
            profile_image: Some(image),
            ..Default::default()
        },
    )
    .await?;
    cart_service::add_to_cart(
        &state,
        &esi,
        AddToCartRequest {
            souvenir_id: item.id,
            quantity: 1,
        },
    )
    .await?;
    wishlist_service::toggle_wishlist(&state, &esi, ToggleWishlistRequest { souvenir_id: item.id })
        .await?;
    notification_service::create_notification(
        &state,
        &admin,
        CreateNotificationRequest {
            user_id: customer.id,
            message: "Welcome".into(),
        },
    )
    .await?;
    auth_service::issue_session(&state.orm, customer.id, 7).await?;

    user_service::remove_user(&state, &admin, customer.id).await?;

    let carts = CartItems::find()
        .filter(CartCol::UserId.eq(customer.id))
        .count(&state.orm)
        .await?;
    let wishes = WishlistItems::find()
        .filter(WishlistCol::UserId.eq(customer.id))
        .count(&state.orm)
        .await?;
    let notes = Notifications::find()
        .filter(NotificationCol::UserId.eq(customer.id))
        .count(&state.orm)
        .await?;
    let sessions = Sessions::find()
        .filter(SessionCol::UserId.eq(customer.id))
        .count(&state.orm)
        .await?;
    assert_eq!((carts, wishes, notes, sessions), (0, 0, 0, 0));

    let photo = storage_service::download(&state, image).await;
    assert!(matches!(photo, Err(AppError::NotFound)));

    // The souvenir itself is untouched.
    assert!(storage_service::download(&state, item.storage_id).await.is_ok());
    Ok(())
}

#[tokio::test]
async fn expired_sessions_are_rejected_and_deleted() -> anyhow::Result<()> {
    let (state, _dir) = setup_state().await?;
    let user = register(&state, "Boutique Admin", "admin@example.com").await?;
    let session = auth_service::issue_session(&state.orm, user.id, 7).await?;

    let mut stale: SessionActive = session.clone().into();
    stale.expires_at = Set((Utc::now() - Duration::minutes(1)).into());
    stale.update(&state.orm).await?;

    match auth_service::resolve_session(&state, &session.token).await {
        Err(AppError::Unauthorized(msg)) => assert_eq!(msg, "Session expired"),
        other => panic!("expected Unauthorized, got {:?}", other.map(|_| ())),
    }
    assert!(Sessions::find_by_id(session.id).one(&state.orm).await?.is_none());

    // A second attempt no longer finds the token at all.
    match auth_service::resolve_session(&state, &session.token).await {
        Err(AppError::Unauthorized(msg)) => assert_eq!(msg, "Invalid session token"),
        other => panic!("expected Unauthorized, got {:?}", other.map(|_| ())),
    }
    Ok(())
}

#[tokio::test]
async fn replacing_the_profile_image_deletes_the_old_file() -> anyhow::Result<()> {
    let (state, _dir) = setup_state().await?;
    let me = admin(&state).await?;
    let first = upload_image(&state, &me).await?;
    let second = upload_image(&state, &me).await?;

    for image in [first, first, second] {
        let updated = user_service::update_profile(
            &state,
            &me,
            UpdateProfileRequest {
                profile_image: Some(image),
                ..Default::default()
            },
        )
        .await?
        .into_data()
        .expect("user");
        assert_eq!(updated.profile_image, Some(image));
    }

    let old = storage_service::download(&state, first).await;
    assert!(matches!(old, Err(AppError::NotFound)));
    let (content_type, _) = storage_service::download(&state, second).await?;
    assert_eq!(content_type, "image/png");
    Ok(())
}

#[tokio::test]
async fn notifications_are_managed_only_by_their_owner() -> anyhow::Result<()> {
    let (state, _dir) = setup_state().await?;
    let admin = admin(&state).await?;
    let customer = register(&state, "Yaw", "yaw@example.com").await?;
    let yaw = auth_user(&state, customer.id).await?;

    for message in ["Order shipped", "Order delivered"] {
        notification_service::create_notification(
            &state,
            &admin,
            CreateNotificationRequest {
                user_id: customer.id,
                message: message.into(),
            },
        )
        .await?;
    }

    let marked = notification_service::mark_all_read(&state, &yaw)
        .await?
        .into_data()
        .expect("affected");
    assert_eq!(marked.affected, 2);
    let again = notification_service::mark_all_read(&state, &yaw)
        .await?
        .into_data()
        .expect("affected");
    assert_eq!(again.affected, 0);

    let inbox = notification_service::list_notifications(&state, &yaw)
        .await?
        .into_data()
        .expect("notifications");
    assert_eq!(inbox.unread, 0);
    assert!(inbox.items.iter().all(|n| n.read));

    // The admin cannot delete someone else's notification.
    let target = inbox.items[0].id;
    let foreign = notification_service::remove_notification(&state, &admin, target).await;
    assert!(matches!(foreign, Err(AppError::NotFound)));

    notification_service::remove_notification(&state, &yaw, target).await?;
    let gone = notification_service::remove_notification(&state, &yaw, target).await;
    assert!(matches!(gone, Err(AppError::NotFound)));

    // Clearing leaves other inboxes alone.
    let admin_before = notification_service::list_notifications(&state, &admin)
        .await?
        .into_data()
        .expect("notifications")
        .items
        .len();
    let cleared = notification_service::clear_all(&state, &yaw)
        .await?
        .into_data()
        .expect("affected");
    assert_eq!(cleared.affected, 1);
    let admin_after = notification_service::list_notifications(&state, &admin)
        .await?
        .into_data()
        .expect("notifications")
        .items
        .len();
    assert_eq!(admin_before, admin_after);
    Ok(())
}

#[tokio::test]
async fn duplicate_email_from_the_unique_index_maps_to_conflict() -> anyhow::Result<()> {
    let (state, _dir) = setup_state().await?;
    register(&state, "Boutique Admin", "admin@example.com").await?;
    register(&state, "Abena", "abena@example.com").await?;

    // Raw insert bypasses the pre-check so only the unique index can catch it.
    let hash = auth_service::hash_password("secret-pass")?;
    let result = blossom_souvenir_api::entity::users::ActiveModel {
        id: Set(uuid::Uuid::new_v4()),
        name: Set("Copy".into()),
        email: Set("abena@example.com".into()),
        password_hash: Set(hash),
        role: Set(Role::Customer),
        status: Set(UserStatus::Pending),
        profile_image: Set(None),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await
    .map_err(auth_service::email_conflict);
    match result {
        Err(AppError::Conflict(msg)) => assert_eq!(msg, "Email is already registered"),
        other => panic!("expected Conflict, got {:?}", other.map(|_| ())),
    }

    let other = auth_service::email_conflict(sea_orm::DbErr::Custom("boom".into()));
    assert!(matches!(other, AppError::OrmError(_)));
    Ok(())
}
