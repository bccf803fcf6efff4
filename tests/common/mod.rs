#![allow(dead_code)]

use blossom_souvenir_api::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    dto::{auth::RegisterRequest, souvenirs::CreateSouvenirRequest},
    entity::users::Entity as Users,
    middleware::auth::AuthUser,
    models::{Souvenir, SouvenirStatus, User},
    services::{auth_service, souvenir_service, storage_service},
    state::AppState,
};
use sea_orm::EntityTrait;
use tempfile::TempDir;
use uuid::Uuid;

/// Fresh in-memory database and a throwaway storage directory. Keep the
/// `TempDir` alive for the duration of the test.
pub async fn setup_state() -> anyhow::Result<(AppState, TempDir)> {
    let dir = tempfile::tempdir()?;
    let config = AppConfig::for_database("sqlite::memory:", dir.path());
    let orm = create_orm_conn(&config.database_url).await?;
    run_migrations(&orm).await?;
    Ok((AppState::new(orm, config), dir))
}

pub async fn register(state: &AppState, name: &str, email: &str) -> anyhow::Result<User> {
    let resp = auth_service::register_user(
        state,
        RegisterRequest {
            name: name.into(),
            email: email.into(),
            password: "secret-pass".into(),
        },
    )
    .await?;
    Ok(resp.into_data().expect("register data").user)
}

/// Builds the extractor value for a stored user, as the session lookup would.
pub async fn auth_user(state: &AppState, user_id: Uuid) -> anyhow::Result<AuthUser> {
    let user = Users::find_by_id(user_id)
        .one(&state.orm)
        .await?
        .expect("user exists");
    Ok(AuthUser {
        user_id: user.id,
        session_id: Uuid::new_v4(),
        name: user.name,
        role: user.role,
    })
}

/// First registration, which is promoted to an approved admin.
pub async fn admin(state: &AppState) -> anyhow::Result<AuthUser> {
    let user = register(state, "Boutique Admin", "admin@example.com").await?;
    auth_user(state, user.id).await
}

pub async fn upload_image(state: &AppState, uploader: &AuthUser) -> anyhow::Result<Uuid> {
    let resp = storage_service::upload(state, uploader, Some("image/png"), b"\x89PNG fake").await?;
    Ok(resp.into_data().expect("stored file").storage_id)
}

pub async fn souvenir(
    state: &AppState,
    admin: &AuthUser,
    name: &str,
    category: &str,
    price: i64,
) -> anyhow::Result<Souvenir> {
    let image = upload_image(state, admin).await?;
    let resp = souvenir_service::create_souvenir(
        state,
        admin,
        CreateSouvenirRequest {
            name: name.into(),
            description: format!("{name} made by hand"),
            price,
            image,
            category: category.into(),
            status: SouvenirStatus::Available,
            stock: 10,
        },
    )
    .await?;
    Ok(resp.into_data().expect("souvenir data"))
}
