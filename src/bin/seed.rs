use blossom_souvenir_api::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    entity::{
        categories::{ActiveModel as CategoryActive, Column as CategoryCol, Entity as Categories},
        enums::{Role, SouvenirStatus, UserStatus},
        souvenirs::{ActiveModel as SouvenirActive, Column as SouvenirCol, Entity as Souvenirs},
        stored_files::ActiveModel as FileActive,
        users::{ActiveModel as UserActive, Column as UserCol, Entity as Users},
    },
    services::{auth_service::hash_password, category_service::name_key},
    storage::FileStorage,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

const CATEGORIES: [&str; 4] = ["Jewelry", "Textiles", "Art", "Home Decor"];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let orm = create_orm_conn(&config.database_url).await?;
    // Ensure migrations are applied.
    run_migrations(&orm).await?;
    let storage = FileStorage::new(config.storage_dir.clone(), config.public_base_url.clone());

    let admin_id = ensure_user(&orm, "Boutique Admin", "admin@example.com", "admin123", Role::Admin).await?;
    let user_id = ensure_user(&orm, "Ama Mensah", "user@example.com", "user123", Role::Customer).await?;
    seed_categories(&orm).await?;
    seed_souvenirs(&orm, &storage).await?;

    println!("Seed completed. Admin ID: {admin_id}, User ID: {user_id}");
    Ok(())
}

async fn ensure_user(
    orm: &DatabaseConnection,
    name: &str,
    email: &str,
    password: &str,
    role: Role,
) -> anyhow::Result<Uuid> {
    if let Some(existing) = Users::find()
        .filter(UserCol::Email.eq(email))
        .one(orm)
        .await?
    {
        println!("User {email} already present");
        return Ok(existing.id);
    }

    let user = UserActive {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        email: Set(email.to_string()),
        password_hash: Set(hash_password(password)?),
        role: Set(role),
        status: Set(UserStatus::Approved),
        profile_image: Set(None),
        created_at: Set(Utc::now().into()),
    }
    .insert(orm)
    .await?;

    println!("Ensured user {email} (role={})", role.as_str());
    Ok(user.id)
}

async fn seed_categories(orm: &DatabaseConnection) -> anyhow::Result<()> {
    for name in CATEGORIES {
        let exists = Categories::find()
            .filter(CategoryCol::NameKey.eq(name_key(name)))
            .one(orm)
            .await?
            .is_some();
        if !exists {
            CategoryActive {
                id: Set(Uuid::new_v4()),
                name: Set(name.to_string()),
                name_key: Set(name_key(name)),
            }
            .insert(orm)
            .await?;
        }
    }
    println!("Seeded categories");
    Ok(())
}

async fn seed_souvenirs(orm: &DatabaseConnection, storage: &FileStorage) -> anyhow::Result<()> {
    let souvenirs = vec![
        ("Kente Bookmark", "Hand-woven kente strip", 2500, "Textiles", 40),
        ("Krobo Bead Bracelet", "Recycled glass beads from Odumase", 4500, "Jewelry", 25),
        ("Adinkra Wall Print", "Gye Nyame print on handmade paper", 12000, "Art", 10),
        ("Bolga Basket", "Straw basket woven in Bolgatanga", 18000, "Home Decor", 6),
    ];

    for (name, description, price, category, stock) in souvenirs {
        let exists = Souvenirs::find()
            .filter(SouvenirCol::Name.eq(name))
            .one(orm)
            .await?
            .is_some();
        if exists {
            continue;
        }

        let image = placeholder_image(orm, storage, name).await?;
        let now = Utc::now();
        SouvenirActive {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            description: Set(description.to_string()),
            price: Set(price),
            image: Set(image),
            category: Set(category.to_string()),
            status: Set(SouvenirStatus::Available),
            stock: Set(stock),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(orm)
        .await?;
    }

    println!("Seeded souvenirs");
    Ok(())
}

/// Stores a small SVG with the souvenir name so the catalog has images.
async fn placeholder_image(
    orm: &DatabaseConnection,
    storage: &FileStorage,
    label: &str,
) -> anyhow::Result<Uuid> {
    let svg = format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="400" height="400"><rect width="100%" height="100%" fill="#ffe4e6"/><text x="50%" y="50%" text-anchor="middle" font-family="sans-serif" font-size="24" fill="#be123c">{label}</text></svg>"##
    );
    let id = Uuid::new_v4();
    storage.write(id, svg.as_bytes()).await?;
    FileActive {
        id: Set(id),
        content_type: Set("image/svg+xml".to_string()),
        size_bytes: Set(svg.len() as i64),
        created_at: Set(Utc::now().into()),
    }
    .insert(orm)
    .await?;
    Ok(id)
}
