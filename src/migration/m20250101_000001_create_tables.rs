use sea_orm::{EntityTrait, Schema};
use sea_orm_migration::prelude::*;

use crate::entity::{
    AuditLogs, CartItems, Categories, Messages, Notifications, OrderItems, Orders, Reviews,
    Sessions, Souvenirs, StoredFiles, Users, WishlistItems, cart_items, wishlist_items,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

async fn create_for<E>(manager: &SchemaManager<'_>, schema: &Schema, entity: E) -> Result<(), DbErr>
where
    E: EntityTrait + Copy,
{
    manager
        .create_table(schema.create_table_from_entity(entity).if_not_exists().to_owned())
        .await?;
    for mut index in schema.create_index_from_entity(entity) {
        manager.create_index(index.if_not_exists().to_owned()).await?;
    }
    Ok(())
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let schema = Schema::new(manager.get_database_backend());

        // Parents before children: order_items carries a foreign key to orders.
        create_for(manager, &schema, Users).await?;
        create_for(manager, &schema, Sessions).await?;
        create_for(manager, &schema, StoredFiles).await?;
        create_for(manager, &schema, Categories).await?;
        create_for(manager, &schema, Souvenirs).await?;
        create_for(manager, &schema, Reviews).await?;
        create_for(manager, &schema, CartItems).await?;
        create_for(manager, &schema, WishlistItems).await?;
        create_for(manager, &schema, Orders).await?;
        create_for(manager, &schema, OrderItems).await?;
        create_for(manager, &schema, Notifications).await?;
        create_for(manager, &schema, Messages).await?;
        create_for(manager, &schema, AuditLogs).await?;

        // One row per (user, souvenir) in the cart and in the wishlist.
        manager
            .create_index(
                Index::create()
                    .name("idx_cart_items_user_souvenir")
                    .table(CartItems)
                    .col(cart_items::Column::UserId)
                    .col(cart_items::Column::SouvenirId)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_wishlist_items_user_souvenir")
                    .table(WishlistItems)
                    .col(wishlist_items::Column::UserId)
                    .col(wishlist_items::Column::SouvenirId)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let tables = [
            "audit_logs",
            "messages",
            "notifications",
            "order_items",
            "orders",
            "wishlist_items",
            "cart_items",
            "reviews",
            "souvenirs",
            "categories",
            "stored_files",
            "sessions",
            "users",
        ];
        for table in tables {
            manager
                .drop_table(Table::drop().table(Alias::new(table)).if_exists().to_owned())
                .await?;
        }
        Ok(())
    }
}
