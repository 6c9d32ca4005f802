//! Create `store_product` table.
//!
//! Binds a product to a store with store-specific price, stock and flags.
//! `product_id`/`store_id` are plain references: removing a product or a
//! store leaves its store products in place, and reads join them away.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(StoreProduct::Table)
                    .if_not_exists()
                    .col(uuid(StoreProduct::Id).primary_key())
                    .col(uuid(StoreProduct::ProductId).not_null())
                    .col(uuid(StoreProduct::StoreId).not_null())
                    .col(double(StoreProduct::Price).not_null())
                    .col(integer(StoreProduct::Stock).not_null())
                    .col(boolean(StoreProduct::IsAvailable).not_null())
                    .col(boolean(StoreProduct::Recommended).not_null())
                    .col(boolean(StoreProduct::Discount).not_null())
                    .col(json(StoreProduct::StoreSpecificImages).not_null())
                    .col(timestamp_with_time_zone(StoreProduct::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(StoreProduct::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await?;

        // A product is listed at most once per store
        manager
            .create_index(
                Index::create()
                    .name("uniq_store_product_product_store")
                    .table(StoreProduct::Table)
                    .col(StoreProduct::ProductId)
                    .col(StoreProduct::StoreId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(StoreProduct::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum StoreProduct {
    Table,
    Id,
    ProductId,
    StoreId,
    Price,
    Stock,
    IsAvailable,
    Recommended,
    Discount,
    StoreSpecificImages,
    CreatedAt,
    UpdatedAt,
}
