use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // StoreProduct: per-store listing
        manager
            .create_index(
                Index::create()
                    .name("idx_store_product_store")
                    .table(StoreProduct::Table)
                    .col(StoreProduct::StoreId)
                    .to_owned(),
            )
            .await?;

        // StoreProduct: availability scan for summaries
        manager
            .create_index(
                Index::create()
                    .name("idx_store_product_available")
                    .table(StoreProduct::Table)
                    .col(StoreProduct::IsAvailable)
                    .to_owned(),
            )
            .await?;

        // Product: category filter
        manager
            .create_index(
                Index::create()
                    .name("idx_product_category")
                    .table(Product::Table)
                    .col(Product::Category)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_store_product_store").table(StoreProduct::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_store_product_available").table(StoreProduct::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_product_category").table(Product::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum StoreProduct { Table, StoreId, IsAvailable }

#[derive(DeriveIden)]
enum Product { Table, Category }
