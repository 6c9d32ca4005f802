//! Create `product` table.
//!
//! Catalog entries owned by the catalog side; store products only read them.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Product::Table)
                    .if_not_exists()
                    .col(uuid(Product::Id).primary_key())
                    .col(string_len(Product::Name, 256).not_null())
                    .col(text_null(Product::Description))
                    .col(string_len(Product::Category, 128).not_null())
                    .col(json(Product::Images).not_null())
                    .col(timestamp_with_time_zone(Product::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Product::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Product::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Product { Table, Id, Name, Description, Category, Images, CreatedAt, UpdatedAt }
