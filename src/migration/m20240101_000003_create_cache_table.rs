use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CacheEntries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CacheEntries::CacheKey)
                            .text()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CacheEntries::Data).binary().not_null())
                    .col(
                        ColumnDef::new(CacheEntries::ExpiryDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_cache_entries_expiry_date")
                    .table(CacheEntries::Table)
                    .col(CacheEntries::ExpiryDate)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CacheEntries::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum CacheEntries {
    Table,
    CacheKey,
    Data,
    ExpiryDate,
}
