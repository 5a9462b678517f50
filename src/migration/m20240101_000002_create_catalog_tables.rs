use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Books::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Books::Isbn)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Books::Title).string().not_null())
                    .col(ColumnDef::new(Books::Author).string().not_null())
                    .col(ColumnDef::new(Books::Price).float().not_null())
                    .col(ColumnDef::new(Books::Descriptions).text().not_null())
                    .col(ColumnDef::new(Books::Genre).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Reviews::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Reviews::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Reviews::Isbn).string().not_null())
                    .col(ColumnDef::new(Reviews::Title).string().not_null())
                    .col(ColumnDef::new(Reviews::Rating).float().not_null())
                    .col(ColumnDef::new(Reviews::Price).float().not_null())
                    .col(ColumnDef::new(Reviews::Descriptions).text().not_null())
                    .col(ColumnDef::new(Reviews::AccountId).integer().not_null())
                    .col(
                        ColumnDef::new(Reviews::IsDeleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Reviews::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reviews_book")
                            .from(Reviews::Table, Reviews::Isbn)
                            .to(Books::Table, Books::Isbn),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_reviews_isbn")
                    .table(Reviews::Table)
                    .col(Reviews::Isbn)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_reviews_account_id")
                    .table(Reviews::Table)
                    .col(Reviews::AccountId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Reviews::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Books::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Books {
    Table,
    Isbn,
    Title,
    Author,
    Price,
    Descriptions,
    Genre,
}

#[derive(DeriveIden)]
enum Reviews {
    Table,
    Id,
    Isbn,
    Title,
    Rating,
    Price,
    Descriptions,
    AccountId,
    IsDeleted,
    CreatedAt,
}
