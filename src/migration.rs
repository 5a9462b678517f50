pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_account_tables;
mod m20240101_000002_create_catalog_tables;
mod m20240101_000003_create_cache_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    // Override the name of migration table to avoid conflicts
    fn migration_table_name() -> sea_orm::DynIden {
        Alias::new("bookstore_seaorm_migrations").into_iden()
    }

    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_account_tables::Migration),
            Box::new(m20240101_000002_create_catalog_tables::Migration),
            Box::new(m20240101_000003_create_cache_table::Migration),
        ]
    }
}
