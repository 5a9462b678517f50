#![allow(dead_code)]

use bookstore_seaorm_core::entity::account::{self, AccountStatus};
use bookstore_seaorm_core::migration::{Migrator, MigratorTrait};
use bookstore_seaorm_core::PasswordHasher;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};

/// A migrated in-memory SQLite database.
///
/// A single pooled connection keeps every query on the same in-memory
/// database.
pub async fn setup_db() -> DatabaseConnection {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(opt).await.expect("connect to sqlite");
    Migrator::up(&db, None).await.expect("run migrations");
    db
}

/// Argon2 with the smallest allowed cost, so tests stay fast.
pub fn cheap_hasher() -> PasswordHasher {
    PasswordHasher::with_cost(8, 1).expect("valid argon2 parameters")
}

/// Inserts an active account with a fixed id.
pub async fn insert_account(db: &DatabaseConnection, id: i32, email: &str) -> account::Model {
    account::ActiveModel {
        id: Set(id),
        email: Set(email.to_owned()),
        password_hash: Set("unused".to_owned()),
        status: Set(AccountStatus::Active),
        activation_token: Set(None),
        login_token: Set(None),
        created_at: Set(chrono::Utc::now().into()),
    }
    .insert(db)
    .await
    .expect("insert account")
}
