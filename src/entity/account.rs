use sea_orm::entity::prelude::*;

/// Activation state of an account.
///
/// Accounts start `Pending` and become `Active` once their activation token
/// is consumed. Only active accounts can log in.
#[derive(Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum AccountStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "active")]
    Active,
}

/// Sea-ORM entity model for a registered account.
///
/// # Database Schema
///
/// | Column           | Type               | Description                            |
/// |------------------|--------------------|----------------------------------------|
/// | id               | INTEGER (PK)       | Account identifier                     |
/// | email            | TEXT (unique)      | Login email, trimmed                   |
/// | password_hash    | TEXT               | Argon2id PHC string                    |
/// | status           | TEXT               | `pending` or `active`                  |
/// | activation_token | TEXT NULL          | Cleared once the account is activated  |
/// | login_token      | TEXT NULL (unique) | Current session token, one per account |
/// | created_at       | TIMESTAMPTZ        | Registration time                      |
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub email: String,

    pub password_hash: String,

    pub status: AccountStatus,

    /// Single-use token mailed at registration.
    pub activation_token: Option<String>,

    /// Overwritten on every login, so only the newest session resolves.
    pub login_token: Option<String>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
