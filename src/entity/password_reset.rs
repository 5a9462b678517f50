use sea_orm::entity::prelude::*;

use super::RecordState;

/// Sea-ORM entity model for a password reset token.
///
/// A token is valid only while its row is `Active`. Issuing a newer token or
/// completing the password change flips it to `Superseded`; rows are kept for
/// the audit trail.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "password_resets")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub account_id: i32,

    pub token: String,

    pub state: RecordState,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
