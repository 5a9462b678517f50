use sea_orm::entity::prelude::*;

use super::RecordState;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "activity_log")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub account_id: i32,

    /// Stable activity name, e.g. `logged_in`.
    pub activity: String,

    pub state: RecordState,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
