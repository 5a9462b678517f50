use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A review written by an account. Deletion only sets `is_deleted`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reviews")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub isbn: String,
    pub title: String,
    pub rating: f32,
    pub price: f32,
    pub descriptions: String,
    pub account_id: i32,
    pub is_deleted: bool,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
