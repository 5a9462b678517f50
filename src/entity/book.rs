use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A catalog book, keyed by ISBN.
///
/// Serializable so listing results can be stored in the cache as-is.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "books")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub price: f32,
    pub descriptions: String,
    pub genre: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
