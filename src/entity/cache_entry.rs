//! Cache entry entity model for Sea-ORM database interaction.
//!
//! This module defines the database schema representation used by
//! `DatabaseCache` to keep serialized listing results in a plain table.

use sea_orm::entity::prelude::*;

/// Sea-ORM entity model representing one cached listing.
///
/// # Database Schema
///
/// | Column      | Type                    | Description                          |
/// |-------------|-------------------------|--------------------------------------|
/// | cache_key   | TEXT (Primary Key)      | Structured cache key                 |
/// | data        | BYTEA                   | MessagePack serialized listing       |
/// | expiry_date | TIMESTAMPTZ             | Entry expiration timestamp           |
///
/// # Usage
///
/// This entity is used internally by `DatabaseCache`; callers normally go
/// through `QueryCache` and never touch it directly.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "cache_entries")]
pub struct Model {
    /// The cache key, see `CacheKey`.
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub cache_key: String,

    /// The serialized listing stored as a binary blob.
    pub data: Vec<u8>,

    /// When the entry stops being served. Rows past this instant are treated
    /// as absent and removed by `DatabaseCache::delete_expired`.
    pub expiry_date: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
