use async_trait::async_trait;
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};
use serde::Serialize;

use crate::auth::AccountId;
use crate::cache::ListingQuery;
use crate::entity::{book, review};

/// Cached book listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum BookListing {
    All,
    ByIsbn(String),
}

#[async_trait]
impl ListingQuery<DatabaseConnection> for BookListing {
    type Item = book::Model;

    fn operation(&self) -> &'static str {
        match self {
            BookListing::All => "books.all",
            BookListing::ByIsbn(_) => "books.by_isbn",
        }
    }

    async fn fetch(&self, db: &DatabaseConnection) -> Result<Vec<book::Model>, DbErr> {
        let query = book::Entity::find();
        let query = match self {
            BookListing::All => query,
            BookListing::ByIsbn(isbn) => query.filter(book::Column::Isbn.eq(isbn.as_str())),
        };
        query.all(db).await
    }
}

/// Cached review listings. Soft-deleted reviews never appear.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ReviewListing {
    All,
    ByAccount(AccountId),
    ByIsbn(String),
}

#[async_trait]
impl ListingQuery<DatabaseConnection> for ReviewListing {
    type Item = review::Model;

    fn operation(&self) -> &'static str {
        match self {
            ReviewListing::All => "reviews.all",
            ReviewListing::ByAccount(_) => "reviews.by_account",
            ReviewListing::ByIsbn(_) => "reviews.by_isbn",
        }
    }

    async fn fetch(&self, db: &DatabaseConnection) -> Result<Vec<review::Model>, DbErr> {
        let query = review::Entity::find().filter(review::Column::IsDeleted.eq(false));
        let query = match self {
            ReviewListing::All => query,
            ReviewListing::ByAccount(account_id) => {
                query.filter(review::Column::AccountId.eq(*account_id))
            }
            ReviewListing::ByIsbn(isbn) => query.filter(review::Column::Isbn.eq(isbn.as_str())),
        };
        query.all(db).await
    }
}
