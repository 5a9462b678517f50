//! Books and reviews.
//!
//! Listing reads go through the [`QueryCache`]; creates, deletes and existence
//! checks go straight to the database. Writes do not invalidate cached
//! listings, so a new book shows up in `list_books` once the cached entry
//! expires.

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, NotSet, PaginatorTrait,
    QueryFilter, Set,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::{AccountId, Activity, ActivityLog, Principal};
use crate::cache::{CacheBackend, QueryCache};
use crate::entity::{book, review};
use crate::error::{Error, Result};
use crate::util::now_db;

mod listing;

pub use listing::{BookListing, ReviewListing};

/// Fields of a book to add to the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBook {
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub price: f32,
    pub descriptions: String,
    pub genre: String,
}

/// Fields of a review; the author comes from the acting principal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewReview {
    pub isbn: String,
    pub title: String,
    pub rating: f32,
    pub price: f32,
    pub descriptions: String,
}

#[derive(Debug, Clone)]
pub struct Catalog<B> {
    conn: DatabaseConnection,
    cache: QueryCache<B>,
    activity: ActivityLog,
}

impl<B> Catalog<B>
where
    B: CacheBackend,
{
    pub fn new(conn: DatabaseConnection, cache: QueryCache<B>) -> Self {
        Self {
            activity: ActivityLog::new(conn.clone()),
            conn,
            cache,
        }
    }

    pub fn cache(&self) -> &QueryCache<B> {
        &self.cache
    }

    pub async fn book_exists(&self, isbn: &str) -> Result<bool> {
        let count = book::Entity::find()
            .filter(book::Column::Isbn.eq(isbn))
            .count(&self.conn)
            .await?;
        Ok(count > 0)
    }

    /// Adds a book. The ISBN must not be in the catalog yet.
    pub async fn create_book(&self, actor: &Principal, new: NewBook) -> Result<book::Model> {
        if new.isbn.trim().is_empty() {
            return Err(Error::Validation("isbn must not be empty".into()));
        }
        if self.book_exists(&new.isbn).await? {
            return Err(Error::Validation("isbn already exists".into()));
        }

        let model = book::ActiveModel {
            isbn: Set(new.isbn),
            title: Set(new.title),
            author: Set(new.author),
            price: Set(new.price),
            descriptions: Set(new.descriptions),
            genre: Set(new.genre),
        }
        .insert(&self.conn)
        .await?;

        self.activity
            .record(actor.account_id, Activity::BookListed)
            .await?;

        info!(account_id = actor.account_id, isbn = %model.isbn, "book listed");
        Ok(model)
    }

    pub async fn list_books(&self) -> Result<Vec<book::Model>> {
        self.cache.list_cached(&self.conn, &BookListing::All).await
    }

    /// Zero or one book; an unknown ISBN is an empty list, not an error.
    pub async fn book_by_isbn(&self, isbn: &str) -> Result<Vec<book::Model>> {
        self.cache
            .list_cached(&self.conn, &BookListing::ByIsbn(isbn.to_owned()))
            .await
    }

    /// Adds a review by `actor` for a book already in the catalog.
    pub async fn create_review(&self, actor: &Principal, new: NewReview) -> Result<review::Model> {
        if new.isbn.trim().is_empty() {
            return Err(Error::Validation("isbn must not be empty".into()));
        }
        if !self.book_exists(&new.isbn).await? {
            return Err(Error::Validation("no book with this isbn".into()));
        }

        let model = review::ActiveModel {
            id: NotSet,
            isbn: Set(new.isbn),
            title: Set(new.title),
            rating: Set(new.rating),
            price: Set(new.price),
            descriptions: Set(new.descriptions),
            account_id: Set(actor.account_id),
            is_deleted: Set(false),
            created_at: Set(now_db()),
        }
        .insert(&self.conn)
        .await?;

        self.activity
            .record(actor.account_id, Activity::ReviewCreated)
            .await?;

        info!(account_id = actor.account_id, review_id = model.id, "review created");
        Ok(model)
    }

    /// Soft-deletes one of the actor's own reviews.
    ///
    /// Someone else's review, an unknown id and an already deleted review all
    /// fail with [`Error::NotFound`].
    pub async fn delete_review(&self, actor: &Principal, review_id: i32) -> Result<()> {
        let result = review::Entity::update_many()
            .col_expr(review::Column::IsDeleted, Expr::value(true))
            .filter(review::Column::Id.eq(review_id))
            .filter(review::Column::AccountId.eq(actor.account_id))
            .filter(review::Column::IsDeleted.eq(false))
            .exec(&self.conn)
            .await?;

        if result.rows_affected == 0 {
            return Err(Error::NotFound);
        }

        self.activity
            .record(actor.account_id, Activity::ReviewDeleted)
            .await?;

        info!(account_id = actor.account_id, review_id, "review deleted");
        Ok(())
    }

    pub async fn list_reviews(&self) -> Result<Vec<review::Model>> {
        self.cache.list_cached(&self.conn, &ReviewListing::All).await
    }

    pub async fn reviews_by_account(&self, account_id: AccountId) -> Result<Vec<review::Model>> {
        self.cache
            .list_cached(&self.conn, &ReviewListing::ByAccount(account_id))
            .await
    }

    pub async fn reviews_by_isbn(&self, isbn: &str) -> Result<Vec<review::Model>> {
        self.cache
            .list_cached(&self.conn, &ReviewListing::ByIsbn(isbn.to_owned()))
            .await
    }
}
