use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Errors produced by the token authority, the listing cache and the
/// services built on them.
///
/// `NotFound` is deliberately uninformative: an unknown token, a superseded
/// token, an unknown account and a wrong password all look the same to the
/// caller.
#[derive(Debug, Error)]
pub enum Error {
    #[error("not found")]
    NotFound,

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("database error: {0}")]
    Database(#[from] DbErr),

    #[error("cache backend error: {0}")]
    Cache(String),

    #[error("failed to encode cache payload: {0}")]
    Encode(String),

    #[error("failed to decode cache payload: {0}")]
    Decode(String),

    #[error("password hashing failed: {0}")]
    PasswordHash(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Whether the failure was caused by the caller's input rather than by
    /// the store, the cache or the environment.
    ///
    /// HTTP layers map `true` to a generic 4xx and everything else to a
    /// generic 5xx without echoing the message.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::NotFound | Error::Validation(_))
    }

    /// Maps a unique-constraint violation to [`Error::Validation`] with
    /// `message`; any other database error stays [`Error::Database`].
    pub(crate) fn from_unique_violation(e: DbErr, message: &str) -> Self {
        match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => Error::Validation(message.to_owned()),
            _ => Error::Database(e),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
