use std::fmt;

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

/// A structured cache key: `{prefix}:{operation}:{digest}`.
///
/// The digest is SHA-256 over the MessagePack encoding of the query
/// parameters, so user input never appears in the key itself and two queries
/// share an entry only when operation and parameters are identical.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new<P>(prefix: &str, operation: &str, params: &P) -> Result<Self>
    where
        P: Serialize + ?Sized,
    {
        let encoded = rmp_serde::to_vec(params).map_err(|e| Error::Encode(e.to_string()))?;
        let digest = Sha256::digest(&encoded);
        Ok(Self(format!("{prefix}:{operation}:{}", hex::encode(digest))))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    enum Query {
        All,
        ByIsbn(String),
    }

    #[test]
    fn key_is_prefixed_and_readable() {
        let key = CacheKey::new("bookstore", "books.all", &Query::All).unwrap();

        assert!(key.as_str().starts_with("bookstore:books.all:"));
        assert_eq!(key.as_str().len(), "bookstore:books.all:".len() + 64);
    }

    #[test]
    fn parameters_change_the_key() {
        let a = CacheKey::new("p", "books.by_isbn", &Query::ByIsbn("111".into())).unwrap();
        let b = CacheKey::new("p", "books.by_isbn", &Query::ByIsbn("222".into())).unwrap();
        let again = CacheKey::new("p", "books.by_isbn", &Query::ByIsbn("111".into())).unwrap();

        assert_ne!(a, b);
        assert_eq!(a, again);
    }

    #[test]
    fn raw_input_never_reaches_the_key() {
        let hostile = "' OR '1'='1";
        let key = CacheKey::new("p", "books.by_isbn", &Query::ByIsbn(hostile.into())).unwrap();

        assert!(!key.as_str().contains(hostile));
    }
}
