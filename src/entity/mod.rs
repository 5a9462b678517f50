//! Database entity models for the bookstore core.
//!
//! These are the Sea-ORM entity definitions behind the token authority, the
//! activity log, the catalog and the table-backed listing cache.

/// Registered accounts with their activation and login tokens.
pub mod account;

/// Account activity entries, superseded per `(account, activity)` pair.
pub mod activity_log;

pub mod book;

/// Serialized listing results with an expiry, used by `DatabaseCache`.
pub mod cache_entry;

/// Password reset tokens. Rows are superseded, never deleted.
pub mod password_reset;

pub mod review;

mod record_state;
pub use record_state::RecordState;
