//! Token authority and the account flows built on it.
//!
//! [`TokenAuthority`] owns the binding of opaque tokens to accounts for the
//! three flows that use them: login sessions, account activation and password
//! reset links. [`AccountService`] adds password checks, registration and the
//! activity log on top.

mod accounts;
mod activity;
mod authority;
mod password;
mod token;

pub use accounts::{AccountService, Registration, Session};
pub use activity::{Activity, ActivityLog};
pub use authority::TokenAuthority;
pub use password::PasswordHasher;
pub use token::{extract_bearer, generate_token, Token, BEARER_PREFIX, TOKEN_LEN};

/// Account identifier as stored in the `accounts` table.
pub type AccountId = i32;

/// The account a request acts on behalf of.
///
/// Produced by [`TokenAuthority::authenticate`] and passed explicitly down the
/// call chain; nothing about the caller's identity is kept on shared state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Principal {
    pub account_id: AccountId,
}
