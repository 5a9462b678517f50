use std::fmt;

use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use time::OffsetDateTime;

/// Literal, case-sensitive prefix of an `Authorization` bearer header.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Length in hex characters of every generated token (160 bits).
pub const TOKEN_LEN: usize = 40;

const NONCE_LEN: usize = 32;

/// An opaque token bound to one account.
///
/// `Debug` never prints the value so tokens do not end up in logs; use
/// [`Token::as_str`] or `Display` where the value is actually needed, such as
/// the link in an activation email.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(String);

impl Token {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(..)")
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Token {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Token {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// Derives a fresh 40 character lowercase hex token.
///
/// The digest covers the caller's entropy (client address, port, email, ...),
/// the current unix timestamp and 32 bytes from the operating system CSPRNG.
/// The random part is what makes the token unguessable; the other inputs only
/// keep tokens from different callers apart.
pub fn generate_token(entropy: &[&str]) -> Token {
    let mut hasher = Sha256::new();
    for part in entropy {
        hasher.update(part.as_bytes());
        // unit separator, so ["ab", "c"] and ["a", "bc"] differ
        hasher.update([0x1f]);
    }
    hasher.update(OffsetDateTime::now_utc().unix_timestamp().to_be_bytes());

    let mut nonce = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce);
    hasher.update(nonce);

    let digest = hasher.finalize();
    Token(hex::encode(&digest[..TOKEN_LEN / 2]))
}

/// Strips the `Bearer ` prefix from an `Authorization` header value.
///
/// Returns an empty string when the header is empty or carries any other
/// scheme. This is string extraction only; whether the token is bound to an
/// account is decided by [`TokenAuthority::resolve_login_token`].
///
/// [`TokenAuthority::resolve_login_token`]: super::TokenAuthority::resolve_login_token
pub fn extract_bearer(header: &str) -> &str {
    header.strip_prefix(BEARER_PREFIX).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_tokens_are_fixed_length_hex() {
        let token = generate_token(&["127.0.0.1", "8443"]);

        assert_eq!(token.as_str().len(), TOKEN_LEN);
        assert!(token
            .as_str()
            .chars()
            .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn same_entropy_in_the_same_second_still_differs() {
        let first = generate_token(&["10.0.0.7", "51000"]);
        let second = generate_token(&["10.0.0.7", "51000"]);

        assert_ne!(first, second);
    }

    #[test]
    fn empty_entropy_is_accepted() {
        assert_eq!(generate_token(&[]).as_str().len(), TOKEN_LEN);
    }

    #[test]
    fn bearer_prefix_is_stripped() {
        assert_eq!(extract_bearer("Bearer xyz"), "xyz");
    }

    #[test]
    fn header_without_prefix_yields_empty() {
        assert_eq!(extract_bearer("xyz"), "");
        assert_eq!(extract_bearer(""), "");
        assert_eq!(extract_bearer("bearer xyz"), "");
        assert_eq!(extract_bearer("Basic dXNlcjpwYXNz"), "");
    }

    #[test]
    fn debug_output_hides_the_value() {
        let token = Token::from("abc123");

        assert_eq!(format!("{token:?}"), "Token(..)");
        assert_eq!(token.to_string(), "abc123");
    }
}
