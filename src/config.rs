//! Environment-driven settings.
//!
//! Values come from the process environment, after loading a `.env` file if
//! one is present.
//!
//! | Variable              | Default     | Meaning                              |
//! |-----------------------|-------------|--------------------------------------|
//! | `DATABASE_URL`        | required    | Sea-ORM connection string            |
//! | `REDIS_URL`           | unset       | Use Redis as the listing cache       |
//! | `CACHE_TTL_SECS`      | `300`       | Lifetime of a cached listing         |
//! | `CACHE_PREFIX`        | `bookstore` | Namespace of cache keys              |
//! | `PASSWORD_MEMORY_KIB` | `19456`     | Argon2 memory cost                   |
//! | `PASSWORD_ITERATIONS` | `2`         | Argon2 time cost                     |

use std::str::FromStr;
use std::time::Duration;

use crate::auth::PasswordHasher;
use crate::cache::DEFAULT_TTL;
use crate::error::{Error, Result};

const DEFAULT_CACHE_PREFIX: &str = "bookstore";
const DEFAULT_PASSWORD_MEMORY_KIB: u32 = 19 * 1024;
const DEFAULT_PASSWORD_ITERATIONS: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub database_url: String,
    pub redis_url: Option<String>,
    pub cache_ttl: Duration,
    pub cache_prefix: String,
    pub password_memory_kib: u32,
    pub password_iterations: u32,
}

impl Settings {
    /// Loads `.env` (if any) and reads the process environment.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds settings from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let database_url =
            var("DATABASE_URL").ok_or_else(|| Error::Config("DATABASE_URL must be set".into()))?;

        let cache_ttl = match var("CACHE_TTL_SECS") {
            Some(raw) => Duration::from_secs(parse("CACHE_TTL_SECS", &raw)?),
            None => DEFAULT_TTL,
        };

        Ok(Self {
            database_url,
            redis_url: var("REDIS_URL"),
            cache_ttl,
            cache_prefix: var("CACHE_PREFIX").unwrap_or_else(|| DEFAULT_CACHE_PREFIX.to_owned()),
            password_memory_kib: var("PASSWORD_MEMORY_KIB")
                .map(|raw| parse("PASSWORD_MEMORY_KIB", &raw))
                .transpose()?
                .unwrap_or(DEFAULT_PASSWORD_MEMORY_KIB),
            password_iterations: var("PASSWORD_ITERATIONS")
                .map(|raw| parse("PASSWORD_ITERATIONS", &raw))
                .transpose()?
                .unwrap_or(DEFAULT_PASSWORD_ITERATIONS),
        })
    }

    pub fn password_hasher(&self) -> Result<PasswordHasher> {
        PasswordHasher::with_cost(self.password_memory_kib, self.password_iterations)
    }
}

fn parse<T>(name: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| Error::Config(format!("{name}: {e}")))
}
