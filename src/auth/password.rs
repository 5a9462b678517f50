use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};

use crate::error::{Error, Result};

/// Salted, slow password hashing with Argon2id.
///
/// Hashes are PHC strings, so the parameters used at hashing time travel with
/// the hash and older hashes keep verifying after the cost is raised.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    params: Params,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            params: Params::default(),
        }
    }
}

impl PasswordHasher {
    /// Argon2id with a custom memory cost (KiB) and iteration count.
    ///
    /// Tests use a tiny cost; production should stay at or above the
    /// defaults (19 MiB, 2 iterations).
    pub fn with_cost(memory_kib: u32, iterations: u32) -> Result<Self> {
        let params = Params::new(memory_kib, iterations, Params::DEFAULT_P_COST, None)
            .map_err(|e| Error::Config(format!("invalid argon2 parameters: {e}")))?;
        Ok(Self { params })
    }

    pub fn hash(&self, plaintext: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| Error::PasswordHash(e.to_string()))?;
        Ok(hash.to_string())
    }

    /// `Ok(false)` on mismatch; `Err` only when the stored hash is malformed.
    pub fn verify(&self, hash: &str, plaintext: &str) -> Result<bool> {
        let parsed = PasswordHash::new(hash).map_err(|e| Error::PasswordHash(e.to_string()))?;
        Ok(self
            .argon2()
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok())
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}
