//! Argon2id password hashing. Stored hashes are PHC strings
//! (`$argon2id$v=19$m=...,t=...,p=...$salt$hash`).

use argon2::{
    password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;
use tracing::{debug, error};

/// Outcome of checking a plaintext against a stored hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordCheck {
    Match,
    Mismatch,
    /// The stored value is not an Argon2 PHC string (e.g. a bcrypt `$2y$` hash).
    Foreign,
}

fn hasher() -> Argon2<'static> {
    Argon2::new(Algorithm::Argon2id, Version::V0x13, Params::default())
}

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    hasher()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!("hash password: {e}")
        })
}

pub fn check_password(plain: &str, stored: &str) -> PasswordCheck {
    let parsed = match PasswordHash::new(stored) {
        Ok(parsed) => parsed,
        Err(e) => {
            debug!(error = %e, "stored hash is not a PHC string");
            return PasswordCheck::Foreign;
        }
    };
    match hasher().verify_password(plain.as_bytes(), &parsed) {
        Ok(()) => PasswordCheck::Match,
        Err(password_hash::Error::Password) => PasswordCheck::Mismatch,
        Err(e) => {
            debug!(error = %e, algorithm = %parsed.algorithm, "stored hash is not argon2");
            PasswordCheck::Foreign
        }
    }
}
