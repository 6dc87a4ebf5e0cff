use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand_core::OsRng;
use chrono::{DateTime, Utc};

use crate::errors::AppError;

/// Hashes a plaintext password into an Argon2id PHC string.
///
/// Any string is accepted; length and emptiness rules belong to the request
/// validators.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| AppError::internal(format!("failed to hash password: {err}")))
}

/// Checks `password` against a stored PHC digest. A digest that does not parse
/// never matches.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(password_hash) {
        Ok(hash) => hash,
        Err(err) => {
            tracing::warn!(error = %err, "stored password hash is malformed");
            return false;
        }
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

pub fn utc_now() -> DateTime<Utc> {
    Utc::now()
}

/// Clamps `limit`/`offset` query values to sane bounds.
pub fn page_bounds(limit: Option<i64>, offset: Option<i64>) -> (i64, i64) {
    const DEFAULT_LIMIT: i64 = 10;
    const MAX_LIMIT: i64 = 100;

    let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let offset = offset.unwrap_or(0).max(0);
    (limit, offset)
}
