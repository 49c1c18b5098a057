//! Password hashing with Argon2id
//!
//! Hashes are stored in PHC string format (`$argon2id$v=19$...`), salt and
//! parameters included, so verification needs nothing but the stored string.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::error::{RegisterError, RegisterResult};

/// Hash a password with a fresh random salt
pub fn hash_password(password: &str) -> RegisterResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| RegisterError::Auth(format!("Password hashing failed: {}", e)))?;
    Ok(hash.to_string())
}

/// Check a password against a stored hash
pub fn verify_password(password: &str, stored: &str) -> RegisterResult<bool> {
    let parsed = PasswordHash::new(stored)
        .map_err(|e| RegisterError::Auth(format!("Stored password hash is malformed: {}", e)))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Whether a stored value already looks like an Argon2 hash
pub fn is_hashed(value: &str) -> bool {
    value.starts_with("$argon2")
}
