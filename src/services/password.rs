//! Password hashing and verification using Argon2id
use std::sync::LazyLock;

use argon2::{
    Argon2, PasswordHash, PasswordVerifier,
    password_hash::{PasswordHasher, SaltString},
};

// Verified against when the username is unknown, so that path costs as much
// as a wrong password.
static DUMMY_HASH: LazyLock<String> =
    LazyLock::new(|| hash_password("no-such-user").unwrap_or_default());

/// Hash a password with a fresh random salt; returns the PHC string to store.
pub fn hash_password(password: &str) -> Result<String, String> {
    let salt = SaltString::generate(rand::thread_rng());
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| format!("failed to hash password: {}", e))
}

/// `false` for a wrong password and for an unreadable stored hash alike.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

pub fn dummy_hash() -> &'static str {
    DUMMY_HASH.as_str()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct horse", &hash));
    }

    #[test]
    fn test_wrong_password() {
        let hash = hash_password("correct horse").unwrap();
        assert!(!verify_password("battery staple", &hash));
    }

    #[test]
    fn test_salts_differ() {
        assert_ne!(hash_password("pw").unwrap(), hash_password("pw").unwrap());
    }

    #[test]
    fn test_dummy_hash_is_real_argon2() {
        assert!(dummy_hash().starts_with("$argon2id$"));
        assert!(!verify_password("pw", dummy_hash()));
    }

    #[test]
    fn test_garbage_hash() {
        assert!(!verify_password("pw", "plaintext"));
    }
}
