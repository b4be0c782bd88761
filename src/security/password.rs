//! Salted one-way password hashing.

use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use password_hash::{PasswordHash, SaltString};

use crate::errors::WikiError;

/// Hash a password into an Argon2 PHC string with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, WikiError> {
    let mut salt_bytes = [0u8; 16];
    getrandom::getrandom(&mut salt_bytes).map_err(|e| WikiError::PasswordHash(e.to_string()))?;
    let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| WikiError::PasswordHash(e.to_string()))?;
    let phc = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| WikiError::PasswordHash(e.to_string()))?
        .to_string();
    Ok(phc)
}

/// Check a password against a stored PHC string.
///
/// A malformed stored hash is a mismatch, not an error.
pub fn check_password(password: &str, hashed: &str) -> bool {
    match PasswordHash::new(hashed) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_password_checks() {
        for password in ["editor", "viewer", "", "päss wörd with spaces"] {
            let hashed = hash_password(password).unwrap();
            assert!(check_password(password, &hashed), "{password:?}");
        }
    }

    #[test]
    fn wrong_password_fails() {
        let hashed = hash_password("editor").unwrap();
        assert!(!check_password("Editor", &hashed));
        assert!(!check_password("", &hashed));
    }

    #[test]
    fn salts_differ_between_calls() {
        let a = hash_password("same").unwrap();
        let b = hash_password("same").unwrap();
        assert_ne!(a, b);
        assert!(a.starts_with("$argon2"));
    }

    #[test]
    fn malformed_hash_is_a_mismatch() {
        assert!(!check_password("editor", "not-a-phc-string"));
        assert!(!check_password("editor", ""));
    }
}
