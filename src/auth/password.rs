//! Argon2id password hashes, stored as PHC strings (`$argon2id$v=19$...`).

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use std::sync::LazyLock;

use crate::error::RollcallError;

/// Hash of a random value, verified against when a username is unknown so
/// both login failures cost one Argon2 verification.
pub static DUMMY_HASH: LazyLock<String> = LazyLock::new(|| {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(salt.as_str().as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .unwrap_or_default()
});

pub fn hash_password(password: &str) -> Result<String, RollcallError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Returns false for a wrong password and for any malformed stored hash.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_verifies_only_the_original_password() {
        let hash = hash_password("admin123").expect("hash");
        assert!(hash.starts_with("$argon2id$"));
        assert!(!hash.contains("admin123"));
        assert!(verify_password("admin123", &hash));
        assert!(!verify_password("admin124", &hash));
        assert!(!verify_password("", &hash));
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let a = hash_password("pw").expect("hash");
        let b = hash_password("pw").expect("hash");
        assert_ne!(a, b);
        assert!(verify_password("pw", &a) && verify_password("pw", &b));
    }

    #[test]
    fn malformed_hashes_never_verify() {
        for stored in ["", "admin123", "$argon2id$garbage", "sha256$1$AAAA$AAAA"] {
            assert!(!verify_password("admin123", stored), "{stored}");
        }
    }

    #[test]
    fn dummy_hash_is_a_phc_string() {
        assert!(DUMMY_HASH.starts_with("$argon2id$"));
        assert!(PasswordHash::new(&DUMMY_HASH).is_ok());
        assert!(!verify_password("admin123", &DUMMY_HASH));
    }
}
