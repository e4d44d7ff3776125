//! Credential hasher: Argon2id in PHC string format.
//!
//! Every call to [`hash_password`] draws a fresh salt, so hashing the same
//! password twice yields two different blobs that both verify.

use argon2::{
    Argon2,
    password_hash::{
        self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};

use std::sync::LazyLock;

use super::errors::HashingError;

/// Hash checked when a login names no stored account, so both failure paths
/// run one Argon2 verification
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("chirpy-placeholder-password").ok());

#[cfg(test)]
thread_local! {
    pub(crate) static VERIFICATIONS: std::cell::Cell<usize> = const { std::cell::Cell::new(0) };
}

/// Outcome of comparing a password against a stored hash
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum PasswordCheck {
    Match,
    Mismatch,
}

impl PasswordCheck {
    pub fn is_match(self) -> bool {
        self == PasswordCheck::Match
    }
}

/// Hash a password with a per-call random salt
pub fn hash_password(password: &str) -> Result<String, HashingError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| HashingError::Failed(e.to_string()))
}

/// Verify a password against a stored hash
///
/// # Errors
///
/// * `HashingError::MalformedHash` - The stored blob is not a valid PHC string
/// * `HashingError::Failed` - Verification could not be carried out
pub fn verify_password(hash: &str, password: &str) -> Result<PasswordCheck, HashingError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| HashingError::MalformedHash)?;

    #[cfg(test)]
    VERIFICATIONS.with(|count| count.set(count.get() + 1));

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(PasswordCheck::Match),
        Err(password_hash::Error::Password) => Ok(PasswordCheck::Mismatch),
        Err(e) => Err(HashingError::Failed(e.to_string())),
    }
}

/// Verify `password` against a fixed placeholder hash and discard the result
///
/// Costs the same as [`verify_password`] on a real account.
pub fn verify_placeholder(password: &str) {
    if let Some(hash) = DUMMY_HASH.as_deref() {
        let _ = verify_password(hash, password);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let hash = hash_password("password").unwrap();
        assert_eq!(
            verify_password(&hash, "password").unwrap(),
            PasswordCheck::Match
        );
    }

    #[test]
    fn test_wrong_password_is_mismatch_not_error() {
        let hash = hash_password("password").unwrap();
        let check = verify_password(&hash, "wrong_password").unwrap();
        assert_eq!(check, PasswordCheck::Mismatch);
        assert!(!check.is_match());
    }

    #[test]
    fn test_same_password_hashes_differ() {
        let first = hash_password("hunter2").unwrap();
        let second = hash_password("hunter2").unwrap();
        assert_ne!(first, second, "Salt should differ between calls");
        assert!(verify_password(&first, "hunter2").unwrap().is_match());
        assert!(verify_password(&second, "hunter2").unwrap().is_match());
    }

    #[test]
    fn test_malformed_hash() {
        let result = verify_password("not-a-phc-string", "password");
        assert!(matches!(result, Err(HashingError::MalformedHash)));
    }

    #[test]
    fn test_placeholder_runs_a_verification() {
        let before = VERIFICATIONS.with(|count| count.get());
        verify_placeholder("anything");
        assert_eq!(VERIFICATIONS.with(|count| count.get()), before + 1);
    }

    #[test]
    fn test_empty_password_roundtrip() {
        let hash = hash_password("").unwrap();
        assert!(verify_password(&hash, "").unwrap().is_match());
        assert!(!verify_password(&hash, " ").unwrap().is_match());
    }
}
