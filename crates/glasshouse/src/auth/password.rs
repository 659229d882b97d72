//! Password policy and Argon2 digests.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::password_hash::rand_core::OsRng;
use argon2::Argon2;

use glasshouse_common::GlasshouseError;

/// Strength policy enforced by the hardened registration path
#[derive(Debug, Clone, Copy)]
pub struct PasswordPolicy {
    /// Minimum number of characters
    pub min_length: usize,
}

impl PasswordPolicy {
    pub fn new(min_length: usize) -> Self {
        Self { min_length }
    }

    /// A password passes with at least `min_length` characters, one
    /// uppercase letter, and one digit.
    pub fn validate(&self, password: &str) -> bool {
        password.chars().count() >= self.min_length
            && password.chars().any(|c| c.is_ascii_uppercase())
            && password.chars().any(|c| c.is_ascii_digit())
    }
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self::new(glasshouse_common::constants::MIN_PASSWORD_LEN)
    }
}

/// Compute a salted Argon2 digest for storage
pub fn hash_password(password: &str) -> Result<String, GlasshouseError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| GlasshouseError::PasswordHash(e.to_string()))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored digest.
///
/// Uses the dedicated verify operation rather than string equality, so
/// the comparison does not leak timing. An unparseable digest (for
/// example a plaintext row created through the vulnerable path) simply
/// fails verification.
pub fn verify_password(password: &str, digest: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(digest) else {
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
    fn test_policy_rejects_short_passwords() {
        let policy = PasswordPolicy::default();
        assert!(!policy.validate("Abc123"));
        assert!(!policy.validate("Short1A"));
        assert!(policy.validate("LongEnough1"));
    }

    #[test]
    fn test_policy_requires_uppercase_and_digit() {
        let policy = PasswordPolicy::default();
        assert!(!policy.validate("alllowercase1"));
        assert!(!policy.validate("NoDigitsHere"));
        assert!(!policy.validate("12345678901"));
        assert!(policy.validate("Mixed12345x"));
    }

    #[test]
    fn test_digest_round_trip() {
        let digest = hash_password("Correct1Horse").unwrap();
        assert!(digest.starts_with("$argon2"));
        assert!(verify_password("Correct1Horse", &digest));
        assert!(!verify_password("Wrong1Horsey", &digest));
    }

    #[test]
    fn test_plaintext_row_never_verifies() {
        assert!(!verify_password("hunter2", "hunter2"));
    }
}
