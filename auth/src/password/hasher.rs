use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::PasswordHash;
use argon2::password_hash::PasswordHasher as Argon2PasswordHasher;
use argon2::password_hash::PasswordVerifier;
use argon2::password_hash::SaltString;
use argon2::Argon2;

use super::errors::PasswordError;

/// Prefixes of bcrypt hashes written by earlier deployments of the service.
const BCRYPT_PREFIXES: [&str; 3] = ["$2a$", "$2b$", "$2y$"];

/// Salted one-way password hashing.
///
/// New hashes are Argon2id with the crate's fixed default cost. Verification also
/// accepts bcrypt hashes so accounts created before the switch can still log in.
///
/// The type is a zero-sized `Copy` value so callers can move it into a blocking task.
#[derive(Debug, Clone, Copy, Default)]
pub struct PasswordHasher;

impl PasswordHasher {
    /// Create a new password hasher instance.
    pub fn new() -> Self {
        Self
    }

    /// Hash a plaintext password.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to hash
    ///
    /// # Returns
    /// PHC string (algorithm, parameters, salt and digest)
    ///
    /// # Errors
    /// * `HashingFailed` - Argon2 rejected the input
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);

        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))
    }

    /// Verify a password against a stored hash.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `hash` - Stored hash, Argon2 PHC string or legacy bcrypt
    ///
    /// # Returns
    /// True if the password matches, false otherwise
    ///
    /// # Errors
    /// * `MalformedHash` - The stored hash cannot be parsed
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError> {
        if Self::is_bcrypt(hash) {
            return bcrypt::verify(password, hash)
                .map_err(|e| PasswordError::MalformedHash(e.to_string()));
        }

        let parsed_hash =
            PasswordHash::new(hash).map_err(|e| PasswordError::MalformedHash(e.to_string()))?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    fn is_bcrypt(hash: &str) -> bool {
        BCRYPT_PREFIXES.iter().any(|prefix| hash.starts_with(prefix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hasher = PasswordHasher::new();
        let hash = hasher.hash("s3cret-pass").expect("Failed to hash password");

        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify("s3cret-pass", &hash).expect("Failed to verify"));
        assert!(!hasher.verify("s3cret-pasS", &hash).expect("Failed to verify"));
    }

    #[test]
    fn test_hashes_are_salted() {
        let hasher = PasswordHasher::new();
        let first = hasher.hash("same").unwrap();
        let second = hasher.hash("same").unwrap();

        assert_ne!(first, second);
    }

    #[test]
    fn test_verify_legacy_bcrypt_hash() {
        let hasher = PasswordHasher::new();
        let legacy = bcrypt::hash("password123", 4).expect("Failed to create bcrypt hash");

        assert!(hasher.verify("password123", &legacy).unwrap());
        assert!(!hasher.verify("password124", &legacy).unwrap());
    }

    #[test]
    fn test_verify_malformed_hash() {
        let hasher = PasswordHasher::new();
        let result = hasher.verify("password", "not-a-hash");

        assert!(matches!(result, Err(PasswordError::MalformedHash(_))));
    }
}
