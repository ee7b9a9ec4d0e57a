//! Authentication utilities library
//!
//! Credential and session primitives for the event service:
//! - Password hashing (Argon2id, with legacy bcrypt verification)
//! - Signed, time-limited session tokens (HS256 JWT)
//! - Authentication coordination
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash).unwrap());
//! ```
//!
//! ## Session Tokens
//! ```
//! use auth::Authenticator;
//!
//! let auth = Authenticator::with_default_ttl(b"secret_key_at_least_32_bytes_long!").unwrap();
//! let token = auth.issue_token("65f1c0ffee0000000000beef").unwrap();
//! let claims = auth.validate_token(&token).unwrap();
//! assert_eq!(claims.user_id, "65f1c0ffee0000000000beef");
//! ```

pub mod authenticator;
pub mod jwt;
pub mod password;

pub use authenticator::AuthenticationError;
pub use authenticator::AuthenticationResult;
pub use authenticator::Authenticator;
pub use authenticator::DEFAULT_TOKEN_TTL_HOURS;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use jwt::SessionClaims;
pub use password::PasswordError;
pub use password::PasswordHasher;
