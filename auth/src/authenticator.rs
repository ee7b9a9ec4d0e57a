use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::jwt::SessionClaims;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Default lifetime of a session token.
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

/// Authentication coordinator combining password verification and session tokens.
///
/// Built once at startup and shared read-only between requests.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    jwt_handler: JwtHandler,
    token_ttl: Duration,
}

/// Result of successful authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticationResult {
    /// Signed session token
    pub access_token: String,
}

/// Authentication operation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("JWT error: {0}")]
    JwtError(#[from] JwtError),
}

impl Authenticator {
    /// Create a new authenticator.
    ///
    /// # Arguments
    /// * `jwt_secret` - Secret key for token signing
    /// * `token_ttl` - Lifetime of issued tokens
    ///
    /// # Errors
    /// * `MissingSecret` - The secret is empty
    pub fn new(jwt_secret: &[u8], token_ttl: Duration) -> Result<Self, JwtError> {
        Ok(Self {
            password_hasher: PasswordHasher::new(),
            jwt_handler: JwtHandler::new(jwt_secret)?,
            token_ttl,
        })
    }

    /// Create an authenticator issuing tokens valid for 24 hours.
    pub fn with_default_ttl(jwt_secret: &[u8]) -> Result<Self, JwtError> {
        Self::new(jwt_secret, Duration::hours(DEFAULT_TOKEN_TTL_HOURS))
    }

    /// Password hasher, copyable into a blocking task.
    pub fn password_hasher(&self) -> PasswordHasher {
        self.password_hasher
    }

    /// Verify credentials and issue a session token.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `stored_hash` - Stored password hash
    /// * `user_id` - Identifier to embed in the token
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match
    /// * `PasswordError` - Stored hash is malformed
    /// * `JwtError` - Token generation failed
    pub fn authenticate(
        &self,
        password: &str,
        stored_hash: &str,
        user_id: &str,
    ) -> Result<AuthenticationResult, AuthenticationError> {
        if !self.password_hasher.verify(password, stored_hash)? {
            return Err(AuthenticationError::InvalidCredentials);
        }

        let access_token = self.issue_token(user_id)?;

        Ok(AuthenticationResult { access_token })
    }

    /// Issue a session token for a user, valid from now.
    pub fn issue_token(&self, user_id: &str) -> Result<String, JwtError> {
        self.jwt_handler
            .encode(&SessionClaims::for_user(user_id, self.token_ttl))
    }

    /// Issue a session token with an explicit issue instant.
    pub fn issue_token_at(
        &self,
        user_id: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<String, JwtError> {
        self.jwt_handler
            .encode(&SessionClaims::issued_at(user_id, issued_at, self.token_ttl))
    }

    /// Validate a session token and return its claims.
    ///
    /// # Errors
    /// * `TokenExpired` - Token is past its expiry
    /// * `InvalidToken` - Signature or payload is invalid
    pub fn validate_token(&self, token: &str) -> Result<SessionClaims, JwtError> {
        self.jwt_handler.decode(token)
    }
}
