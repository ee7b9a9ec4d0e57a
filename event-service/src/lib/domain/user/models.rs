use std::fmt;

use bson::oid::ObjectId;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::user::errors::UserError;
use crate::domain::user::errors::UserIdError;

/// Registered user.
///
/// `password_hash` never leaves the domain; response types copy the other fields.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User unique identifier, assigned by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(pub ObjectId);

impl UserId {
    /// Generate a fresh identifier.
    pub fn new() -> Self {
        Self(ObjectId::new())
    }

    /// Parse a user ID from its 24-character hex form.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid ObjectId
    pub fn from_string(s: &str) -> Result<Self, UserIdError> {
        ObjectId::parse_str(s)
            .map(UserId)
            .map_err(|e| UserIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_hex())
    }
}

/// User record ready to be persisted; the store assigns the identifier.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NewUser {
    pub fn with_id(self, id: UserId) -> User {
        User {
            id,
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Command to register a new account.
#[derive(Debug)]
pub struct RegisterCommand {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl RegisterCommand {
    /// Build a registration command, requiring every field to be present and non-blank.
    ///
    /// # Errors
    /// * `MissingFields` - One or more fields are absent or blank, listed in order
    pub fn new(
        name: Option<String>,
        email: Option<String>,
        password: Option<String>,
    ) -> Result<Self, UserError> {
        let mut missing = Vec::new();
        let name = require(name, "name", &mut missing);
        let email = require(email, "email", &mut missing);
        let password = require(password, "password", &mut missing);

        match (name, email, password) {
            (Some(name), Some(email), Some(password)) => Ok(Self {
                name,
                email,
                password,
            }),
            _ => Err(UserError::MissingFields(missing)),
        }
    }
}

fn require(
    value: Option<String>,
    field: &'static str,
    missing: &mut Vec<&'static str>,
) -> Option<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Some(v),
        _ => {
            missing.push(field);
            None
        }
    }
}

/// Command to log in with email and password.
#[derive(Debug)]
pub struct LoginCommand {
    pub email: String,
    pub password: String,
}

/// Outcome of a successful registration or login.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub token: String,
    pub user: User,
}
