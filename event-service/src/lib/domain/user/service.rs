use std::sync::Arc;

use async_trait::async_trait;
use auth::Authenticator;
use chrono::Utc;
use tokio::sync::OnceCell;

use crate::domain::user::errors::UserError;
use crate::domain::user::models::AuthSession;
use crate::domain::user::models::LoginCommand;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::RegisterCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::AuthServicePort;
use crate::domain::user::ports::UserRepository;

/// Password behind the hash checked when a login names an unknown email.
const PLACEHOLDER_PASSWORD: &str = "placeholder-password-never-matches";

/// Domain service implementation for account operations.
///
/// Password hashing and verification run on the blocking pool.
pub struct AuthService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    authenticator: Arc<Authenticator>,
    placeholder_hash: OnceCell<String>,
}

impl<UR> AuthService<UR>
where
    UR: UserRepository,
{
    /// Create a new auth service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User persistence implementation
    /// * `authenticator` - Password and token handling shared with the HTTP layer
    pub fn new(repository: Arc<UR>, authenticator: Arc<Authenticator>) -> Self {
        Self {
            repository,
            authenticator,
            placeholder_hash: OnceCell::new(),
        }
    }

    async fn hash_password(&self, password: String) -> Result<String, UserError> {
        let hasher = self.authenticator.password_hasher();
        let hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| UserError::Unknown(format!("Password hashing task failed: {}", e)))??;

        Ok(hash)
    }

    /// Spend one password verification on a login that matched no account, so an
    /// unknown email takes as long as a wrong password.
    async fn verify_placeholder(&self, password: String) -> Result<(), UserError> {
        let placeholder = self
            .placeholder_hash
            .get_or_try_init(|| self.hash_password(PLACEHOLDER_PASSWORD.to_string()))
            .await?
            .clone();

        let hasher = self.authenticator.password_hasher();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &placeholder))
            .await
            .map_err(|e| UserError::Unknown(format!("Credential check task failed: {}", e)))??;

        Ok(())
    }
}

#[async_trait]
impl<UR> AuthServicePort for AuthService<UR>
where
    UR: UserRepository,
{
    async fn register(&self, command: RegisterCommand) -> Result<AuthSession, UserError> {
        if self
            .repository
            .find_by_email(&command.email)
            .await?
            .is_some()
        {
            return Err(UserError::EmailAlreadyExists(command.email));
        }

        let password_hash = self.hash_password(command.password).await?;
        let now = Utc::now();

        // The unique index still guards concurrent registrations with the same email.
        let user = self
            .repository
            .create(NewUser {
                name: command.name,
                email: command.email,
                password_hash,
                created_at: now,
                updated_at: now,
            })
            .await?;

        let token = self.authenticator.issue_token(&user.id.to_string())?;

        tracing::info!("Registered user {}", user.id);

        Ok(AuthSession { token, user })
    }

    async fn login(&self, command: LoginCommand) -> Result<AuthSession, UserError> {
        let Some(user) = self.repository.find_by_email(&command.email).await? else {
            self.verify_placeholder(command.password).await?;
            return Err(UserError::InvalidCredentials);
        };

        let authenticator = Arc::clone(&self.authenticator);
        let password = command.password;
        let stored_hash = user.password_hash.clone();
        let user_id = user.id.to_string();

        let result = tokio::task::spawn_blocking(move || {
            authenticator.authenticate(&password, &stored_hash, &user_id)
        })
        .await
        .map_err(|e| UserError::Unknown(format!("Credential check task failed: {}", e)))?;

        let authentication = match result {
            Ok(authentication) => authentication,
            Err(auth::AuthenticationError::PasswordError(e)) => {
                tracing::warn!("Unreadable password hash for user {}: {}", user.id, e);
                return Err(UserError::InvalidCredentials);
            }
            Err(e) => return Err(e.into()),
        };

        Ok(AuthSession {
            token: authentication.access_token,
            user,
        })
    }

    async fn current_user(&self, id: &UserId) -> Result<User, UserError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id.to_string()))
    }
}
