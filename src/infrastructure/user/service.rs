//! User service: storage orchestration, token lifecycle and password flows

use std::sync::Arc;

use chrono::Duration;
use tracing::{debug, info, warn};

use crate::config::TokensConfig;
use crate::domain::breach::BreachChecker;
use crate::domain::token::{AccountToken, TokenKind, TokenRepository, TokenValidation};
use crate::domain::user::{
    non_blank, validate_password, NotificationType, Role, User, UserId, UserRepository,
};
use crate::domain::DomainError;

use super::code::generate_code;
use super::password::PasswordHasher;

/// Token lifetimes and one-time code shape
#[derive(Debug, Clone, Copy)]
pub struct TokenSettings {
    pub expiration: Duration,
    pub code_length: usize,
}

impl Default for TokenSettings {
    fn default() -> Self {
        Self {
            expiration: Duration::minutes(10),
            code_length: 4,
        }
    }
}

impl From<&TokensConfig> for TokenSettings {
    fn from(config: &TokensConfig) -> Self {
        Self {
            expiration: Duration::minutes(config.expiration_minutes),
            code_length: config.code_length,
        }
    }
}

/// Self-service registration input
#[derive(Debug, Clone, Default)]
pub struct RegistrationRequest {
    pub username: Option<String>,
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// User service
#[derive(Debug)]
pub struct UserService<R: UserRepository, T: TokenRepository> {
    users: Arc<R>,
    tokens: Arc<T>,
    hasher: Arc<dyn PasswordHasher>,
    breach_checker: Arc<dyn BreachChecker>,
    settings: TokenSettings,
}

impl<R: UserRepository, T: TokenRepository> UserService<R, T> {
    pub fn new(
        users: Arc<R>,
        tokens: Arc<T>,
        hasher: Arc<dyn PasswordHasher>,
        breach_checker: Arc<dyn BreachChecker>,
        settings: TokenSettings,
    ) -> Self {
        Self {
            users,
            tokens,
            hasher,
            breach_checker,
            settings,
        }
    }

    /// Hash a plaintext password with the configured algorithm
    pub fn hash_password(&self, password: &str) -> Result<String, DomainError> {
        self.hasher.hash(password)
    }

    /// Persist a user, carrying the stored password hash forward on update
    pub async fn store(&self, user: User) -> Result<User, DomainError> {
        self.persist(user, None).await
    }

    /// Persist a user with an explicit replacement password hash
    pub async fn store_with_password(
        &self,
        user: User,
        password_hash: String,
    ) -> Result<User, DomainError> {
        self.persist(user, Some(password_hash)).await
    }

    async fn persist(
        &self,
        mut user: User,
        password_hash: Option<String>,
    ) -> Result<User, DomainError> {
        if let Some(id) = user.id() {
            let existing = self.users.find_by_id(id).await?.ok_or_else(|| {
                warn!(user_id = %id, "Store attempted for unknown user");
                DomainError::not_found(format!("No user found for ID [{}]", id))
            })?;

            user.reset_changed_channels(&existing);
            user.set_password(existing.password().map(str::to_string));
        }

        if let Some(hash) = password_hash {
            user.set_password(Some(hash));
        }

        if user.role().is_none() {
            user.set_role(Some(Role::Student));
        }

        let stored = self.users.save(user).await?;
        info!(user_id = ?stored.id(), "User stored");
        Ok(stored)
    }

    /// Get a user by id; the password hash is stripped
    pub async fn get(&self, id: UserId) -> Result<User, DomainError> {
        let user = self.users.find_by_id(id).await?.ok_or_else(|| {
            warn!(user_id = %id, "User not found");
            DomainError::not_found(format!("No user found for ID [{}]", id))
        })?;

        Ok(without_password(user))
    }

    pub async fn get_all(&self) -> Result<Vec<User>, DomainError> {
        let users = self.users.find_all().await?;
        Ok(users.into_iter().map(without_password).collect())
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        Ok(self
            .users
            .find_by_username(username)
            .await?
            .map(without_password))
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        Ok(self.users.find_by_email(email).await?.map(without_password))
    }

    /// Ids of users matching the optional case-insensitive filters
    pub async fn find_ids(
        &self,
        username: Option<&str>,
        slack: Option<&str>,
    ) -> Result<Vec<UserId>, DomainError> {
        let users = self.users.find_all().await?;

        Ok(users
            .iter()
            .filter(|u| username.is_none_or(|name| matches_ignore_case(u.username(), name)))
            .filter(|u| slack.is_none_or(|handle| matches_ignore_case(u.slack(), handle)))
            .filter_map(User::id)
            .collect())
    }

    pub async fn count(&self) -> Result<usize, DomainError> {
        self.users.count().await
    }

    /// Check a username/password pair; `None` when either does not match
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, DomainError> {
        let Some(user) = self.users.find_by_username(username).await? else {
            debug!(username = %username, "Login for unknown username");
            return Ok(None);
        };

        let verified = user
            .password()
            .is_some_and(|hash| self.hasher.verify(password, hash));

        if !verified {
            warn!(username = %username, "Login with wrong password");
            return Ok(None);
        }

        Ok(Some(without_password(user)))
    }

    /// Occurrences of a SHA-1 password hash in the breach corpus
    pub async fn check_if_password_is_compromised(
        &self,
        sha1_hash: &str,
    ) -> Result<u64, DomainError> {
        let sha1_hash = sha1_hash.trim();
        if sha1_hash.is_empty() {
            return Ok(0);
        }

        self.breach_checker.occurrences(sha1_hash).await
    }

    /// Create an account from the self-service registration form
    pub async fn register_user(&self, request: RegistrationRequest) -> Result<User, DomainError> {
        let email = non_blank(Some(request.email.as_str()))
            .ok_or_else(|| DomainError::invalid_payload("Email is a required value"))?
            .to_string();
        let password = validate_password(Some(request.password.as_str()))
            .map_err(|e| DomainError::invalid_payload(e.to_string()))?;

        let username = request
            .username
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| email.clone());

        let mut user = User::new(username);
        user.set_email(Some(email));
        user.set_first_name(request.first_name);
        user.set_last_name(request.last_name);
        user.set_role(Some(Role::Student));
        user.set_password(Some(self.hasher.hash(password)?));

        let stored = self.users.save(user).await?;
        info!(user_id = ?stored.id(), "User registered");
        Ok(without_password(stored))
    }

    /// Mark one contact channel of a user as verified
    pub async fn mark_channel_verified(
        &self,
        id: UserId,
        channel: NotificationType,
    ) -> Result<User, DomainError> {
        let mut user = self.get(id).await?;
        user.mark_verified(channel);
        self.store(user).await.map(without_password)
    }

    /// Assign a fresh one-time code to the user owning `email`
    pub async fn assign_reset_code(&self, email: &str) -> Result<bool, DomainError> {
        let Some(mut user) = self.users.find_by_email(email.trim()).await? else {
            warn!(
                email = %email,
                "Password reset attempted for an email address that is not registered"
            );
            return Ok(false);
        };

        user.set_code(Some(generate_code(self.settings.code_length)));
        self.store(user).await?;
        Ok(true)
    }

    // Verification tokens

    pub async fn save_verification_token_for_user(
        &self,
        token: &str,
        user: &User,
    ) -> Result<AccountToken, DomainError> {
        self.issue_token(TokenKind::Verification, token, user).await
    }

    /// Validate a verification token, enabling its owner when valid
    pub async fn validate_verification_token(
        &self,
        token: &str,
    ) -> Result<TokenValidation, DomainError> {
        let (validation, owner) = self.check_token(TokenKind::Verification, token).await?;

        if let Some(id) = owner {
            let mut user = self.users.find_by_id(id).await?.ok_or_else(|| {
                DomainError::not_found(format!("No user found for ID [{}]", id))
            })?;
            user.set_enabled(true);
            self.users.save(user).await?;
            info!(user_id = %id, "User enabled by verification token");
        }

        Ok(validation)
    }

    /// Replace a verification token's string, keeping its owner and expiry
    pub async fn generate_new_verification_token(
        &self,
        existing_token: &str,
    ) -> Result<AccountToken, DomainError> {
        let mut token = self
            .tokens
            .find(TokenKind::Verification, existing_token)
            .await?
            .ok_or_else(|| DomainError::not_found("Verification token not found"))?;

        token.rotate();
        self.tokens.save(token).await
    }

    // Password reset tokens

    pub async fn create_password_reset_token_for_user(
        &self,
        user: &User,
        token: &str,
    ) -> Result<AccountToken, DomainError> {
        self.issue_token(TokenKind::PasswordReset, token, user).await
    }

    pub async fn validate_password_reset_token(
        &self,
        token: &str,
    ) -> Result<TokenValidation, DomainError> {
        let (validation, _) = self.check_token(TokenKind::PasswordReset, token).await?;
        Ok(validation)
    }

    pub async fn get_user_by_password_reset_token(
        &self,
        token: &str,
    ) -> Result<Option<User>, DomainError> {
        let Some(record) = self.tokens.find(TokenKind::PasswordReset, token).await? else {
            return Ok(None);
        };

        Ok(self
            .users
            .find_by_id(record.user_id())
            .await?
            .map(without_password))
    }

    /// Consume a reset token and change its owner's password when it is valid
    pub async fn reset_password_with_token(
        &self,
        token: &str,
        new_password: &str,
    ) -> Result<TokenValidation, DomainError> {
        validate_password(Some(new_password))
            .map_err(|e| DomainError::invalid_payload(e.to_string()))?;

        let (validation, owner) = self.check_token(TokenKind::PasswordReset, token).await?;

        if let Some(id) = owner {
            self.change_password(id, new_password).await?;
        }

        Ok(validation)
    }

    // Passwords

    /// Hash and persist a new password; any outstanding one-time code is cleared
    pub async fn change_password(
        &self,
        id: UserId,
        new_password: &str,
    ) -> Result<User, DomainError> {
        let mut user = self.get(id).await?;
        let hash = self.hasher.hash(new_password)?;
        user.set_code(None);

        let stored = self.store_with_password(user, hash).await?;
        info!(user_id = %id, "Password changed");
        Ok(without_password(stored))
    }

    pub async fn check_if_valid_old_password(
        &self,
        id: UserId,
        old_password: &str,
    ) -> Result<bool, DomainError> {
        let user = self
            .users
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("No user found for ID [{}]", id)))?;

        Ok(user
            .password()
            .is_some_and(|hash| self.hasher.verify(old_password, hash)))
    }

    async fn issue_token(
        &self,
        kind: TokenKind,
        token: &str,
        user: &User,
    ) -> Result<AccountToken, DomainError> {
        let user_id = user
            .id()
            .ok_or_else(|| DomainError::invalid_payload("Tokens can only be issued to stored users"))?;

        let issued = AccountToken::issue(kind, user_id, token, self.settings.expiration);
        debug!(user_id = %user_id, kind = kind.as_str(), "Issuing token");
        self.tokens.save(issued).await
    }

    /// Classify a token; expired and valid tokens are deleted. The owner is
    /// returned only for valid tokens.
    async fn check_token(
        &self,
        kind: TokenKind,
        token: &str,
    ) -> Result<(TokenValidation, Option<UserId>), DomainError> {
        let Some(record) = self.tokens.find(kind, token).await? else {
            return Ok((TokenValidation::Invalid, None));
        };

        self.tokens.delete(kind, token).await?;

        if record.is_expired() {
            info!(user_id = %record.user_id(), kind = kind.as_str(), "Token expired");
            return Ok((TokenValidation::Expired, None));
        }

        Ok((TokenValidation::Valid, Some(record.user_id())))
    }
}

fn without_password(mut user: User) -> User {
    user.clear_password();
    user
}

fn matches_ignore_case(value: Option<&str>, wanted: &str) -> bool {
    value.is_some_and(|v| v.eq_ignore_ascii_case(wanted))
}
