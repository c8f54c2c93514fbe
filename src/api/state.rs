//! Application state for shared services

use std::sync::Arc;

use crate::domain::answer::{AnswerFilter, AnswerId, UserAnswer, UserAnswerRepository};
use crate::domain::token::{AccountToken, TokenRepository, TokenValidation};
use crate::domain::user::{NotificationType, Principal, User, UserId, UserRepository};
use crate::domain::DomainError;
use crate::infrastructure::answer::{AnswerService, RecordAnswer};
use crate::infrastructure::auth::JwtService;
use crate::infrastructure::user::{RegistrationRequest, UserService, UserValidator};

/// Application state containing shared services using dynamic dispatch
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<dyn UserServiceTrait>,
    pub user_validator: Arc<dyn UserValidatorTrait>,
    pub answer_service: Arc<dyn AnswerServiceTrait>,
    pub jwt_service: Arc<JwtService>,
    /// Where verification links send the browser afterwards
    pub ui_host: Arc<str>,
}

/// Trait for user service operations
#[async_trait::async_trait]
pub trait UserServiceTrait: Send + Sync {
    fn hash_password(&self, password: &str) -> Result<String, DomainError>;
    async fn store(&self, user: User) -> Result<User, DomainError>;
    async fn get(&self, id: UserId) -> Result<User, DomainError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;
    async fn find_ids(
        &self,
        username: Option<&str>,
        slack: Option<&str>,
    ) -> Result<Vec<UserId>, DomainError>;
    async fn count(&self) -> Result<usize, DomainError>;
    async fn authenticate(&self, username: &str, password: &str)
        -> Result<Option<User>, DomainError>;
    async fn check_if_password_is_compromised(&self, sha1_hash: &str) -> Result<u64, DomainError>;
    async fn register_user(&self, request: RegistrationRequest) -> Result<User, DomainError>;
    async fn mark_channel_verified(
        &self,
        id: UserId,
        channel: NotificationType,
    ) -> Result<User, DomainError>;
    async fn assign_reset_code(&self, email: &str) -> Result<bool, DomainError>;
    async fn save_verification_token_for_user(
        &self,
        token: &str,
        user: &User,
    ) -> Result<AccountToken, DomainError>;
    async fn validate_verification_token(&self, token: &str)
        -> Result<TokenValidation, DomainError>;
    async fn generate_new_verification_token(
        &self,
        existing_token: &str,
    ) -> Result<AccountToken, DomainError>;
    async fn create_password_reset_token_for_user(
        &self,
        user: &User,
        token: &str,
    ) -> Result<AccountToken, DomainError>;
    async fn reset_password_with_token(
        &self,
        token: &str,
        new_password: &str,
    ) -> Result<TokenValidation, DomainError>;
    async fn change_password(&self, id: UserId, new_password: &str) -> Result<User, DomainError>;
    async fn check_if_valid_old_password(
        &self,
        id: UserId,
        old_password: &str,
    ) -> Result<bool, DomainError>;
}

/// Trait for answer history operations
#[async_trait::async_trait]
pub trait AnswerServiceTrait: Send + Sync {
    async fn record(&self, user_id: UserId, request: RecordAnswer)
        -> Result<UserAnswer, DomainError>;
    async fn history(
        &self,
        user_id: UserId,
        filter: AnswerFilter,
    ) -> Result<Vec<UserAnswer>, DomainError>;
    async fn all(&self, filter: AnswerFilter) -> Result<Vec<UserAnswer>, DomainError>;
    async fn delete(&self, user_id: UserId, id: AnswerId) -> Result<(), DomainError>;
}

/// Trait for payload validation and access checks
#[async_trait::async_trait]
pub trait UserValidatorTrait: Send + Sync {
    async fn validate(&self, user: Option<&User>) -> Result<(), DomainError>;
    async fn access_admin_or_instructor(
        &self,
        principal: Option<&Principal>,
    ) -> Result<UserId, DomainError>;
    async fn access_any_authenticated(
        &self,
        principal: Option<&Principal>,
    ) -> Result<UserId, DomainError>;
    async fn access_admin_instructor_or_specific_user(
        &self,
        user_id: UserId,
        principal: Option<&Principal>,
    ) -> Result<UserId, DomainError>;
    async fn is_admin(&self, principal: Option<&Principal>) -> Result<bool, DomainError>;
    async fn is_authenticated_user(
        &self,
        user_id: UserId,
        principal: Option<&Principal>,
    ) -> Result<bool, DomainError>;
}

// Implement traits for the actual services

#[async_trait::async_trait]
impl<R, T> UserServiceTrait for UserService<R, T>
where
    R: UserRepository + 'static,
    T: TokenRepository + 'static,
{
    fn hash_password(&self, password: &str) -> Result<String, DomainError> {
        UserService::hash_password(self, password)
    }

    async fn store(&self, user: User) -> Result<User, DomainError> {
        UserService::store(self, user).await
    }

    async fn get(&self, id: UserId) -> Result<User, DomainError> {
        UserService::get(self, id).await
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        UserService::find_by_username(self, username).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        UserService::find_by_email(self, email).await
    }

    async fn find_ids(
        &self,
        username: Option<&str>,
        slack: Option<&str>,
    ) -> Result<Vec<UserId>, DomainError> {
        UserService::find_ids(self, username, slack).await
    }

    async fn count(&self) -> Result<usize, DomainError> {
        UserService::count(self).await
    }

    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, DomainError> {
        UserService::authenticate(self, username, password).await
    }

    async fn check_if_password_is_compromised(&self, sha1_hash: &str) -> Result<u64, DomainError> {
        UserService::check_if_password_is_compromised(self, sha1_hash).await
    }

    async fn register_user(&self, request: RegistrationRequest) -> Result<User, DomainError> {
        UserService::register_user(self, request).await
    }

    async fn mark_channel_verified(
        &self,
        id: UserId,
        channel: NotificationType,
    ) -> Result<User, DomainError> {
        UserService::mark_channel_verified(self, id, channel).await
    }

    async fn assign_reset_code(&self, email: &str) -> Result<bool, DomainError> {
        UserService::assign_reset_code(self, email).await
    }

    async fn save_verification_token_for_user(
        &self,
        token: &str,
        user: &User,
    ) -> Result<AccountToken, DomainError> {
        UserService::save_verification_token_for_user(self, token, user).await
    }

    async fn validate_verification_token(
        &self,
        token: &str,
    ) -> Result<TokenValidation, DomainError> {
        UserService::validate_verification_token(self, token).await
    }

    async fn generate_new_verification_token(
        &self,
        existing_token: &str,
    ) -> Result<AccountToken, DomainError> {
        UserService::generate_new_verification_token(self, existing_token).await
    }

    async fn create_password_reset_token_for_user(
        &self,
        user: &User,
        token: &str,
    ) -> Result<AccountToken, DomainError> {
        UserService::create_password_reset_token_for_user(self, user, token).await
    }

    async fn reset_password_with_token(
        &self,
        token: &str,
        new_password: &str,
    ) -> Result<TokenValidation, DomainError> {
        UserService::reset_password_with_token(self, token, new_password).await
    }

    async fn change_password(&self, id: UserId, new_password: &str) -> Result<User, DomainError> {
        UserService::change_password(self, id, new_password).await
    }

    async fn check_if_valid_old_password(
        &self,
        id: UserId,
        old_password: &str,
    ) -> Result<bool, DomainError> {
        UserService::check_if_valid_old_password(self, id, old_password).await
    }
}

#[async_trait::async_trait]
impl<A, R> AnswerServiceTrait for AnswerService<A, R>
where
    A: UserAnswerRepository + 'static,
    R: UserRepository + 'static,
{
    async fn record(
        &self,
        user_id: UserId,
        request: RecordAnswer,
    ) -> Result<UserAnswer, DomainError> {
        AnswerService::record(self, user_id, request).await
    }

    async fn history(
        &self,
        user_id: UserId,
        filter: AnswerFilter,
    ) -> Result<Vec<UserAnswer>, DomainError> {
        AnswerService::history(self, user_id, filter).await
    }

    async fn all(&self, filter: AnswerFilter) -> Result<Vec<UserAnswer>, DomainError> {
        AnswerService::all(self, filter).await
    }

    async fn delete(&self, user_id: UserId, id: AnswerId) -> Result<(), DomainError> {
        AnswerService::delete(self, user_id, id).await
    }
}

#[async_trait::async_trait]
impl<R: UserRepository + 'static> UserValidatorTrait for UserValidator<R> {
    async fn validate(&self, user: Option<&User>) -> Result<(), DomainError> {
        UserValidator::validate(self, user).await
    }

    async fn access_admin_or_instructor(
        &self,
        principal: Option<&Principal>,
    ) -> Result<UserId, DomainError> {
        UserValidator::access_admin_or_instructor(self, principal).await
    }

    async fn access_any_authenticated(
        &self,
        principal: Option<&Principal>,
    ) -> Result<UserId, DomainError> {
        UserValidator::access_any_authenticated(self, principal).await
    }

    async fn access_admin_instructor_or_specific_user(
        &self,
        user_id: UserId,
        principal: Option<&Principal>,
    ) -> Result<UserId, DomainError> {
        UserValidator::access_admin_instructor_or_specific_user(self, user_id, principal).await
    }

    async fn is_admin(&self, principal: Option<&Principal>) -> Result<bool, DomainError> {
        UserValidator::is_admin(self, principal).await
    }

    async fn is_authenticated_user(
        &self,
        user_id: UserId,
        principal: Option<&Principal>,
    ) -> Result<bool, DomainError> {
        UserValidator::is_authenticated_user(self, user_id, principal).await
    }
}
