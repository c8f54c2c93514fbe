//! User repository trait

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use super::entity::{User, UserId};
use crate::domain::DomainError;

/// Repository trait for user storage
///
/// Username, email and Slack lookups ignore ASCII case; SMS numbers match exactly.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserRepository: Send + Sync + std::fmt::Debug {
    /// Get a user by ID, password hash included
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, DomainError>;

    /// Get a user by username
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError>;

    /// Get a user by email address
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;

    /// Get a user by SMS number
    async fn find_by_sms(&self, sms: &str) -> Result<Option<User>, DomainError>;

    /// Get a user by Slack name
    async fn find_by_slack(&self, slack: &str) -> Result<Option<User>, DomainError>;

    /// Insert a user without an ID (one is assigned) or overwrite an existing one
    async fn save(&self, user: User) -> Result<User, DomainError>;

    /// List all users ordered by ID
    async fn find_all(&self) -> Result<Vec<User>, DomainError>;

    /// Count stored users
    async fn count(&self) -> Result<usize, DomainError>;
}
