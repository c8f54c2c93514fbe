//! Account token repository trait

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use super::entity::{AccountToken, TokenKind};
use crate::domain::DomainError;

/// Repository for verification and password-reset tokens
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TokenRepository: Send + Sync + std::fmt::Debug {
    /// Find a token of the given kind by its string
    async fn find(&self, kind: TokenKind, token: &str) -> Result<Option<AccountToken>, DomainError>;

    /// Store a token, replacing any token of the same kind held by the same user
    async fn save(&self, token: AccountToken) -> Result<AccountToken, DomainError>;

    /// Delete a token; returns whether one was removed
    async fn delete(&self, kind: TokenKind, token: &str) -> Result<bool, DomainError>;
}
