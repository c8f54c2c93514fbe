//! In-memory token repository implementation

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::token::{AccountToken, TokenKind, TokenRepository};
use crate::domain::user::UserId;
use crate::domain::DomainError;

/// In-memory implementation of TokenRepository, keyed by owner and kind
#[derive(Debug, Default)]
pub struct InMemoryTokenRepository {
    tokens: Arc<RwLock<HashMap<(TokenKind, UserId), AccountToken>>>,
}

impl InMemoryTokenRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenRepository for InMemoryTokenRepository {
    async fn find(&self, kind: TokenKind, token: &str) -> Result<Option<AccountToken>, DomainError> {
        let tokens = self.tokens.read().await;
        Ok(tokens
            .values()
            .find(|t| t.kind() == kind && t.token() == token)
            .cloned())
    }

    async fn save(&self, token: AccountToken) -> Result<AccountToken, DomainError> {
        let mut tokens = self.tokens.write().await;
        tokens.insert((token.kind(), token.user_id()), token.clone());
        Ok(token)
    }

    async fn delete(&self, kind: TokenKind, token: &str) -> Result<bool, DomainError> {
        let mut tokens = self.tokens.write().await;
        let key = tokens
            .iter()
            .find(|(_, t)| t.kind() == kind && t.token() == token)
            .map(|(key, _)| *key);

        Ok(key.and_then(|k| tokens.remove(&k)).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn token(kind: TokenKind, user: i64, value: &str) -> AccountToken {
        AccountToken::issue(kind, UserId::new(user), value, Duration::minutes(10))
    }

    #[tokio::test]
    async fn test_save_and_find() {
        let repo = InMemoryTokenRepository::new();
        repo.save(token(TokenKind::Verification, 1, "abc"))
            .await
            .unwrap();

        let found = repo.find(TokenKind::Verification, "abc").await.unwrap();
        assert_eq!(found.unwrap().user_id(), UserId::new(1));

        let wrong_kind = repo.find(TokenKind::PasswordReset, "abc").await.unwrap();
        assert!(wrong_kind.is_none());
    }

    #[tokio::test]
    async fn test_new_token_replaces_previous_of_same_kind() {
        let repo = InMemoryTokenRepository::new();
        repo.save(token(TokenKind::Verification, 1, "old"))
            .await
            .unwrap();
        repo.save(token(TokenKind::Verification, 1, "new"))
            .await
            .unwrap();
        repo.save(token(TokenKind::PasswordReset, 1, "reset"))
            .await
            .unwrap();

        assert!(repo.find(TokenKind::Verification, "old").await.unwrap().is_none());
        assert!(repo.find(TokenKind::Verification, "new").await.unwrap().is_some());
        assert!(repo.find(TokenKind::PasswordReset, "reset").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = InMemoryTokenRepository::new();
        repo.save(token(TokenKind::PasswordReset, 2, "xyz"))
            .await
            .unwrap();

        assert!(repo.delete(TokenKind::PasswordReset, "xyz").await.unwrap());
        assert!(!repo.delete(TokenKind::PasswordReset, "xyz").await.unwrap());
        assert!(repo.find(TokenKind::PasswordReset, "xyz").await.unwrap().is_none());
    }
}
