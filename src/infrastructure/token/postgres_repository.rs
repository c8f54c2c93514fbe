//! PostgreSQL token repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use crate::domain::token::{AccountToken, TokenKind, TokenRepository};
use crate::domain::user::UserId;
use crate::domain::DomainError;

/// PostgreSQL implementation of TokenRepository
#[derive(Debug, Clone)]
pub struct PostgresTokenRepository {
    pool: PgPool,
}

impl PostgresTokenRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TokenRepository for PostgresTokenRepository {
    async fn find(&self, kind: TokenKind, token: &str) -> Result<Option<AccountToken>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT token, kind, user_id, expires_at
            FROM account_tokens
            WHERE kind = $1 AND token = $2
            "#,
        )
        .bind(kind.as_str())
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get token: {}", e)))?;

        row.as_ref().map(row_to_token).transpose()
    }

    async fn save(&self, token: AccountToken) -> Result<AccountToken, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO account_tokens (token, kind, user_id, expires_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (kind, user_id)
            DO UPDATE SET token = EXCLUDED.token, expires_at = EXCLUDED.expires_at
            "#,
        )
        .bind(token.token())
        .bind(token.kind().as_str())
        .bind(token.user_id().value())
        .bind(token.expires_at())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to save token: {}", e)))?;

        Ok(token)
    }

    async fn delete(&self, kind: TokenKind, token: &str) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM account_tokens WHERE kind = $1 AND token = $2")
            .bind(kind.as_str())
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete token: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_token(row: &sqlx::postgres::PgRow) -> Result<AccountToken, DomainError> {
    let token: String = row.get("token");
    let kind: String = row.get("kind");
    let user_id: i64 = row.get("user_id");
    let expires_at: DateTime<Utc> = row.get("expires_at");

    let kind = TokenKind::from_db(&kind)
        .ok_or_else(|| DomainError::storage(format!("Invalid token kind in database: {}", kind)))?;

    Ok(AccountToken::restore(kind, UserId::new(user_id), token, expires_at))
}
