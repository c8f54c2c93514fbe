//! Account token entity

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::user::UserId;

/// Purpose of an account token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// Proves control of the account and enables it
    Verification,
    /// Authorizes a password change without the old password
    PasswordReset,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Verification => "verification",
            Self::PasswordReset => "password_reset",
        }
    }

    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "verification" => Some(Self::Verification),
            "password_reset" => Some(Self::PasswordReset),
            _ => None,
        }
    }
}

/// Outcome of presenting a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenValidation {
    Valid,
    Expired,
    Invalid,
}

impl TokenValidation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::Expired => "expired",
            Self::Invalid => "invalid",
        }
    }
}

impl std::fmt::Display for TokenValidation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One-time token owned by exactly one user
///
/// A user holds at most one token of each kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountToken {
    token: String,
    kind: TokenKind,
    user_id: UserId,
    expires_at: DateTime<Utc>,
}

impl AccountToken {
    /// Issue a token that expires `ttl` from now
    pub fn issue(kind: TokenKind, user_id: UserId, token: impl Into<String>, ttl: Duration) -> Self {
        Self::restore(kind, user_id, token, Utc::now() + ttl)
    }

    /// Rebuild a token from stored values
    pub fn restore(
        kind: TokenKind,
        user_id: UserId,
        token: impl Into<String>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            token: token.into(),
            kind,
            user_id,
            expires_at,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// A token is expired once the clock reaches its expiration
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Replace the token string, keeping owner and expiration
    pub fn rotate(&mut self) {
        self.token = Uuid::new_v4().to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_sets_future_expiry() {
        let token = AccountToken::issue(
            TokenKind::Verification,
            UserId::new(3),
            "abc",
            Duration::minutes(10),
        );

        assert_eq!(token.token(), "abc");
        assert_eq!(token.user_id(), UserId::new(3));
        assert!(!token.is_expired());
    }

    #[test]
    fn test_expiry_boundary_counts_as_expired() {
        let now = Utc::now();
        let token = AccountToken::restore(TokenKind::PasswordReset, UserId::new(1), "t", now);

        assert!(token.is_expired_at(now));
        assert!(!token.is_expired_at(now - Duration::seconds(1)));
    }

    #[test]
    fn test_rotate_keeps_expiry() {
        let mut token = AccountToken::issue(
            TokenKind::Verification,
            UserId::new(1),
            "original",
            Duration::minutes(10),
        );
        let expires_at = token.expires_at();

        token.rotate();

        assert_ne!(token.token(), "original");
        assert_eq!(token.expires_at(), expires_at);
        assert_eq!(token.kind(), TokenKind::Verification);
    }

    #[test]
    fn test_kind_storage_names() {
        for kind in [TokenKind::Verification, TokenKind::PasswordReset] {
            assert_eq!(TokenKind::from_db(kind.as_str()), Some(kind));
        }
        assert_eq!(TokenKind::from_db("session"), None);
    }

    #[test]
    fn test_validation_serializes_lowercase() {
        let json = serde_json::to_string(&TokenValidation::Expired).unwrap();
        assert_eq!(json, "\"expired\"");
    }
}
