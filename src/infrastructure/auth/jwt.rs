//! JWT token generation, validation and revocation

use std::collections::HashMap;
use std::fmt::Debug;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::user::{Principal, UserId};
use crate::domain::DomainError;

/// JWT claims structure
///
/// The subject is the stable user id; the username is informational only,
/// since usernames can change while a token is live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject (user id)
    pub sub: UserId,
    /// Username at issue time
    pub username: String,
    /// Token id, used for revocation
    pub jti: String,
    /// Issued at timestamp (Unix epoch)
    pub iat: i64,
    /// Expiration timestamp (Unix epoch)
    pub exp: i64,
}

impl JwtClaims {
    pub fn new(user_id: UserId, username: &str, expiration_hours: u64) -> Self {
        let now = Utc::now();
        let exp = now + Duration::hours(expiration_hours as i64);

        Self {
            sub: user_id,
            username: username.to_string(),
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }

    pub fn principal(&self) -> Principal {
        Principal::new(self.sub, &self.username)
    }
}

/// Configuration for JWT service
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiration_hours: u64,
}

impl JwtConfig {
    pub fn new(secret: impl Into<String>, expiration_hours: u64) -> Self {
        Self {
            secret: secret.into(),
            expiration_hours,
        }
    }
}

/// HMAC-signed bearer tokens with an in-process revocation list
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    /// Revoked token ids and their expiry
    revoked: RwLock<HashMap<String, i64>>,
}

impl Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("expiration_hours", &self.config.expiration_hours)
            .field("secret", &"[hidden]")
            .finish()
    }
}

impl JwtService {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
            revoked: RwLock::new(HashMap::new()),
        }
    }

    pub fn expiration_hours(&self) -> u64 {
        self.config.expiration_hours
    }

    /// Issue a token for the user `user_id`
    pub fn generate(&self, user_id: UserId, username: &str) -> Result<String, DomainError> {
        let claims = JwtClaims::new(user_id, username, self.config.expiration_hours);

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| DomainError::internal(format!("Failed to generate JWT: {}", e)))
    }

    /// Decode and verify a token; revoked tokens are rejected
    pub async fn validate(&self, token: &str) -> Result<JwtClaims, DomainError> {
        let claims = decode::<JwtClaims>(token, &self.decoding_key, &Validation::default())
            .map_err(|e| DomainError::access_denied(format!("Invalid JWT: {}", e)))?
            .claims;

        if self.revoked.read().await.contains_key(&claims.jti) {
            return Err(DomainError::access_denied("Token has been revoked"));
        }

        Ok(claims)
    }

    /// Revoke a token until its natural expiry
    pub async fn revoke(&self, claims: &JwtClaims) {
        let now = Utc::now().timestamp();
        let mut revoked = self.revoked.write().await;
        revoked.retain(|_, exp| *exp > now);
        revoked.insert(claims.jti.clone(), claims.exp);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_service() -> JwtService {
        JwtService::new(JwtConfig::new("test-secret-key-12345", 24))
    }

    #[tokio::test]
    async fn test_generate_and_validate() {
        let service = create_service();

        let token = service.generate(UserId::new(42), "testuser").unwrap();
        let claims = service.validate(&token).await.unwrap();

        assert_eq!(claims.sub, UserId::new(42));
        assert_eq!(claims.principal().id(), UserId::new(42));
        assert_eq!(claims.principal().name(), "testuser");
        assert!(!claims.is_expired());
    }

    #[tokio::test]
    async fn test_invalid_token() {
        let service = create_service();
        assert!(service.validate("invalid-token").await.is_err());
    }

    #[tokio::test]
    async fn test_wrong_secret() {
        let service1 = JwtService::new(JwtConfig::new("secret-1", 24));
        let service2 = JwtService::new(JwtConfig::new("secret-2", 24));

        let token = service1.generate(UserId::new(1), "testuser").unwrap();
        assert!(service2.validate(&token).await.is_err());
    }

    #[tokio::test]
    async fn test_expired_token() {
        let service = JwtService::new(JwtConfig::new("test-secret", 24));

        let past_time = Utc::now() - Duration::hours(1);
        let claims = JwtClaims {
            sub: UserId::new(1),
            username: "testuser".to_string(),
            jti: "expired".to_string(),
            iat: (past_time - Duration::hours(2)).timestamp(),
            exp: past_time.timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        assert!(service.validate(&token).await.is_err());
    }

    #[tokio::test]
    async fn test_revoked_token_is_rejected() {
        let service = create_service();
        let token = service.generate(UserId::new(1), "testuser").unwrap();
        let other = service.generate(UserId::new(1), "testuser").unwrap();

        let claims = service.validate(&token).await.unwrap();
        service.revoke(&claims).await;

        let result = service.validate(&token).await;
        assert!(matches!(result, Err(DomainError::AccessDenied { .. })));
        assert!(service.validate(&other).await.is_ok());
    }

    #[tokio::test]
    async fn test_subject_is_serialized_as_user_id() {
        let service = create_service();
        let token = service.generate(UserId::new(7), "pilot").unwrap();

        let claims = service.validate(&token).await.unwrap();
        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["sub"], 7);
        assert_eq!(json["username"], "pilot");
    }

    #[test]
    fn test_expiration_hours() {
        let service = JwtService::new(JwtConfig::new("secret", 48));
        assert_eq!(service.expiration_hours(), 48);
    }
}
