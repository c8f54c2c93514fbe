//! Authenticated caller identity

use serde::{Deserialize, Serialize};

use super::entity::UserId;

/// The authenticated caller
///
/// Callers are resolved by id; the username is kept for logging. Roles are
/// never carried on the principal, they come from the stored user on every
/// access check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    id: UserId,
    username: String,
}

impl Principal {
    pub fn new(id: UserId, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
        }
    }

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.username
    }
}
