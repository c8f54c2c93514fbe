//! In-memory user repository implementation

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::user::{User, UserId, UserRepository};
use crate::domain::DomainError;

#[derive(Debug, Default)]
struct UserTable {
    rows: BTreeMap<UserId, User>,
    next_id: i64,
}

impl UserTable {
    fn find_by(&self, matches: impl Fn(&User) -> bool) -> Option<User> {
        self.rows.values().find(|u| matches(u)).cloned()
    }
}

/// In-memory implementation of UserRepository
///
/// Mirrors the database's unique username index; the other contact fields are
/// kept unique by the validator only.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    table: Arc<RwLock<UserTable>>,
}

impl InMemoryUserRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self::default()
    }
}

fn eq_ignore_case(stored: Option<&str>, wanted: &str) -> bool {
    stored.is_some_and(|s| s.eq_ignore_ascii_case(wanted))
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, DomainError> {
        let table = self.table.read().await;
        Ok(table.rows.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        let table = self.table.read().await;
        Ok(table.find_by(|u| eq_ignore_case(u.username(), username)))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let table = self.table.read().await;
        Ok(table.find_by(|u| eq_ignore_case(u.email(), email)))
    }

    async fn find_by_sms(&self, sms: &str) -> Result<Option<User>, DomainError> {
        let table = self.table.read().await;
        Ok(table.find_by(|u| u.sms() == Some(sms)))
    }

    async fn find_by_slack(&self, slack: &str) -> Result<Option<User>, DomainError> {
        let table = self.table.read().await;
        Ok(table.find_by(|u| eq_ignore_case(u.slack(), slack)))
    }

    async fn save(&self, mut user: User) -> Result<User, DomainError> {
        let username = user
            .username()
            .ok_or_else(|| DomainError::invalid_payload("Username is a required value"))?
            .to_string();

        let mut table = self.table.write().await;

        let username_taken = table
            .rows
            .values()
            .any(|u| eq_ignore_case(u.username(), &username) && u.id() != user.id());

        if username_taken {
            return Err(DomainError::conflict(format!(
                "Username '{}' already exists",
                username
            )));
        }

        let id = match user.id() {
            Some(id) => {
                if !table.rows.contains_key(&id) {
                    return Err(DomainError::not_found(format!("No user found for ID [{}]", id)));
                }
                id
            }
            None => {
                table.next_id += 1;
                let id = UserId::new(table.next_id);
                user.set_id(Some(id));
                id
            }
        };

        table.rows.insert(id, user.clone());
        Ok(user)
    }

    async fn find_all(&self) -> Result<Vec<User>, DomainError> {
        let table = self.table.read().await;
        Ok(table.rows.values().cloned().collect())
    }

    async fn count(&self) -> Result<usize, DomainError> {
        let table = self.table.read().await;
        Ok(table.rows.len())
    }
}
