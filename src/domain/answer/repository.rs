//! User answer repository trait

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use super::entity::{AnswerId, UserAnswer};
use crate::domain::user::UserId;
use crate::domain::DomainError;

/// Repository for recorded answers
///
/// List queries return answers oldest first.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserAnswerRepository: Send + Sync + std::fmt::Debug {
    async fn find_by_id(&self, id: AnswerId) -> Result<Option<UserAnswer>, DomainError>;

    async fn find_all(&self) -> Result<Vec<UserAnswer>, DomainError>;

    async fn find_by_user(&self, user_id: UserId) -> Result<Vec<UserAnswer>, DomainError>;

    async fn find_by_question(&self, question_id: i64) -> Result<Vec<UserAnswer>, DomainError>;

    async fn find_by_quiz(&self, quiz_id: i64) -> Result<Vec<UserAnswer>, DomainError>;

    async fn find_by_event(&self, event_id: i64) -> Result<Vec<UserAnswer>, DomainError>;

    /// Insert a new answer, assigning its id
    async fn save(&self, answer: UserAnswer) -> Result<UserAnswer, DomainError>;

    /// Delete an answer; returns whether one was removed
    async fn delete(&self, id: AnswerId) -> Result<bool, DomainError>;
}
