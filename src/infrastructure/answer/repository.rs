//! In-memory user answer repository implementation

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::answer::{AnswerId, UserAnswer, UserAnswerRepository};
use crate::domain::user::UserId;
use crate::domain::DomainError;

#[derive(Debug, Default)]
struct AnswerTable {
    rows: BTreeMap<AnswerId, UserAnswer>,
    next_id: i64,
}

impl AnswerTable {
    fn select(&self, matches: impl Fn(&UserAnswer) -> bool) -> Vec<UserAnswer> {
        self.rows.values().filter(|a| matches(a)).cloned().collect()
    }
}

/// In-memory implementation of UserAnswerRepository
///
/// Ids are handed out in insertion order, so key order is answer order.
#[derive(Debug, Default)]
pub struct InMemoryUserAnswerRepository {
    table: Arc<RwLock<AnswerTable>>,
}

impl InMemoryUserAnswerRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserAnswerRepository for InMemoryUserAnswerRepository {
    async fn find_by_id(&self, id: AnswerId) -> Result<Option<UserAnswer>, DomainError> {
        let table = self.table.read().await;
        Ok(table.rows.get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<UserAnswer>, DomainError> {
        let table = self.table.read().await;
        Ok(table.select(|_| true))
    }

    async fn find_by_user(&self, user_id: UserId) -> Result<Vec<UserAnswer>, DomainError> {
        let table = self.table.read().await;
        Ok(table.select(|a| a.user_id() == user_id))
    }

    async fn find_by_question(&self, question_id: i64) -> Result<Vec<UserAnswer>, DomainError> {
        let table = self.table.read().await;
        Ok(table.select(|a| a.question_id() == question_id))
    }

    async fn find_by_quiz(&self, quiz_id: i64) -> Result<Vec<UserAnswer>, DomainError> {
        let table = self.table.read().await;
        Ok(table.select(|a| a.quiz_id() == Some(quiz_id)))
    }

    async fn find_by_event(&self, event_id: i64) -> Result<Vec<UserAnswer>, DomainError> {
        let table = self.table.read().await;
        Ok(table.select(|a| a.event_id() == Some(event_id)))
    }

    async fn save(&self, answer: UserAnswer) -> Result<UserAnswer, DomainError> {
        if let Some(id) = answer.id() {
            return Err(DomainError::conflict(format!(
                "Answer [{}] is already recorded",
                id
            )));
        }

        let mut table = self.table.write().await;
        table.next_id += 1;
        let id = AnswerId::new(table.next_id);
        let answer = answer.with_id(id);
        table.rows.insert(id, answer.clone());

        Ok(answer)
    }

    async fn delete(&self, id: AnswerId) -> Result<bool, DomainError> {
        let mut table = self.table.write().await;
        Ok(table.rows.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded() -> InMemoryUserAnswerRepository {
        let repo = InMemoryUserAnswerRepository::new();
        let answers = [
            UserAnswer::new(UserId::new(1), 10, "A", true).with_quiz(Some(5)),
            UserAnswer::new(UserId::new(1), 11, "C", false).with_event(Some(7)),
            UserAnswer::new(UserId::new(2), 10, "B", false).with_quiz(Some(5)),
        ];
        for answer in answers {
            repo.save(answer).await.unwrap();
        }
        repo
    }

    #[tokio::test]
    async fn test_save_assigns_ids() {
        let repo = seeded().await;

        let all = repo.find_all().await.unwrap();
        let ids: Vec<i64> = all.iter().filter_map(|a| a.id()).map(|id| id.value()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_saved_answer_cannot_be_saved_again() {
        let repo = seeded().await;
        let existing = repo.find_by_id(AnswerId::new(1)).await.unwrap().unwrap();

        let result = repo.save(existing).await;

        assert!(matches!(result, Err(DomainError::Conflict { .. })));
        assert_eq!(repo.find_all().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_lookups_by_owner_question_quiz_and_event() {
        let repo = seeded().await;

        assert_eq!(repo.find_by_user(UserId::new(1)).await.unwrap().len(), 2);
        assert_eq!(repo.find_by_question(10).await.unwrap().len(), 2);
        assert_eq!(repo.find_by_quiz(5).await.unwrap().len(), 2);

        let by_event = repo.find_by_event(7).await.unwrap();
        assert_eq!(by_event.len(), 1);
        assert_eq!(by_event[0].answer_given(), "C");

        assert!(repo.find_by_user(UserId::new(9)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = seeded().await;

        assert!(repo.delete(AnswerId::new(2)).await.unwrap());
        assert!(!repo.delete(AnswerId::new(2)).await.unwrap());
        assert!(repo.find_by_id(AnswerId::new(2)).await.unwrap().is_none());
    }
}
