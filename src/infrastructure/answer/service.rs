//! Answer history service

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::answer::{AnswerFilter, AnswerId, UserAnswer, UserAnswerRepository};
use crate::domain::user::{UserId, UserRepository};
use crate::domain::DomainError;

/// Input for recording an answer
#[derive(Debug, Clone, Default)]
pub struct RecordAnswer {
    pub question_id: i64,
    pub quiz_id: Option<i64>,
    pub event_id: Option<i64>,
    pub answer_given: String,
    pub answered_correctly: bool,
}

/// Records and reads users' answer history
#[derive(Debug)]
pub struct AnswerService<A: UserAnswerRepository, R: UserRepository> {
    answers: Arc<A>,
    users: Arc<R>,
}

impl<A: UserAnswerRepository, R: UserRepository> AnswerService<A, R> {
    pub fn new(answers: Arc<A>, users: Arc<R>) -> Self {
        Self { answers, users }
    }

    /// Record an answer for an existing user
    pub async fn record(
        &self,
        user_id: UserId,
        request: RecordAnswer,
    ) -> Result<UserAnswer, DomainError> {
        if request.answer_given.trim().is_empty() {
            return Err(DomainError::invalid_payload("Answer given is a required value"));
        }

        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("No user found for ID [{}]", user_id)))?;

        let answer = UserAnswer::new(
            user_id,
            request.question_id,
            request.answer_given,
            request.answered_correctly,
        )
        .with_quiz(request.quiz_id)
        .with_event(request.event_id);

        let saved = self.answers.save(answer).await?;
        info!(
            user_id = %user_id,
            question_id = saved.question_id(),
            correct = saved.answered_correctly(),
            "Answer recorded"
        );

        Ok(saved)
    }

    /// A user's answers, narrowed by `filter`
    pub async fn history(
        &self,
        user_id: UserId,
        filter: AnswerFilter,
    ) -> Result<Vec<UserAnswer>, DomainError> {
        let mut answers = self.select(filter, Some(user_id)).await?;
        answers.retain(|a| a.user_id() == user_id);
        Ok(answers)
    }

    /// Answers across all users, narrowed by `filter`
    pub async fn all(&self, filter: AnswerFilter) -> Result<Vec<UserAnswer>, DomainError> {
        self.select(filter, None).await
    }

    /// Delete one of a user's answers
    ///
    /// An answer owned by someone else is reported as missing.
    pub async fn delete(&self, user_id: UserId, id: AnswerId) -> Result<(), DomainError> {
        let owned = self
            .answers
            .find_by_id(id)
            .await?
            .is_some_and(|a| a.user_id() == user_id);

        if !owned || !self.answers.delete(id).await? {
            return Err(DomainError::not_found(format!(
                "No answer found for ID [{}]",
                id
            )));
        }

        debug!(user_id = %user_id, answer_id = %id, "Answer deleted");
        Ok(())
    }

    /// Run the narrowest repository query the filter allows, then apply the rest
    async fn select(
        &self,
        filter: AnswerFilter,
        user_id: Option<UserId>,
    ) -> Result<Vec<UserAnswer>, DomainError> {
        let mut answers = match (filter.question_id, filter.quiz_id, filter.event_id, user_id) {
            (Some(question), _, _, _) => self.answers.find_by_question(question).await?,
            (None, Some(quiz), _, _) => self.answers.find_by_quiz(quiz).await?,
            (None, None, Some(event), _) => self.answers.find_by_event(event).await?,
            (None, None, None, Some(user)) => self.answers.find_by_user(user).await?,
            (None, None, None, None) => self.answers.find_all().await?,
        };

        answers.retain(|a| filter.matches(a));
        Ok(answers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::answer::MockUserAnswerRepository;
    use crate::domain::user::User;
    use crate::infrastructure::answer::InMemoryUserAnswerRepository;
    use crate::infrastructure::user::InMemoryUserRepository;

    type Service = AnswerService<InMemoryUserAnswerRepository, InMemoryUserRepository>;

    async fn service_with_users() -> (Service, UserId, UserId) {
        let users = Arc::new(InMemoryUserRepository::new());
        let alice = users.save(User::new("alice")).await.unwrap();
        let bob = users.save(User::new("bob")).await.unwrap();
        let service = AnswerService::new(Arc::new(InMemoryUserAnswerRepository::new()), users);

        (service, alice.id().unwrap(), bob.id().unwrap())
    }

    fn answer(question_id: i64, quiz_id: Option<i64>, given: &str) -> RecordAnswer {
        RecordAnswer {
            question_id,
            quiz_id,
            event_id: None,
            answer_given: given.to_string(),
            answered_correctly: given == "A",
        }
    }

    #[tokio::test]
    async fn test_record_and_read_history() {
        let (service, alice, bob) = service_with_users().await;
        service.record(alice, answer(1, Some(9), "A")).await.unwrap();
        service.record(alice, answer(2, None, "C")).await.unwrap();
        service.record(bob, answer(1, Some(9), "B")).await.unwrap();

        let history = service.history(alice, AnswerFilter::default()).await.unwrap();
        assert_eq!(history.len(), 2);
        assert!(history.iter().all(|a| a.user_id() == alice));
        assert!(history[0].answered_correctly());
        assert!(!history[1].answered_correctly());
    }

    #[tokio::test]
    async fn test_history_filter_stays_within_user() {
        let (service, alice, bob) = service_with_users().await;
        service.record(alice, answer(1, Some(9), "A")).await.unwrap();
        service.record(bob, answer(1, Some(9), "B")).await.unwrap();

        let by_quiz = AnswerFilter {
            quiz_id: Some(9),
            ..Default::default()
        };
        let history = service.history(bob, by_quiz).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].answer_given(), "B");

        let everyone = service.all(by_quiz).await.unwrap();
        assert_eq!(everyone.len(), 2);
    }

    #[tokio::test]
    async fn test_record_for_unknown_user() {
        let (service, _, _) = service_with_users().await;

        let result = service.record(UserId::new(99), answer(1, None, "A")).await;

        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_record_requires_answer_text() {
        let (service, alice, _) = service_with_users().await;

        let result = service.record(alice, answer(1, None, "  ")).await;

        assert!(matches!(result, Err(DomainError::InvalidPayload { .. })));
    }

    #[tokio::test]
    async fn test_delete_only_own_answer() {
        let (service, alice, bob) = service_with_users().await;
        let recorded = service.record(alice, answer(1, None, "A")).await.unwrap();
        let id = recorded.id().unwrap();

        let foreign = service.delete(bob, id).await;
        assert!(matches!(foreign, Err(DomainError::NotFound { .. })));

        service.delete(alice, id).await.unwrap();
        assert!(service
            .history(alice, AnswerFilter::default())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_storage_error_is_propagated() {
        let mut answers = MockUserAnswerRepository::new();
        answers
            .expect_find_by_user()
            .returning(|_| Err(DomainError::storage("connection refused")));
        let service = AnswerService::new(Arc::new(answers), Arc::new(InMemoryUserRepository::new()));

        let result = service.history(UserId::new(1), AnswerFilter::default()).await;

        assert!(matches!(result, Err(DomainError::Storage { .. })));
    }
}
