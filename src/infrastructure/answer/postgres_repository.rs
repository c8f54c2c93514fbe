//! PostgreSQL user answer repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use crate::domain::answer::{AnswerId, UserAnswer, UserAnswerRepository};
use crate::domain::user::UserId;
use crate::domain::DomainError;

const SELECT_ANSWERS: &str = r#"
    SELECT id, user_id, question_id, quiz_id, event_id, answered_at, answer_given, answered_correctly
    FROM user_answers
"#;

/// PostgreSQL implementation of UserAnswerRepository
#[derive(Debug, Clone)]
pub struct PostgresUserAnswerRepository {
    pool: PgPool,
}

impl PostgresUserAnswerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_where(&self, column: &str, value: i64) -> Result<Vec<UserAnswer>, DomainError> {
        let sql = format!("{} WHERE {} = $1 ORDER BY id", SELECT_ANSWERS, column);

        let rows = sqlx::query(&sql)
            .bind(value)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to list answers: {}", e)))?;

        Ok(rows.iter().map(row_to_answer).collect())
    }
}

#[async_trait]
impl UserAnswerRepository for PostgresUserAnswerRepository {
    async fn find_by_id(&self, id: AnswerId) -> Result<Option<UserAnswer>, DomainError> {
        let sql = format!("{} WHERE id = $1", SELECT_ANSWERS);

        let row = sqlx::query(&sql)
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get answer: {}", e)))?;

        Ok(row.as_ref().map(row_to_answer))
    }

    async fn find_all(&self) -> Result<Vec<UserAnswer>, DomainError> {
        let sql = format!("{} ORDER BY id", SELECT_ANSWERS);

        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to list answers: {}", e)))?;

        Ok(rows.iter().map(row_to_answer).collect())
    }

    async fn find_by_user(&self, user_id: UserId) -> Result<Vec<UserAnswer>, DomainError> {
        self.fetch_where("user_id", user_id.value()).await
    }

    async fn find_by_question(&self, question_id: i64) -> Result<Vec<UserAnswer>, DomainError> {
        self.fetch_where("question_id", question_id).await
    }

    async fn find_by_quiz(&self, quiz_id: i64) -> Result<Vec<UserAnswer>, DomainError> {
        self.fetch_where("quiz_id", quiz_id).await
    }

    async fn find_by_event(&self, event_id: i64) -> Result<Vec<UserAnswer>, DomainError> {
        self.fetch_where("event_id", event_id).await
    }

    async fn save(&self, answer: UserAnswer) -> Result<UserAnswer, DomainError> {
        if let Some(id) = answer.id() {
            return Err(DomainError::conflict(format!(
                "Answer [{}] is already recorded",
                id
            )));
        }

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO user_answers
                (user_id, question_id, quiz_id, event_id, answered_at, answer_given, answered_correctly)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(answer.user_id().value())
        .bind(answer.question_id())
        .bind(answer.quiz_id())
        .bind(answer.event_id())
        .bind(answer.answered_at())
        .bind(answer.answer_given())
        .bind(answer.answered_correctly())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if e.to_string().contains("foreign key") {
                DomainError::not_found(format!("No user found for ID [{}]", answer.user_id()))
            } else {
                DomainError::storage(format!("Failed to save answer: {}", e))
            }
        })?;

        Ok(answer.with_id(AnswerId::new(id)))
    }

    async fn delete(&self, id: AnswerId) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM user_answers WHERE id = $1")
            .bind(id.value())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete answer: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_answer(row: &sqlx::postgres::PgRow) -> UserAnswer {
    let id: i64 = row.get("id");
    let user_id: i64 = row.get("user_id");
    let question_id: i64 = row.get("question_id");
    let answer_given: String = row.get("answer_given");
    let answered_correctly: bool = row.get("answered_correctly");
    let answered_at: DateTime<Utc> = row.get("answered_at");

    UserAnswer::new(UserId::new(user_id), question_id, answer_given, answered_correctly)
        .with_id(AnswerId::new(id))
        .with_quiz(row.get("quiz_id"))
        .with_event(row.get("event_id"))
        .with_answered_at(answered_at)
}
