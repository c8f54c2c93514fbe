//! User answer entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::user::UserId;

/// Identifier of a recorded answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerId(i64);

impl AnswerId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for AnswerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A user's answer to one question
#[derive(Debug, Clone, PartialEq)]
pub struct UserAnswer {
    id: Option<AnswerId>,
    user_id: UserId,
    question_id: i64,
    quiz_id: Option<i64>,
    event_id: Option<i64>,
    answered_at: DateTime<Utc>,
    answer_given: String,
    answered_correctly: bool,
}

impl UserAnswer {
    /// A new, unsaved answer stamped with the current time
    pub fn new(
        user_id: UserId,
        question_id: i64,
        answer_given: impl Into<String>,
        answered_correctly: bool,
    ) -> Self {
        Self {
            id: None,
            user_id,
            question_id,
            quiz_id: None,
            event_id: None,
            answered_at: Utc::now(),
            answer_given: answer_given.into(),
            answered_correctly,
        }
    }

    pub fn with_id(mut self, id: AnswerId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_quiz(mut self, quiz_id: Option<i64>) -> Self {
        self.quiz_id = quiz_id;
        self
    }

    pub fn with_event(mut self, event_id: Option<i64>) -> Self {
        self.event_id = event_id;
        self
    }

    pub fn with_answered_at(mut self, answered_at: DateTime<Utc>) -> Self {
        self.answered_at = answered_at;
        self
    }

    pub fn id(&self) -> Option<AnswerId> {
        self.id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn question_id(&self) -> i64 {
        self.question_id
    }

    pub fn quiz_id(&self) -> Option<i64> {
        self.quiz_id
    }

    pub fn event_id(&self) -> Option<i64> {
        self.event_id
    }

    pub fn answered_at(&self) -> DateTime<Utc> {
        self.answered_at
    }

    pub fn answer_given(&self) -> &str {
        &self.answer_given
    }

    pub fn answered_correctly(&self) -> bool {
        self.answered_correctly
    }
}

/// Narrows a user's answer history; unset fields match everything
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnswerFilter {
    pub question_id: Option<i64>,
    pub quiz_id: Option<i64>,
    pub event_id: Option<i64>,
}

impl AnswerFilter {
    pub fn matches(&self, answer: &UserAnswer) -> bool {
        self.question_id.is_none_or(|q| answer.question_id == q)
            && self.quiz_id.is_none_or(|q| answer.quiz_id == Some(q))
            && self.event_id.is_none_or(|e| answer.event_id == Some(e))
    }
}
