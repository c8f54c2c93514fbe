//! Answer history domain
//!
//! One [`UserAnswer`] per question a user answered, optionally tied to the
//! quiz or event it was asked in. Rows are removed with their user.

mod entity;
mod repository;

pub use entity::{AnswerFilter, AnswerId, UserAnswer};
pub use repository::UserAnswerRepository;

#[cfg(test)]
pub use repository::MockUserAnswerRepository;
