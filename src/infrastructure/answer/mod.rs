//! Answer history storage and service

mod postgres_repository;
mod repository;
mod service;

pub use postgres_repository::PostgresUserAnswerRepository;
pub use repository::InMemoryUserAnswerRepository;
pub use service::{AnswerService, RecordAnswer};
