//! Token storage implementations

mod postgres_repository;
mod repository;

pub use postgres_repository::PostgresTokenRepository;
pub use repository::InMemoryTokenRepository;
