//! Domain layer - Core business logic and entities

pub mod answer;
pub mod breach;
pub mod error;
pub mod token;
pub mod user;

pub use error::DomainError;
