//! User infrastructure module
//!
//! Password hashing, the in-memory and PostgreSQL user stores, the user
//! service and the validator that guards it.

mod code;
mod password;
mod postgres_repository;
mod repository;
mod service;
mod validator;

pub use code::{generate_code, generate_token, sha1_hash};
pub use password::{Argon2Hasher, BcryptHasher, DelegatingHasher, PasswordAlgorithm, PasswordHasher};
pub use postgres_repository::PostgresUserRepository;
pub use repository::InMemoryUserRepository;
pub use service::{RegistrationRequest, TokenSettings, UserService};
pub use validator::UserValidator;
