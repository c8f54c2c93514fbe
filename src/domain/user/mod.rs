//! User domain
//!
//! This module provides domain types and traits for user accounts,
//! including the user entity, the caller principal, field validation and
//! the repository trait.

mod entity;
mod principal;
mod repository;
mod validation;

pub use entity::{NotificationPreference, NotificationType, Role, User, UserId};
pub use principal::Principal;
pub use repository::UserRepository;
pub use validation::{non_blank, validate_password, validate_username, UserValidationError};

#[cfg(test)]
pub use repository::MockUserRepository;
