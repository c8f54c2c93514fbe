//! Account token domain
//!
//! Verification and password-reset tokens share one entity, told apart by
//! [`TokenKind`]. A token moves from issued to either consumed (valid) or
//! deleted (expired); rotation swaps the string but keeps it issued.

mod entity;
mod repository;

pub use entity::{AccountToken, TokenKind, TokenValidation};
pub use repository::TokenRepository;

#[cfg(test)]
pub use repository::MockTokenRepository;
