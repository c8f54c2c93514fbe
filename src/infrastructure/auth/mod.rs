//! Authentication infrastructure module
//!
//! Bearer token management for user authentication.

mod jwt;

pub use jwt::{JwtClaims, JwtConfig, JwtService};
