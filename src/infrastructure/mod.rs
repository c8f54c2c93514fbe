//! Infrastructure layer - Storage, hashing, tokens and outbound clients

pub mod answer;
pub mod auth;
pub mod breach;
pub mod logging;
pub mod storage;
pub mod token;
pub mod user;
