//! Breach-password lookup implementations

mod pwned;

pub use pwned::PwnedPasswordsClient;
