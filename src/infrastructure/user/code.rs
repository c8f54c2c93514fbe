//! One-time codes, token strings and password digests

use rand::Rng;
use sha1::{Digest, Sha1};
use uuid::Uuid;

/// Upper-case hex SHA-1 of a plaintext password, as the range API expects
pub fn sha1_hash(password: &str) -> String {
    let digest = Sha1::digest(password.as_bytes());
    hex::encode_upper(digest)
}

/// Numeric one-time code of `length` digits
pub fn generate_code(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

/// Fresh random token string
pub fn generate_token() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha1_hash_known_value() {
        assert_eq!(
            sha1_hash("password"),
            "5BAA61E4C9B93F3F0682250B6CF8331B7EE68FD8"
        );
    }

    #[test]
    fn test_generate_code_is_numeric() {
        let code = generate_code(4);
        assert_eq!(code.len(), 4);
        assert!(code.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_generate_token_is_unique() {
        assert_ne!(generate_token(), generate_token());
    }
}
