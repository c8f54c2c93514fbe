//! Compromised-password lookup

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use crate::domain::DomainError;

/// Number of leading hash characters sent to the range API
pub const HASH_PREFIX_LEN: usize = 5;

/// Looks up how often a password appears in a breach corpus
#[cfg_attr(test, automock)]
#[async_trait]
pub trait BreachChecker: Send + Sync + std::fmt::Debug {
    /// Occurrence count for a hex SHA-1 password hash, 0 when not found
    async fn occurrences(&self, sha1_hash: &str) -> Result<u64, DomainError>;
}

/// Find the count for `sha1_hash` in a newline-delimited `SUFFIX:COUNT` range body
pub fn count_in_range(sha1_hash: &str, prefix: &str, body: &str) -> u64 {
    body.lines()
        .filter_map(|row| row.split_once(':'))
        .find(|(suffix, _)| {
            let candidate = format!("{}{}", prefix, suffix.trim());
            candidate.eq_ignore_ascii_case(sha1_hash)
        })
        .and_then(|(_, count)| count.trim().parse().ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HASH: &str = "5BAA61E4C9B93F3F0682250B6CF8331B7EE68FD8";

    #[test]
    fn test_count_in_range_finds_suffix() {
        let body = "0018A45C4D1DEF81644B54AB7F969B88D65:1\r\n\
                    1E4C9B93F3F0682250B6CF8331B7EE68FD8:3861493\r\n\
                    011053FD0102E94D6AE2F8B83D76FAF94F6:1";

        assert_eq!(count_in_range(HASH, "5BAA6", body), 3_861_493);
    }

    #[test]
    fn test_count_in_range_is_case_insensitive() {
        let body = "1e4c9b93f3f0682250b6cf8331b7ee68fd8:3";
        assert_eq!(count_in_range(HASH, "5baa6", body), 3);
    }

    #[test]
    fn test_count_in_range_no_match() {
        let body = "0018A45C4D1DEF81644B54AB7F969B88D65:1";
        assert_eq!(count_in_range(HASH, "5BAA6", body), 0);
    }

    #[test]
    fn test_count_in_range_ignores_malformed_rows() {
        assert_eq!(count_in_range(HASH, "5BAA6", "garbage\n\n:"), 0);
        assert_eq!(count_in_range(HASH, "5BAA6", ""), 0);
    }
}
