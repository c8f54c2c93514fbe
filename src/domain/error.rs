use thiserror::Error;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Invalid payload: {message}")]
    InvalidPayload { message: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Access denied: {message}")]
    AccessDenied { message: String },

    #[error("External service error: {service} - {message}")]
    External { service: String, message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn invalid_payload(message: impl Into<String>) -> Self {
        Self::InvalidPayload {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn access_denied(message: impl Into<String>) -> Self {
        Self::AccessDenied {
            message: message.into(),
        }
    }

    pub fn external(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::External {
            service: service.into(),
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// True for the two failures the `is_*` access helpers fold into `false`
    pub fn is_access_failure(&self) -> bool {
        matches!(self, Self::AccessDenied { .. } | Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_error() {
        let error = DomainError::not_found("No user found for ID [7]");
        assert_eq!(error.to_string(), "Not found: No user found for ID [7]");
    }

    #[test]
    fn test_invalid_payload_error() {
        let error = DomainError::invalid_payload("Username is a required value");
        assert_eq!(
            error.to_string(),
            "Invalid payload: Username is a required value"
        );
    }

    #[test]
    fn test_conflict_error() {
        let error = DomainError::conflict("username [jdoe] already taken");
        assert_eq!(error.to_string(), "Conflict: username [jdoe] already taken");
    }

    #[test]
    fn test_access_failure_classification() {
        assert!(DomainError::access_denied("nope").is_access_failure());
        assert!(DomainError::not_found("gone").is_access_failure());
        assert!(!DomainError::conflict("dup").is_access_failure());
        assert!(!DomainError::storage("db down").is_access_failure());
    }
}
