//! User field validation utilities

use thiserror::Error;

/// Errors that can occur during user field validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum UserValidationError {
    #[error("No user information was provided")]
    MissingUser,

    #[error("Username is a required value")]
    MissingUsername,

    #[error("Password is a required value")]
    MissingPassword,

    #[error("Unknown role: '{0}'")]
    UnknownRole(String),

    #[error("Unknown notification preference: '{0}'")]
    UnknownNotificationPreference(String),

    #[error("Unknown notification type: '{0}'. Expected one of: email, sms, slack")]
    UnknownNotificationType(String),
}

/// Treat blank contact values the same as absent ones
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Require a username on a user payload
pub fn validate_username(username: Option<&str>) -> Result<&str, UserValidationError> {
    username.ok_or(UserValidationError::MissingUsername)
}

/// Require a non-empty plaintext password
pub fn validate_password(password: Option<&str>) -> Result<&str, UserValidationError> {
    non_blank(password).ok_or(UserValidationError::MissingPassword)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("a")), Some("a"));
        assert_eq!(non_blank(Some("")), None);
        assert_eq!(non_blank(None), None);
    }

    #[test]
    fn test_validate_username() {
        assert_eq!(validate_username(Some("jdoe")), Ok("jdoe"));
        assert_eq!(
            validate_username(None),
            Err(UserValidationError::MissingUsername)
        );
    }

    #[test]
    fn test_validate_password() {
        assert_eq!(validate_password(Some("secret")), Ok("secret"));
        assert_eq!(
            validate_password(Some("")),
            Err(UserValidationError::MissingPassword)
        );
        assert_eq!(
            validate_password(None),
            Err(UserValidationError::MissingPassword)
        );
    }
}
