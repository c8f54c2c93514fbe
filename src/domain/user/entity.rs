//! User entity and related types

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::validation::UserValidationError;

/// Suffix of a certificate number held by flight instructors
const INSTRUCTOR_CERTIFICATE_SUFFIX: &str = "CFI";

/// User identifier assigned by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Role of a user account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Student,
    Instructor,
    Admin,
}

impl Role {
    /// Role implied by a certificate number: instructors hold a `...CFI` certificate
    pub fn from_certificate_number(certificate_number: Option<&str>) -> Self {
        match certificate_number {
            Some(number) if number.ends_with(INSTRUCTOR_CERTIFICATE_SUFFIX) => Self::Instructor,
            _ => Self::Student,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Instructor => "instructor",
            Self::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "student" => Ok(Self::Student),
            "instructor" => Ok(Self::Instructor),
            "admin" => Ok(Self::Admin),
            _ => Err(UserValidationError::UnknownRole(s.to_string())),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Channel a user prefers to be notified on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationPreference {
    #[default]
    Web,
    Email,
    Sms,
    Slack,
}

impl NotificationPreference {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Web => "web",
            Self::Email => "email",
            Self::Sms => "sms",
            Self::Slack => "slack",
        }
    }
}

impl FromStr for NotificationPreference {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "web" => Ok(Self::Web),
            "email" => Ok(Self::Email),
            "sms" => Ok(Self::Sms),
            "slack" => Ok(Self::Slack),
            _ => Err(UserValidationError::UnknownNotificationPreference(
                s.to_string(),
            )),
        }
    }
}

/// Contact channel that can be verified through a one-time link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationType {
    Email,
    Sms,
    Slack,
}

impl FromStr for NotificationType {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "email" => Ok(Self::Email),
            "sms" => Ok(Self::Sms),
            "slack" => Ok(Self::Slack),
            _ => Err(UserValidationError::UnknownNotificationType(s.to_string())),
        }
    }
}

/// User account
///
/// `password` holds the hash while the record travels between the service and
/// the store; it is never serialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    id: Option<UserId>,
    username: Option<String>,
    #[serde(skip_serializing)]
    password: Option<String>,
    email: Option<String>,
    email_verified: bool,
    email_enabled: bool,
    sms: Option<String>,
    sms_verified: bool,
    sms_enabled: bool,
    slack: Option<String>,
    slack_verified: bool,
    slack_enabled: bool,
    first_name: Option<String>,
    last_name: Option<String>,
    certificate_number: Option<String>,
    code: Option<String>,
    role: Option<Role>,
    notification_preference: NotificationPreference,
    enabled: bool,
}

impl User {
    /// Create a new, not yet stored user
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            ..Default::default()
        }
    }

    // Getters

    pub fn id(&self) -> Option<UserId> {
        self.id
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn email_verified(&self) -> bool {
        self.email_verified
    }

    pub fn email_enabled(&self) -> bool {
        self.email_enabled
    }

    pub fn sms(&self) -> Option<&str> {
        self.sms.as_deref()
    }

    pub fn sms_verified(&self) -> bool {
        self.sms_verified
    }

    pub fn sms_enabled(&self) -> bool {
        self.sms_enabled
    }

    pub fn slack(&self) -> Option<&str> {
        self.slack.as_deref()
    }

    pub fn slack_verified(&self) -> bool {
        self.slack_verified
    }

    pub fn slack_enabled(&self) -> bool {
        self.slack_enabled
    }

    pub fn first_name(&self) -> Option<&str> {
        self.first_name.as_deref()
    }

    pub fn last_name(&self) -> Option<&str> {
        self.last_name.as_deref()
    }

    pub fn certificate_number(&self) -> Option<&str> {
        self.certificate_number.as_deref()
    }

    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    pub fn role(&self) -> Option<Role> {
        self.role
    }

    pub fn notification_preference(&self) -> NotificationPreference {
        self.notification_preference
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// "First Last" for log and conflict messages
    pub fn display_name(&self) -> String {
        format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or_default(),
            self.last_name.as_deref().unwrap_or_default()
        )
    }

    // Mutators

    pub fn set_id(&mut self, id: Option<UserId>) {
        self.id = id;
    }

    pub fn set_username(&mut self, username: Option<String>) {
        self.username = username;
    }

    pub fn set_password(&mut self, password: Option<String>) {
        self.password = password;
    }

    /// Drop the password hash before the record leaves the service
    pub fn clear_password(&mut self) {
        self.password = None;
    }

    pub fn set_email(&mut self, email: Option<String>) {
        self.email = email;
    }

    pub fn set_email_verified(&mut self, verified: bool) {
        self.email_verified = verified;
    }

    pub fn set_email_enabled(&mut self, enabled: bool) {
        self.email_enabled = enabled;
    }

    pub fn set_sms(&mut self, sms: Option<String>) {
        self.sms = sms;
    }

    pub fn set_sms_verified(&mut self, verified: bool) {
        self.sms_verified = verified;
    }

    pub fn set_sms_enabled(&mut self, enabled: bool) {
        self.sms_enabled = enabled;
    }

    pub fn set_slack(&mut self, slack: Option<String>) {
        self.slack = slack;
    }

    pub fn set_slack_verified(&mut self, verified: bool) {
        self.slack_verified = verified;
    }

    pub fn set_slack_enabled(&mut self, enabled: bool) {
        self.slack_enabled = enabled;
    }

    pub fn set_first_name(&mut self, first_name: Option<String>) {
        self.first_name = first_name;
    }

    pub fn set_last_name(&mut self, last_name: Option<String>) {
        self.last_name = last_name;
    }

    pub fn set_certificate_number(&mut self, certificate_number: Option<String>) {
        self.certificate_number = certificate_number;
    }

    pub fn set_code(&mut self, code: Option<String>) {
        self.code = code;
    }

    pub fn set_role(&mut self, role: Option<Role>) {
        self.role = role;
    }

    pub fn set_notification_preference(&mut self, preference: NotificationPreference) {
        self.notification_preference = preference;
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Mark one contact channel as verified
    pub fn mark_verified(&mut self, channel: NotificationType) {
        match channel {
            NotificationType::Email => self.email_verified = true,
            NotificationType::Sms => self.sms_verified = true,
            NotificationType::Slack => self.slack_verified = true,
        }
    }

    /// Clear the verified flag of every contact channel whose value differs
    /// from the stored record. A channel the stored record never had is left alone.
    pub fn reset_changed_channels(&mut self, existing: &User) {
        if changed(existing.email.as_deref(), self.email.as_deref()) {
            self.email_verified = false;
        }
        if changed(existing.sms.as_deref(), self.sms.as_deref()) {
            self.sms_verified = false;
        }
        if changed(existing.slack.as_deref(), self.slack.as_deref()) {
            self.slack_verified = false;
        }
    }
}

fn changed(existing: Option<&str>, incoming: Option<&str>) -> bool {
    matches!(existing, Some(old) if Some(old) != incoming)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored_user() -> User {
        let mut user = User::new("jdoe");
        user.set_id(Some(UserId::new(1)));
        user.set_email(Some("jdoe@example.com".to_string()));
        user.set_email_verified(true);
        user.set_sms(Some("5551234567".to_string()));
        user.set_sms_verified(true);
        user.set_slack(Some("jdoe".to_string()));
        user.set_slack_verified(true);
        user
    }

    #[test]
    fn test_role_from_certificate_number() {
        assert_eq!(
            Role::from_certificate_number(Some("1234567CFI")),
            Role::Instructor
        );
        assert_eq!(Role::from_certificate_number(Some("1234567")), Role::Student);
        assert_eq!(Role::from_certificate_number(Some("CFI1234")), Role::Student);
        assert_eq!(Role::from_certificate_number(None), Role::Student);
    }

    #[test]
    fn test_role_round_trip_through_storage_names() {
        for role in [Role::Student, Role::Instructor, Role::Admin] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("pilot".parse::<Role>().is_err());
    }

    #[test]
    fn test_notification_type_is_case_insensitive() {
        assert_eq!(
            "EMAIL".parse::<NotificationType>().unwrap(),
            NotificationType::Email
        );
        assert_eq!(
            "slack".parse::<NotificationType>().unwrap(),
            NotificationType::Slack
        );
        assert!("web".parse::<NotificationType>().is_err());
    }

    #[test]
    fn test_new_user_defaults() {
        let user = User::new("jdoe");

        assert_eq!(user.username(), Some("jdoe"));
        assert!(user.id().is_none());
        assert!(user.role().is_none());
        assert!(!user.is_enabled());
        assert_eq!(user.notification_preference(), NotificationPreference::Web);
    }

    #[test]
    fn test_changed_email_resets_only_email_flag() {
        let existing = stored_user();
        let mut incoming = existing.clone();
        incoming.set_email(Some("new@example.com".to_string()));

        incoming.reset_changed_channels(&existing);

        assert!(!incoming.email_verified());
        assert!(incoming.sms_verified());
        assert!(incoming.slack_verified());
    }

    #[test]
    fn test_unchanged_channels_keep_flags() {
        let existing = stored_user();
        let mut incoming = existing.clone();

        incoming.reset_changed_channels(&existing);

        assert!(incoming.email_verified());
        assert!(incoming.sms_verified());
        assert!(incoming.slack_verified());
    }

    #[test]
    fn test_removed_channel_resets_flag() {
        let existing = stored_user();
        let mut incoming = existing.clone();
        incoming.set_slack(None);

        incoming.reset_changed_channels(&existing);

        assert!(!incoming.slack_verified());
    }

    #[test]
    fn test_mark_verified() {
        let mut user = User::new("jdoe");
        user.mark_verified(NotificationType::Sms);

        assert!(user.sms_verified());
        assert!(!user.email_verified());
    }

    #[test]
    fn test_serialization_excludes_password() {
        let mut user = User::new("jdoe");
        user.set_password(Some("$2b$12$hashedvalue".to_string()));

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("hashedvalue"));
        assert!(!json.contains("password"));
    }

    #[test]
    fn test_display_name() {
        let mut user = User::new("jdoe");
        user.set_first_name(Some("Jane".to_string()));
        user.set_last_name(Some("Doe".to_string()));

        assert_eq!(user.display_name(), "Jane Doe");
    }
}
