//! Request and response bodies for the user endpoints

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::answer::{AnswerFilter, AnswerId, UserAnswer};
use crate::domain::token::TokenValidation;
use crate::domain::user::{NotificationPreference, Role, User, UserId};
use crate::domain::DomainError;
use crate::infrastructure::answer::RecordAnswer;

/// User body accepted by `POST /users` and `PUT /users`
///
/// Verification flags, the one-time code and the enabled flag are server
/// managed and never taken from a payload.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserPayload {
    pub id: Option<i64>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub email: Option<String>,
    pub email_enabled: bool,
    pub sms: Option<String>,
    pub sms_enabled: bool,
    pub slack: Option<String>,
    pub slack_enabled: bool,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub certificate_number: Option<String>,
    pub role: Option<String>,
    pub notification_preference: Option<String>,
}

impl UserPayload {
    /// Build a user from the payload; the password is left for the caller to hash
    pub fn to_user(&self) -> Result<User, DomainError> {
        let mut user = User::default();
        user.set_id(self.id.map(UserId::new));
        self.apply_to(&mut user)?;
        Ok(user)
    }

    /// Overwrite the client-editable fields of `user`
    pub fn apply_to(&self, user: &mut User) -> Result<(), DomainError> {
        user.set_username(self.username.clone());
        user.set_email(self.email.clone());
        user.set_email_enabled(self.email_enabled);
        user.set_sms(self.sms.clone());
        user.set_sms_enabled(self.sms_enabled);
        user.set_slack(self.slack.clone());
        user.set_slack_enabled(self.slack_enabled);
        user.set_first_name(self.first_name.clone());
        user.set_last_name(self.last_name.clone());
        user.set_certificate_number(self.certificate_number.clone());

        if let Some(preference) = &self.notification_preference {
            let preference = preference
                .parse::<NotificationPreference>()
                .map_err(|e| DomainError::invalid_payload(e.to_string()))?;
            user.set_notification_preference(preference);
        }

        Ok(())
    }

    pub fn role(&self) -> Result<Option<Role>, DomainError> {
        self.role
            .as_deref()
            .map(str::parse::<Role>)
            .transpose()
            .map_err(|e| DomainError::invalid_payload(e.to_string()))
    }
}

/// User as returned to callers; never carries the password hash
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Option<UserId>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub email_verified: bool,
    pub email_enabled: bool,
    pub sms: Option<String>,
    pub sms_verified: bool,
    pub sms_enabled: bool,
    pub slack: Option<String>,
    pub slack_verified: bool,
    pub slack_enabled: bool,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub certificate_number: Option<String>,
    pub role: Option<Role>,
    pub notification_preference: NotificationPreference,
    pub enabled: bool,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id(),
            username: user.username().map(String::from),
            email: user.email().map(String::from),
            email_verified: user.email_verified(),
            email_enabled: user.email_enabled(),
            sms: user.sms().map(String::from),
            sms_verified: user.sms_verified(),
            sms_enabled: user.sms_enabled(),
            slack: user.slack().map(String::from),
            slack_verified: user.slack_verified(),
            slack_enabled: user.slack_enabled(),
            first_name: user.first_name().map(String::from),
            last_name: user.last_name().map(String::from),
            certificate_number: user.certificate_number().map(String::from),
            role: user.role(),
            notification_preference: user.notification_preference(),
            enabled: user.is_enabled(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationPayload {
    #[serde(default)]
    pub username: Option<String>,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationResponse {
    pub user: UserResponse,
    pub verification_token: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationTokenResponse {
    pub verification_token: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenValidationResponse {
    pub result: TokenValidation,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenQuery {
    pub token: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompromisedQuery {
    pub p: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub username: Option<String>,
    pub slack: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResetTokenRequest {
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavePasswordRequest {
    pub token: String,
    pub new_password: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Body of `POST /users/{id}/answers`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerPayload {
    pub question_id: i64,
    #[serde(default)]
    pub quiz_id: Option<i64>,
    #[serde(default)]
    pub event_id: Option<i64>,
    pub answer_given: String,
    pub answered_correctly: bool,
}

impl From<AnswerPayload> for RecordAnswer {
    fn from(payload: AnswerPayload) -> Self {
        Self {
            question_id: payload.question_id,
            quiz_id: payload.quiz_id,
            event_id: payload.event_id,
            answer_given: payload.answer_given,
            answered_correctly: payload.answered_correctly,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct AnswerQuery {
    pub question: Option<i64>,
    pub quiz: Option<i64>,
    pub event: Option<i64>,
}

impl From<AnswerQuery> for AnswerFilter {
    fn from(query: AnswerQuery) -> Self {
        Self {
            question_id: query.question,
            quiz_id: query.quiz,
            event_id: query.event,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerResponse {
    pub id: Option<AnswerId>,
    pub user_id: UserId,
    pub question_id: i64,
    pub quiz_id: Option<i64>,
    pub event_id: Option<i64>,
    pub time: DateTime<Utc>,
    pub answer_given: String,
    pub answered_correctly: bool,
}

impl From<&UserAnswer> for AnswerResponse {
    fn from(answer: &UserAnswer) -> Self {
        Self {
            id: answer.id(),
            user_id: answer.user_id(),
            question_id: answer.question_id(),
            quiz_id: answer.quiz_id(),
            event_id: answer.event_id(),
            time: answer.answered_at(),
            answer_given: answer.answer_given().to_string(),
            answered_correctly: answer.answered_correctly(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_is_camel_case() {
        let payload: UserPayload = serde_json::from_str(
            r#"{"username": "sam", "firstName": "Sam", "certificateNumber": "123CFI",
                "notificationPreference": "sms", "emailEnabled": true}"#,
        )
        .unwrap();

        let user = payload.to_user().unwrap();
        assert_eq!(user.first_name(), Some("Sam"));
        assert_eq!(user.certificate_number(), Some("123CFI"));
        assert_eq!(user.notification_preference(), NotificationPreference::Sms);
        assert!(user.email_enabled());
        assert!(user.id().is_none());
    }

    #[test]
    fn test_apply_keeps_server_managed_fields() {
        let mut user = User::new("sam");
        user.set_email_verified(true);
        user.set_enabled(true);
        user.set_code(Some("1234".to_string()));

        let payload = UserPayload {
            username: Some("sam".to_string()),
            email: Some("sam@example.com".to_string()),
            ..Default::default()
        };
        payload.apply_to(&mut user).unwrap();

        assert!(user.email_verified());
        assert!(user.is_enabled());
        assert_eq!(user.code(), Some("1234"));
    }

    #[test]
    fn test_unknown_preference_is_invalid() {
        let payload = UserPayload {
            notification_preference: Some("pigeon".to_string()),
            ..Default::default()
        };

        assert!(matches!(
            payload.to_user(),
            Err(DomainError::InvalidPayload { .. })
        ));
    }

    #[test]
    fn test_response_omits_password() {
        let mut user = User::new("sam");
        user.set_password(Some("$2b$04$hash".to_string()));

        let json = serde_json::to_string(&UserResponse::from(&user)).unwrap();
        assert!(!json.contains("password"));
        assert!(json.contains("\"notificationPreference\""));
    }

    #[test]
    fn test_answer_payload_optional_links() {
        let payload: AnswerPayload = serde_json::from_str(
            r#"{"questionId": 4, "eventId": 2, "answerGiven": "B", "answeredCorrectly": false}"#,
        )
        .unwrap();

        let request = RecordAnswer::from(payload);
        assert_eq!(request.question_id, 4);
        assert!(request.quiz_id.is_none());
        assert_eq!(request.event_id, Some(2));
    }
}
