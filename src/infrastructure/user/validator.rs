//! Uniqueness validation and role-based access checks

use std::sync::Arc;

use tracing::warn;

use crate::domain::user::{
    non_blank, validate_username, Principal, Role, User, UserId, UserRepository,
    UserValidationError,
};
use crate::domain::DomainError;

const NOT_AUTHORIZED: &str = "Current user is not authorized";

/// Validates user payloads and resolves caller permissions
#[derive(Debug)]
pub struct UserValidator<R: UserRepository> {
    users: Arc<R>,
}

impl<R: UserRepository> UserValidator<R> {
    pub fn new(users: Arc<R>) -> Self {
        Self { users }
    }

    /// Check required fields and uniqueness of username, sms, slack and email
    pub async fn validate(&self, user: Option<&User>) -> Result<(), DomainError> {
        let user = user.ok_or_else(|| invalid(UserValidationError::MissingUser))?;
        let username = validate_username(user.username()).map_err(invalid)?;
        let existing = self.users.find_by_username(username).await?;
        conflict(user, existing, "username", username)?;

        if let Some(sms) = non_blank(user.sms()) {
            let existing = self.users.find_by_sms(sms).await?;
            conflict(user, existing, "number", sms)?;
        }

        if let Some(slack) = non_blank(user.slack()) {
            let existing = self.users.find_by_slack(slack).await?;
            conflict(user, existing, "slack name", slack)?;
        }

        if let Some(email) = non_blank(user.email()) {
            let existing = self.users.find_by_email(email).await?;
            conflict(user, existing, "email address", email)?;
        }

        Ok(())
    }

    pub async fn access_admin(&self, principal: Option<&Principal>) -> Result<UserId, DomainError> {
        self.access("access_admin", principal, &[Role::Admin], None)
            .await
    }

    pub async fn access_admin_or_instructor(
        &self,
        principal: Option<&Principal>,
    ) -> Result<UserId, DomainError> {
        self.access(
            "access_admin_or_instructor",
            principal,
            &[Role::Admin, Role::Instructor],
            None,
        )
        .await
    }

    pub async fn access_any_authenticated(
        &self,
        principal: Option<&Principal>,
    ) -> Result<UserId, DomainError> {
        self.access(
            "access_any_authenticated",
            principal,
            &[Role::Admin, Role::Instructor, Role::Student],
            None,
        )
        .await
    }

    /// Admins, instructors and the owner of `user_id` pass
    pub async fn access_admin_instructor_or_specific_user(
        &self,
        user_id: UserId,
        principal: Option<&Principal>,
    ) -> Result<UserId, DomainError> {
        self.access(
            "access_admin_instructor_or_specific_user",
            principal,
            &[Role::Admin, Role::Instructor],
            Some(user_id),
        )
        .await
    }

    pub async fn is_admin(&self, principal: Option<&Principal>) -> Result<bool, DomainError> {
        swallow_access_failure(self.access_admin(principal).await.map(|_| true))
    }

    pub async fn is_admin_or_instructor(
        &self,
        principal: Option<&Principal>,
    ) -> Result<bool, DomainError> {
        swallow_access_failure(
            self.access_admin_or_instructor(principal)
                .await
                .map(|_| true),
        )
    }

    /// Whether the caller is the owner of `user_id`, regardless of role
    pub async fn is_authenticated_user(
        &self,
        user_id: UserId,
        principal: Option<&Principal>,
    ) -> Result<bool, DomainError> {
        swallow_access_failure(
            self.resolve_caller(principal)
                .await
                .map(|caller| caller.id() == Some(user_id)),
        )
    }

    /// Load the caller's stored record by id, so renames never re-point a principal
    async fn resolve_caller(&self, principal: Option<&Principal>) -> Result<User, DomainError> {
        let Some(principal) = principal else {
            warn!("Denying access because no principal was provided");
            return Err(DomainError::access_denied("No authorization provided"));
        };

        self.users.find_by_id(principal.id()).await?.ok_or_else(|| {
            warn!(
                user_id = %principal.id(),
                username = %principal.name(),
                "Principal does not resolve to a user"
            );
            DomainError::not_found(format!("No user found for ID [{}]", principal.id()))
        })
    }

    async fn access(
        &self,
        check: &str,
        principal: Option<&Principal>,
        permitted: &[Role],
        owner: Option<UserId>,
    ) -> Result<UserId, DomainError> {
        let caller = self.resolve_caller(principal).await?;
        let caller_id = caller
            .id()
            .ok_or_else(|| DomainError::internal("Stored user has no id"))?;

        let role_permitted = caller.role().is_some_and(|role| permitted.contains(&role));
        let is_owner = owner == Some(caller_id);

        if !role_permitted && !is_owner {
            warn!(
                check = check,
                role = ?caller.role(),
                caller_id = %caller_id,
                target_id = ?owner,
                "Denying access because of role"
            );
            return Err(DomainError::access_denied(NOT_AUTHORIZED));
        }

        Ok(caller_id)
    }
}

fn invalid(error: UserValidationError) -> DomainError {
    warn!("{}", error);
    DomainError::invalid_payload(error.to_string())
}

fn conflict(
    user: &User,
    existing: Option<User>,
    field: &str,
    value: &str,
) -> Result<(), DomainError> {
    match existing {
        Some(other) if other.id() != user.id() => {
            let message = format!(
                "Another user [{}] has already taken {} [{}]",
                other.display_name(),
                field,
                value
            );
            warn!("{}", message);
            Err(DomainError::conflict(message))
        }
        _ => Ok(()),
    }
}

fn swallow_access_failure(result: Result<bool, DomainError>) -> Result<bool, DomainError> {
    match result {
        Ok(allowed) => Ok(allowed),
        Err(e) if e.is_access_failure() => Ok(false),
        Err(e) => Err(e),
    }
}
