//! PostgreSQL user repository implementation

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::user::{NotificationPreference, Role, User, UserId, UserRepository};
use crate::domain::DomainError;

const USER_COLUMNS: &str = r#"
    id, username, password, email, email_verified, email_enabled,
    sms, sms_verified, sms_enabled, slack, slack_verified, slack_enabled,
    first_name, last_name, certificate_number, code, role,
    notification_preference, enabled
"#;

/// PostgreSQL implementation of UserRepository
#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_one_where(
        &self,
        predicate: &str,
        value: &str,
    ) -> Result<Option<User>, DomainError> {
        let sql = format!(
            "SELECT {} FROM users WHERE {} ORDER BY id LIMIT 1",
            USER_COLUMNS, predicate
        );

        let row = sqlx::query(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get user: {}", e)))?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn insert(&self, user: User) -> Result<User, DomainError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO users (username, password, email, email_verified, email_enabled,
                               sms, sms_verified, sms_enabled, slack, slack_verified, slack_enabled,
                               first_name, last_name, certificate_number, code, role,
                               notification_preference, enabled)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            RETURNING id
            "#,
        )
        .bind(user.username())
        .bind(user.password())
        .bind(user.email())
        .bind(user.email_verified())
        .bind(user.email_enabled())
        .bind(user.sms())
        .bind(user.sms_verified())
        .bind(user.sms_enabled())
        .bind(user.slack())
        .bind(user.slack_verified())
        .bind(user.slack_enabled())
        .bind(user.first_name())
        .bind(user.last_name())
        .bind(user.certificate_number())
        .bind(user.code())
        .bind(user.role().map(|r| r.as_str()))
        .bind(user.notification_preference().as_str())
        .bind(user.is_enabled())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &user, "create"))?;

        let mut user = user;
        user.set_id(Some(UserId::new(id)));
        Ok(user)
    }

    async fn update(&self, id: UserId, user: User) -> Result<User, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET username = $2, password = $3, email = $4, email_verified = $5, email_enabled = $6,
                sms = $7, sms_verified = $8, sms_enabled = $9,
                slack = $10, slack_verified = $11, slack_enabled = $12,
                first_name = $13, last_name = $14, certificate_number = $15, code = $16,
                role = $17, notification_preference = $18, enabled = $19
            WHERE id = $1
            "#,
        )
        .bind(id.value())
        .bind(user.username())
        .bind(user.password())
        .bind(user.email())
        .bind(user.email_verified())
        .bind(user.email_enabled())
        .bind(user.sms())
        .bind(user.sms_verified())
        .bind(user.sms_enabled())
        .bind(user.slack())
        .bind(user.slack_verified())
        .bind(user.slack_enabled())
        .bind(user.first_name())
        .bind(user.last_name())
        .bind(user.certificate_number())
        .bind(user.code())
        .bind(user.role().map(|r| r.as_str()))
        .bind(user.notification_preference().as_str())
        .bind(user.is_enabled())
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &user, "update"))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found(format!("No user found for ID [{}]", id)));
        }

        Ok(user)
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, DomainError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);

        let row = sqlx::query(&sql)
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get user: {}", e)))?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        self.fetch_one_where("LOWER(username) = LOWER($1)", username)
            .await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        self.fetch_one_where("LOWER(email) = LOWER($1)", email).await
    }

    async fn find_by_sms(&self, sms: &str) -> Result<Option<User>, DomainError> {
        self.fetch_one_where("sms = $1", sms).await
    }

    async fn find_by_slack(&self, slack: &str) -> Result<Option<User>, DomainError> {
        self.fetch_one_where("LOWER(slack) = LOWER($1)", slack).await
    }

    async fn save(&self, user: User) -> Result<User, DomainError> {
        match user.id() {
            Some(id) => self.update(id, user).await,
            None => self.insert(user).await,
        }
    }

    async fn find_all(&self) -> Result<Vec<User>, DomainError> {
        let sql = format!("SELECT {} FROM users ORDER BY id", USER_COLUMNS);

        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to list users: {}", e)))?;

        rows.iter().map(row_to_user).collect()
    }

    async fn count(&self) -> Result<usize, DomainError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to count users: {}", e)))?;

        Ok(count as usize)
    }
}

fn map_write_error(e: sqlx::Error, user: &User, action: &str) -> DomainError {
    let msg = e.to_string();

    if msg.contains("duplicate key") || msg.contains("unique constraint") {
        DomainError::conflict(format!(
            "Username '{}' already exists",
            user.username().unwrap_or_default()
        ))
    } else if msg.contains("null value") {
        DomainError::invalid_payload(format!("Failed to {} user: {}", action, e))
    } else {
        DomainError::storage(format!("Failed to {} user: {}", action, e))
    }
}

fn row_to_user(row: &sqlx::postgres::PgRow) -> Result<User, DomainError> {
    let id: i64 = row.get("id");
    let role: Option<String> = row.get("role");
    let preference: String = row.get("notification_preference");

    let role = role
        .map(|r| r.parse::<Role>())
        .transpose()
        .map_err(|e| DomainError::storage(format!("Invalid role in database: {}", e)))?;
    let preference = preference
        .parse::<NotificationPreference>()
        .map_err(|e| {
            DomainError::storage(format!("Invalid notification preference in database: {}", e))
        })?;

    let mut user = User::default();
    user.set_id(Some(UserId::new(id)));
    user.set_username(row.get("username"));
    user.set_password(row.get("password"));
    user.set_email(row.get("email"));
    user.set_email_verified(row.get("email_verified"));
    user.set_email_enabled(row.get("email_enabled"));
    user.set_sms(row.get("sms"));
    user.set_sms_verified(row.get("sms_verified"));
    user.set_sms_enabled(row.get("sms_enabled"));
    user.set_slack(row.get("slack"));
    user.set_slack_verified(row.get("slack_verified"));
    user.set_slack_enabled(row.get("slack_enabled"));
    user.set_first_name(row.get("first_name"));
    user.set_last_name(row.get("last_name"));
    user.set_certificate_number(row.get("certificate_number"));
    user.set_code(row.get("code"));
    user.set_role(role);
    user.set_notification_preference(preference);
    user.set_enabled(row.get("enabled"));

    Ok(user)
}
