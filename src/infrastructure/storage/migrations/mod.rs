//! Database migrations infrastructure

use sqlx::postgres::PgPool;

use crate::domain::DomainError;

/// PostgreSQL migrator tracking applied versions in `_migrations`
#[derive(Debug)]
pub struct PostgresMigrator {
    pool: PgPool,
}

impl PostgresMigrator {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the migrations table if it doesn't exist
    async fn ensure_migrations_table(&self) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS _migrations (
                version BIGINT PRIMARY KEY,
                description TEXT NOT NULL,
                installed_on TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                success BOOLEAN NOT NULL DEFAULT TRUE
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to create migrations table: {}", e)))?;

        Ok(())
    }

    /// Runs a single migration
    pub async fn run_migration(&self, migration: &Migration) -> Result<(), DomainError> {
        self.ensure_migrations_table().await?;

        // Check if already applied
        let applied: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM _migrations WHERE version = $1)",
        )
        .bind(migration.version)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to check migration status: {}", e)))?;

        if applied {
            return Ok(());
        }

        // Run the migration
        sqlx::raw_sql(&migration.up)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                DomainError::storage(format!(
                    "Failed to run migration {}: {}",
                    migration.version, e
                ))
            })?;

        // Record the migration
        sqlx::query(
            "INSERT INTO _migrations (version, description) VALUES ($1, $2)",
        )
        .bind(migration.version)
        .bind(&migration.description)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::storage(format!("Failed to record migration {}: {}", migration.version, e))
        })?;

        Ok(())
    }

    /// Returns the latest applied migration version
    pub async fn current_version(&self) -> Result<Option<i64>, DomainError> {
        self.ensure_migrations_table().await?;

        let version: Option<i64> = sqlx::query_scalar(
            "SELECT MAX(version) FROM _migrations WHERE success = TRUE",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get migration version: {}", e)))?;

        Ok(version)
    }
}

/// Represents a database migration
#[derive(Debug, Clone)]
pub struct Migration {
    /// Migration version (timestamp-based recommended)
    pub version: i64,
    /// Human-readable description
    pub description: String,
    /// SQL to run when applying the migration
    pub up: String,
}

impl Migration {
    pub fn new(version: i64, description: impl Into<String>, up: impl Into<String>) -> Self {
        Self {
            version,
            description: description.into(),
            up: up.into(),
        }
    }
}

/// Schema for user accounts, their one-time tokens and answer history
pub fn storage_migrations() -> Vec<Migration> {
    vec![
        Migration::new(
            1,
            "Create users table",
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id BIGSERIAL PRIMARY KEY,
                username VARCHAR(255) NOT NULL,
                password VARCHAR(255),
                email VARCHAR(255),
                email_verified BOOLEAN NOT NULL DEFAULT FALSE,
                email_enabled BOOLEAN NOT NULL DEFAULT FALSE,
                sms VARCHAR(64),
                sms_verified BOOLEAN NOT NULL DEFAULT FALSE,
                sms_enabled BOOLEAN NOT NULL DEFAULT FALSE,
                slack VARCHAR(255),
                slack_verified BOOLEAN NOT NULL DEFAULT FALSE,
                slack_enabled BOOLEAN NOT NULL DEFAULT FALSE,
                first_name VARCHAR(255),
                last_name VARCHAR(255),
                certificate_number VARCHAR(64),
                code VARCHAR(16),
                role VARCHAR(32),
                notification_preference VARCHAR(32) NOT NULL DEFAULT 'web',
                enabled BOOLEAN NOT NULL DEFAULT FALSE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            );
            CREATE UNIQUE INDEX IF NOT EXISTS idx_users_username ON users (LOWER(username));
            CREATE INDEX IF NOT EXISTS idx_users_email ON users (LOWER(email));
            CREATE INDEX IF NOT EXISTS idx_users_slack ON users (LOWER(slack));
            CREATE INDEX IF NOT EXISTS idx_users_sms ON users (sms);
            "#,
        ),
        Migration::new(
            2,
            "Create account tokens table",
            r#"
            CREATE TABLE IF NOT EXISTS account_tokens (
                token VARCHAR(64) NOT NULL,
                kind VARCHAR(32) NOT NULL,
                user_id BIGINT NOT NULL REFERENCES users (id) ON DELETE CASCADE,
                expires_at TIMESTAMPTZ NOT NULL,
                PRIMARY KEY (kind, token),
                UNIQUE (kind, user_id)
            );
            "#,
        ),
        Migration::new(
            3,
            "Create user answers table",
            r#"
            CREATE TABLE IF NOT EXISTS user_answers (
                id BIGSERIAL PRIMARY KEY,
                user_id BIGINT NOT NULL REFERENCES users (id) ON DELETE CASCADE,
                question_id BIGINT NOT NULL,
                quiz_id BIGINT,
                event_id BIGINT,
                answered_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                answer_given TEXT NOT NULL,
                answered_correctly BOOLEAN NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_user_answers_user ON user_answers (user_id);
            CREATE INDEX IF NOT EXISTS idx_user_answers_question ON user_answers (question_id);
            CREATE INDEX IF NOT EXISTS idx_user_answers_quiz ON user_answers (quiz_id);
            CREATE INDEX IF NOT EXISTS idx_user_answers_event ON user_answers (event_id);
            "#,
        ),
    ]
}

/// Runs all pending storage migrations
pub async fn run_storage_migrations(pool: &PgPool) -> Result<(), DomainError> {
    let migrator = PostgresMigrator::new(pool.clone());
    let migrations = storage_migrations();

    for migration in migrations {
        migrator.run_migration(&migration).await?;
    }

    Ok(())
}
