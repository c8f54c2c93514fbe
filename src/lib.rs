//! User Accounts Service
//!
//! Registration, contact-channel verification, role-based access control and
//! the password lifecycle for instructor and student accounts:
//! - In-memory or PostgreSQL persistence
//! - Bcrypt or Argon2 password hashing
//! - Breached-password lookups against a k-anonymity range API
//! - Bearer JWT sessions with logout revocation

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;
use std::time::Duration;

use api::state::{AppState, UserServiceTrait};
use config::{StorageBackend, StorageConfig};
use domain::answer::UserAnswerRepository;
use domain::breach::BreachChecker;
use domain::token::TokenRepository;
use domain::user::{Role, User, UserRepository};
use infrastructure::{
    answer::{AnswerService, InMemoryUserAnswerRepository, PostgresUserAnswerRepository},
    auth::{JwtConfig, JwtService},
    breach::PwnedPasswordsClient,
    storage::run_storage_migrations,
    token::{InMemoryTokenRepository, PostgresTokenRepository},
    user::{
        DelegatingHasher, InMemoryUserRepository, PasswordHasher, PostgresUserRepository,
        TokenSettings, UserService, UserValidator,
    },
};
use rand::Rng;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{info, warn};

const BOOTSTRAP_ADMIN_USERNAME: &str = "admin";

/// Create the application state with custom configuration
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let hasher: Arc<dyn PasswordHasher> = Arc::new(DelegatingHasher::new(
        config.security.password_hasher,
        config.security.bcrypt_cost,
    ));
    let breach_checker: Arc<dyn BreachChecker> =
        Arc::new(PwnedPasswordsClient::new(&config.breach_check)?);

    info!("Storage backend: {:?}", config.storage.backend);

    let state = match config.storage.backend {
        StorageBackend::Postgres => {
            let pool = connect_postgres(&config.storage).await?;
            run_storage_migrations(&pool).await?;
            info!("PostgreSQL migrations applied");

            build_state(
                Arc::new(PostgresUserRepository::new(pool.clone())),
                Arc::new(PostgresTokenRepository::new(pool.clone())),
                Arc::new(PostgresUserAnswerRepository::new(pool)),
                hasher,
                breach_checker,
                config,
            )
        }
        StorageBackend::Memory => {
            info!("Using in-memory storage; data is lost on restart");
            build_state(
                Arc::new(InMemoryUserRepository::new()),
                Arc::new(InMemoryTokenRepository::new()),
                Arc::new(InMemoryUserAnswerRepository::new()),
                hasher,
                breach_checker,
                config,
            )
        }
    };

    create_initial_admin_user(
        state.user_service.as_ref(),
        config.security.admin_password.as_deref(),
    )
    .await?;

    Ok(state)
}

/// Open a PostgreSQL pool from the storage section
pub async fn connect_postgres(storage: &StorageConfig) -> anyhow::Result<PgPool> {
    let database_url = storage
        .database_url
        .clone()
        .or_else(|| std::env::var("DATABASE_URL").ok())
        .ok_or_else(|| {
            anyhow::anyhow!("storage.database_url or DATABASE_URL is required for postgres")
        })?;

    info!("Connecting to PostgreSQL...");
    let pool = PgPoolOptions::new()
        .max_connections(storage.max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&database_url)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to connect to PostgreSQL: {}", e))?;
    info!("PostgreSQL connection established");

    Ok(pool)
}

fn build_state<R, T, A>(
    users: Arc<R>,
    tokens: Arc<T>,
    answers: Arc<A>,
    hasher: Arc<dyn PasswordHasher>,
    breach_checker: Arc<dyn BreachChecker>,
    config: &AppConfig,
) -> AppState
where
    R: UserRepository + 'static,
    T: TokenRepository + 'static,
    A: UserAnswerRepository + 'static,
{
    let user_service = UserService::new(
        users.clone(),
        tokens,
        hasher,
        breach_checker,
        TokenSettings::from(&config.tokens),
    );
    let jwt_service = JwtService::new(JwtConfig::new(
        jwt_secret(config),
        u64::from(config.security.jwt_expiration_hours),
    ));

    AppState {
        user_service: Arc::new(user_service),
        user_validator: Arc::new(UserValidator::new(users.clone())),
        answer_service: Arc::new(AnswerService::new(answers, users)),
        jwt_service: Arc::new(jwt_service),
        ui_host: Arc::from(config.ui.host.as_str()),
    }
}

/// Configured secret, or a random one when none is set
fn jwt_secret(config: &AppConfig) -> String {
    config
        .security
        .jwt_secret
        .clone()
        .filter(|secret| !secret.is_empty())
        .unwrap_or_else(|| {
            warn!(
                "No security.jwt_secret configured. Generating random secret. \
                Sessions will NOT persist across restarts."
            );
            random_alphanumeric(64)
        })
}

fn random_alphanumeric(len: usize) -> String {
    use rand::distributions::Alphanumeric;

    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Seed an enabled admin account when the store is empty
async fn create_initial_admin_user(
    user_service: &dyn UserServiceTrait,
    configured_password: Option<&str>,
) -> anyhow::Result<()> {
    if user_service.count().await? > 0 {
        return Ok(());
    }

    let (password, is_configured) = match configured_password {
        Some(p) if !p.is_empty() => (p.to_string(), true),
        _ => (random_alphanumeric(16), false),
    };

    let mut admin = User::new(BOOTSTRAP_ADMIN_USERNAME);
    admin.set_role(Some(Role::Admin));
    admin.set_enabled(true);
    admin.set_password(Some(user_service.hash_password(&password)?));
    user_service.store(admin).await?;

    info!("===========================================");
    info!("Initial admin user created!");
    info!("Username: {}", BOOTSTRAP_ADMIN_USERNAME);

    if is_configured {
        info!("Password: (set via security.admin_password)");
    } else {
        info!("Password: {}", password);
    }

    info!("Please change this password after first login.");
    info!("===========================================");

    Ok(())
}
