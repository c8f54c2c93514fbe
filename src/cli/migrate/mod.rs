//! Migrate command - applies the embedded schema migrations

use tracing::info;

use crate::infrastructure::storage::{run_storage_migrations, PostgresMigrator};

pub async fn run() -> anyhow::Result<()> {
    let config = super::bootstrap();

    let pool = crate::connect_postgres(&config.storage).await?;
    run_storage_migrations(&pool).await?;

    let version = PostgresMigrator::new(pool).current_version().await?;
    info!(version = ?version, "Database schema is up to date");

    Ok(())
}
