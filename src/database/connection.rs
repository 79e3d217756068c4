//! PostgreSQL pool setup
//!
//! The pool is sized and timed straight from `[database]` in the settings.

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;
use crate::config::DatabaseConfig;
use crate::utils::errors::ShamebotError;

pub type DatabasePool = PgPool;

/// Pool options for the configured limits, without connecting
pub fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.acquire_timeout())
        .idle_timeout(Some(config.idle_timeout()))
}

/// Connect to the configured database and make sure it answers
pub async fn create_pool(config: &DatabaseConfig) -> Result<DatabasePool, ShamebotError> {
    let pool = pool_options(config).connect(&config.url).await?;
    health_check(&pool).await?;

    info!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        "Database pool ready"
    );
    Ok(pool)
}

/// Apply pending schema migrations from `migrations/`
pub async fn run_migrations(pool: &DatabasePool) -> Result<(), ShamebotError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("Database schema up to date");
    Ok(())
}

pub async fn health_check(pool: &DatabasePool) -> Result<(), ShamebotError> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use std::time::Duration;

    #[test]
    fn test_pool_options_follow_settings() {
        let mut database = Settings::default().database;
        database.max_connections = 4;
        database.acquire_timeout_seconds = 2;

        let options = pool_options(&database);
        assert_eq!(options.get_max_connections(), 4);
        assert_eq!(options.get_min_connections(), 1);
        assert_eq!(options.get_acquire_timeout(), Duration::from_secs(2));
        assert_eq!(options.get_idle_timeout(), Some(Duration::from_secs(600)));
    }
}
