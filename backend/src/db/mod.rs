//! PostgreSQL pool, embedded migrations and readiness check

use crate::config::DatabaseConfig;
use anyhow::{Context, Result};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

/// Idle connections are recycled after ten minutes, all after thirty
const IDLE_TIMEOUT: Duration = Duration::from_secs(600);
const MAX_LIFETIME: Duration = Duration::from_secs(1800);

fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections.min(config.max_connections))
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .idle_timeout(IDLE_TIMEOUT)
        .max_lifetime(MAX_LIFETIME)
        .test_before_acquire(true)
}

pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool> {
    let connect_options = PgConnectOptions::from_str(&config.url)
        .context("Invalid database URL")?
        .application_name("mile-planner");

    let pool = pool_options(config).connect_with(connect_options).await?;

    info!(
        max = config.max_connections,
        min = config.min_connections,
        "Database pool created"
    );
    Ok(pool)
}

/// Apply the schema and the built-in workout library
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("Database migrations applied");
    Ok(())
}

/// Ready when the database answers and the workout library is seeded
pub async fn health_check(pool: &PgPool) -> Result<()> {
    let seeded: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM workout_library)")
        .fetch_one(pool)
        .await
        .map_err(|e| {
            warn!("Database health check failed: {}", e);
            anyhow::Error::new(e)
        })?;

    if !seeded {
        warn!("Workout library is empty");
        anyhow::bail!("Workout library has not been seeded");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_connections_never_exceed_max() {
        let config = DatabaseConfig {
            max_connections: 2,
            min_connections: 5,
            ..DatabaseConfig::default()
        };
        let options = pool_options(&config);
        assert_eq!(options.get_max_connections(), 2);
        assert_eq!(options.get_min_connections(), 2);
    }
}
