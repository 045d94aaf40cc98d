//! Mile Planner backend
//!
//! Serves the training planner API: routes parse requests, services apply
//! the planner rules from the shared crate, repositories talk to PostgreSQL.

use anyhow::Result;
use mile_planner_backend::{config, db, routes, state::AppState, telemetry};
use redis::aio::ConnectionManager;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    init_tracing();

    let config = config::AppConfig::load()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        env = if config::AppConfig::is_production() { "production" } else { "development" },
        completion_policy = ?config.planner.completion_policy,
        "Starting Mile Planner backend"
    );

    if config::AppConfig::is_production() {
        validate_production_config(&config)?;
    }

    info!("Connecting to database...");
    let db_pool = db::create_pool(&config.database).await?;

    // Production runs migrations as a separate job
    if !config::AppConfig::is_production() {
        info!("Running database migrations...");
        db::run_migrations(&db_pool).await?;
    }

    let redis_conn = if config.redis.catalog_ttl_secs > 0 {
        connect_redis(&config.redis.url).await
    } else {
        info!("Catalog cache disabled by configuration");
        None
    };

    let mut state = AppState::new(db_pool, redis_conn, config.clone());
    match telemetry::install_recorder() {
        Ok(handle) => state = state.with_metrics(handle),
        Err(e) => warn!("{}. /metrics will be unavailable.", e),
    }

    let app = routes::create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!(address = %addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Connect to Redis; `None` runs the service without a catalog cache
async fn connect_redis(url: &str) -> Option<ConnectionManager> {
    info!("Connecting to Redis...");

    let client = match redis::Client::open(url) {
        Ok(client) => client,
        Err(e) => {
            warn!("Invalid Redis URL: {}. Catalog caching will be disabled.", e);
            return None;
        }
    };

    match ConnectionManager::new(client).await {
        Ok(conn) => {
            info!("Redis connection established");
            Some(conn)
        }
        Err(e) => {
            warn!("Failed to connect to Redis: {}. Catalog caching will be disabled.", e);
            None
        }
    }
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if config::AppConfig::is_production() {
            "mile_planner_backend=info,tower_http=info".into()
        } else {
            "mile_planner_backend=debug,tower_http=debug,sqlx=warn".into()
        }
    });

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if config::AppConfig::is_production() {
        subscriber
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        subscriber
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}

fn validate_production_config(config: &config::AppConfig) -> Result<()> {
    let problems = config.production_problems();
    for problem in &problems {
        error!("Configuration error: {}", problem);
    }
    if !problems.is_empty() {
        anyhow::bail!("Invalid production configuration");
    }
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
///
/// A handler that cannot be installed never fires; the other one still does.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
