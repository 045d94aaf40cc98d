//! Application state management
//!
//! Shared resources handed to every handler through axum's state
//! extraction. Every field is cheap to clone.

use crate::auth::JwtService;
use crate::cache::CatalogCache;
use crate::config::AppConfig;
use metrics_exporter_prometheus::PrometheusHandle;
use redis::aio::ConnectionManager;
use sqlx::PgPool;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Pre-initialized JWT service with cached keys
    pub jwt: JwtService,
    /// Catalog cache, a no-op without redis
    pub cache: CatalogCache,
    /// Prometheus renderer, absent when no recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create a new application state
    ///
    /// JWT keys are derived here once; call this only at startup.
    pub fn new(db: PgPool, redis: Option<ConnectionManager>, config: AppConfig) -> Self {
        let jwt = JwtService::new(&config.jwt.secret);
        let cache = CatalogCache::new(redis, config.redis.catalog_ttl_secs);

        Self {
            db,
            config: Arc::new(config),
            jwt,
            cache,
            metrics: None,
        }
    }

    /// Attach the installed Prometheus recorder
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    #[inline]
    pub fn db(&self) -> &PgPool {
        &self.db
    }

    #[inline]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    #[inline]
    pub fn jwt(&self) -> &JwtService {
        &self.jwt
    }

    #[inline]
    pub fn cache(&self) -> &CatalogCache {
        &self.cache
    }
}
