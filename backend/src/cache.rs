//! Optional redis cache for the grouped catalog
//!
//! Every operation degrades to a miss when redis is unavailable; callers fall
//! back to the database.

use redis::aio::ConnectionManager;
use tracing::{debug, warn};

const CATALOG_KEY: &str = "mile_planner:catalog:v1";

/// Catalog cache backed by a shared redis connection
#[derive(Clone)]
pub struct CatalogCache {
    conn: Option<ConnectionManager>,
    ttl_secs: u64,
}

impl CatalogCache {
    pub fn new(conn: Option<ConnectionManager>, ttl_secs: u64) -> Self {
        Self { conn, ttl_secs }
    }

    /// A cache that never stores anything
    pub fn disabled() -> Self {
        Self::new(None, 0)
    }

    pub fn is_enabled(&self) -> bool {
        self.conn.is_some() && self.ttl_secs > 0
    }

    fn connection(&self) -> Option<ConnectionManager> {
        if self.ttl_secs == 0 {
            return None;
        }
        self.conn.clone()
    }

    pub async fn get(&self) -> Option<String> {
        let mut conn = self.connection()?;
        match redis::cmd("GET")
            .arg(CATALOG_KEY)
            .query_async::<_, Option<String>>(&mut conn)
            .await
        {
            Ok(hit) => {
                debug!(hit = hit.is_some(), "Catalog cache lookup");
                hit
            }
            Err(e) => {
                warn!("Catalog cache read failed: {}", e);
                None
            }
        }
    }

    pub async fn put(&self, json: &str) {
        let Some(mut conn) = self.connection() else {
            return;
        };
        let result = redis::cmd("SET")
            .arg(CATALOG_KEY)
            .arg(json)
            .arg("EX")
            .arg(self.ttl_secs)
            .query_async::<_, ()>(&mut conn)
            .await;
        if let Err(e) = result {
            warn!("Catalog cache write failed: {}", e);
        }
    }

    /// Drop the cached catalog after any catalog write
    pub async fn invalidate(&self) {
        let Some(mut conn) = self.conn.clone() else {
            return;
        };
        if let Err(e) = redis::cmd("DEL")
            .arg(CATALOG_KEY)
            .query_async::<_, i64>(&mut conn)
            .await
        {
            warn!("Catalog cache invalidation failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_cache_always_misses() {
        let cache = CatalogCache::disabled();
        assert!(!cache.is_enabled());
        cache.put("{}").await;
        assert_eq!(cache.get().await, None);
        cache.invalidate().await;
    }

    #[test]
    fn test_zero_ttl_disables_cache() {
        let cache = CatalogCache::new(None, 0);
        assert!(!cache.is_enabled());
        assert_eq!(tokio_test::block_on(cache.get()), None);
        tokio_test::block_on(cache.put("[]"));
        assert_eq!(tokio_test::block_on(cache.get()), None);
    }
}
