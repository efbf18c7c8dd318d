//! Redis cache integration
//!
//! Provides:
//! - Multiplexed connection management
//! - Generic get/set operations with TTL
//! - Read-through caching of analytics rollups

use crate::config::CacheSettings;
use crate::errors::{AppError, Result};
use redis::{aio::MultiplexedConnection, AsyncCommands, Client};
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Redis cache client
pub struct Cache {
    connection: RwLock<MultiplexedConnection>,
    key_prefix: String,
    default_ttl_secs: u64,
}

impl Cache {
    /// Connect using the cache settings. `Ok(None)` when no URL is configured.
    pub async fn connect(settings: &CacheSettings) -> Result<Option<Self>> {
        let Some(ref url) = settings.url else {
            return Ok(None);
        };

        let client = Client::open(url.as_str()).map_err(|e| AppError::CacheError {
            message: format!("Failed to create Redis client: {}", e),
        })?;

        let connection = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::CacheError {
                message: format!("Failed to connect to Redis: {}", e),
            })?;

        Ok(Some(Self {
            connection: RwLock::new(connection),
            key_prefix: settings.key_prefix.clone(),
            default_ttl_secs: settings.summary_ttl_secs,
        }))
    }

    /// Build a prefixed key
    fn key(&self, key: &str) -> String {
        format!("{}:{}", self.key_prefix, key)
    }

    /// Get a value from cache
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let full_key = self.key(key);
        let mut conn = self.connection.write().await;

        let value: Option<String> = conn.get(&full_key).await.map_err(|e| AppError::CacheError {
            message: format!("Failed to get key '{}': {}", full_key, e),
        })?;

        match value {
            Some(json) => {
                let parsed = serde_json::from_str(&json).map_err(|e| AppError::CacheError {
                    message: format!("Failed to parse cached value: {}", e),
                })?;
                debug!(key = %full_key, "Cache hit");
                Ok(Some(parsed))
            }
            None => {
                debug!(key = %full_key, "Cache miss");
                Ok(None)
            }
        }
    }

    /// Set a value in cache with default TTL
    pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        self.set_with_ttl(key, value, self.default_ttl_secs).await
    }

    /// Set a value in cache with custom TTL
    pub async fn set_with_ttl<T: Serialize>(&self, key: &str, value: &T, ttl_secs: u64) -> Result<()> {
        let full_key = self.key(key);
        let json = serde_json::to_string(value).map_err(|e| AppError::CacheError {
            message: format!("Failed to serialize value: {}", e),
        })?;

        let mut conn = self.connection.write().await;
        let _: () = conn
            .set_ex(&full_key, &json, ttl_secs)
            .await
            .map_err(|e| AppError::CacheError {
                message: format!("Failed to set key '{}': {}", full_key, e),
            })?;

        debug!(key = %full_key, ttl_secs, "Cache set");
        Ok(())
    }

    /// Get or set with a loader function.
    ///
    /// Cache failures are logged and fall through to the loader.
    pub async fn get_or_load<T, F, Fut>(&self, key: &str, cache_name: &str, loader: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let value = match resolve_read(self.get::<T>(key).await, cache_name, loader).await? {
            Lookup::Hit(cached) => return Ok(cached),
            Lookup::Loaded(value) => value,
        };

        if let Err(e) = self.set(key, &value).await {
            warn!(error = %e, "Failed to cache value, continuing without cache");
        }

        Ok(value)
    }

    /// Ping Redis to check connectivity
    pub async fn ping(&self) -> Result<()> {
        let mut conn = self.connection.write().await;
        redis::cmd("PING")
            .query_async::<String>(&mut *conn)
            .await
            .map_err(|e| AppError::CacheError {
                message: format!("Redis ping failed: {}", e),
            })?;
        Ok(())
    }
}

/// Outcome of a read-through lookup
#[derive(Debug, PartialEq)]
enum Lookup<T> {
    Hit(T),
    /// Came from the loader and should be written back
    Loaded(T),
}

/// Settle a cache read. Misses and read failures both go to the loader.
async fn resolve_read<T, F, Fut>(read: Result<Option<T>>, cache_name: &str, loader: F) -> Result<Lookup<T>>
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    match read {
        Ok(Some(cached)) => {
            crate::metrics::record_cache(true, cache_name);
            return Ok(Lookup::Hit(cached));
        }
        Ok(None) => crate::metrics::record_cache(false, cache_name),
        Err(e) => warn!(error = %e, cache = cache_name, "Cache read failed, loading from database"),
    }

    loader().await.map(Lookup::Loaded)
}

/// Cache key builder helpers
pub mod keys {
    /// Contractor summary rollup
    pub fn contractor_summary(contractor_id: i32) -> String {
        format!("summary:contractor:{}", contractor_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_builders() {
        assert_eq!(keys::contractor_summary(6), "summary:contractor:6");
    }

    #[tokio::test]
    async fn test_no_url_means_no_cache() {
        let settings = CacheSettings { url: None, ..Default::default() };
        let cache = tokio_test::assert_ok!(Cache::connect(&settings).await);
        assert!(cache.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_redis_is_an_error() {
        let settings = CacheSettings {
            url: Some("redis://127.0.0.1:1".into()),
            ..Default::default()
        };
        assert!(matches!(
            Cache::connect(&settings).await,
            Err(AppError::CacheError { .. })
        ));
    }

    #[tokio::test]
    async fn test_failed_read_falls_through_to_loader() {
        let read: Result<Option<u32>> = Err(AppError::CacheError {
            message: "connection reset".into(),
        });
        let lookup = resolve_read(read, "contractor_summary", || async { Ok(42) }).await;
        assert_eq!(tokio_test::assert_ok!(lookup), Lookup::Loaded(42));
    }

    #[tokio::test]
    async fn test_miss_loads_and_hit_skips_loader() {
        let lookup = resolve_read(Ok(None), "contractor_summary", || async { Ok(7u32) }).await;
        assert_eq!(tokio_test::assert_ok!(lookup), Lookup::Loaded(7));

        let lookup = resolve_read(Ok(Some(3u32)), "contractor_summary", || async {
            Err(AppError::Upstream { message: "loader should not run".into() })
        })
        .await;
        assert_eq!(tokio_test::assert_ok!(lookup), Lookup::Hit(3));
    }

    #[tokio::test]
    async fn test_loader_error_is_returned() {
        let lookup = resolve_read(Ok(None::<u32>), "contractor_summary", || async {
            Err(AppError::DatabaseConnection { message: "pool closed".into() })
        })
        .await;
        assert!(matches!(lookup, Err(AppError::DatabaseConnection { .. })));
    }
}
