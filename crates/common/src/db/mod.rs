//! Database layer for Seabed Catalog
//!
//! Provides:
//! - SeaORM entity models
//! - Schema bootstrap and the bundled seed catalog
//! - Repository pattern for data access
//! - Connection pool management

pub mod models;
mod repository;
pub mod schema;
pub mod seed;

pub use repository::Repository;

use crate::config::DatabaseConfig;
use crate::errors::{AppError, Result};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;
use tracing::info;

/// Database connection pool wrapper
#[derive(Clone)]
pub struct DbPool {
    /// Primary connection (for writes)
    pub primary: DatabaseConnection,

    /// Read replica connection (optional)
    pub replica: Option<DatabaseConnection>,
}

impl DbPool {
    /// Create a new database pool from configuration
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        info!("Connecting to primary database...");

        let primary = Database::connect(connect_options(&config.url, config))
            .await
            .map_err(|e| AppError::DatabaseConnection {
                message: format!("Failed to connect to primary: {}", e),
            })?;

        let replica = if let Some(ref read_url) = config.read_url {
            info!("Connecting to read replica...");

            let replica_conn = Database::connect(connect_options(read_url, config))
                .await
                .map_err(|e| AppError::DatabaseConnection {
                    message: format!("Failed to connect to replica: {}", e),
                })?;

            Some(replica_conn)
        } else {
            None
        };

        info!("Database connections established");

        Ok(Self { primary, replica })
    }

    /// Wrap an existing connection with no replica
    pub fn from_connection(primary: DatabaseConnection) -> Self {
        Self { primary, replica: None }
    }

    /// Get the connection for reads (replica if available, otherwise primary)
    pub fn read(&self) -> &DatabaseConnection {
        self.replica.as_ref().unwrap_or(&self.primary)
    }

    /// Get the connection for writes (always primary)
    pub fn write(&self) -> &DatabaseConnection {
        &self.primary
    }

    /// Ping the database to check connectivity
    pub async fn ping(&self) -> Result<()> {
        self.primary
            .ping()
            .await
            .map_err(|e| AppError::DatabaseConnection {
                message: format!("Primary ping failed: {}", e),
            })?;

        if let Some(ref replica) = self.replica {
            replica
                .ping()
                .await
                .map_err(|e| AppError::DatabaseConnection {
                    message: format!("Replica ping failed: {}", e),
                })?;
        }

        Ok(())
    }
}

fn connect_options(url: &str, config: &DatabaseConfig) -> ConnectOptions {
    let mut opts = ConnectOptions::new(url);
    opts.max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .sqlx_logging(false);
    opts
}

/// In-memory SQLite pools for tests, loaded with the bundled catalog
#[cfg(any(test, feature = "test-support"))]
pub mod testing {
    use super::{schema, seed, DbPool};
    use sea_orm::{ConnectOptions, Database};

    /// Fresh pool with the schema created and nothing seeded
    pub async fn empty_pool() -> DbPool {
        // A single connection keeps every query on the same in-memory database
        let mut opts = ConnectOptions::new("sqlite::memory:");
        opts.max_connections(1).min_connections(1).sqlx_logging(false);

        let conn = Database::connect(opts).await.expect("open in-memory sqlite");
        schema::create_all(&conn).await.expect("create schema");
        DbPool::from_connection(conn)
    }

    /// Fresh pool holding the bundled seed catalog
    pub async fn seeded_pool() -> DbPool {
        let pool = empty_pool().await;
        let catalog = seed::SeedCatalog::bundled().expect("parse bundled catalog");
        seed::seed_if_empty(pool.write(), &catalog).await.expect("seed catalog");
        pool
    }
}
