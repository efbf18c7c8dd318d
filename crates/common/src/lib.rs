//! Seabed Catalog Common Library
//!
//! Shared code for the catalog API server and the export client:
//! - Configuration management
//! - Error types and handling
//! - Database entities, schema, seed data and repository
//! - Typed data contract (DTOs)
//! - Catalog logic: map-data assembly, analytics, spatial association, facets
//! - Export formatting
//! - Metrics and caching

pub mod cache;
pub mod catalog;
pub mod config;
pub mod db;
pub mod dto;
pub mod errors;
pub mod export;
pub mod metrics;

// Re-export commonly used types
pub use config::AppConfig;
pub use db::{DbPool, Repository};
pub use errors::{AppError, Result};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
