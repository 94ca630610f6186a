//! Data layer module
//!
//! Handles all data persistence and caching:
//! - SQLite database operations
//! - Catalog response cache (volatile)

mod cache;
mod database;
mod models;

pub use cache::CatalogCache;
pub use database::Database;
pub use models::*;

#[cfg(test)]
mod database_test;
