//! Kinotrack - movie discovery and social tracking backend
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      API Layer (Axum)                        │
//! │  - Friendships, watchlists, watched archive                 │
//! │  - Catalog proxy, streaming-source search                   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Service Layer                            │
//! │  - Business logic                                           │
//! │  - Best-effort batch operations                             │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Data Layer                              │
//! │  - SQLite (sqlx)                                            │
//! │  - Catalog TTL cache (moka)                                 │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - `api`: HTTP handlers
//! - `service`: Business logic layer
//! - `catalog`: Movie metadata provider adapter
//! - `sources`: Streaming-site search fan-out + IMDb ratings
//! - `data`: Database and cache layer
//! - `auth`: Bearer-token authentication
//! - `config`: Configuration management
//! - `error`: Error types

pub mod api;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod data;
pub mod error;
pub mod metrics;
pub mod service;
pub mod sources;

use std::sync::Arc;

/// Application state shared across all handlers
///
/// This struct is cloned for each request and contains
/// shared resources like the database pool, caches, and HTTP clients.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<config::AppConfig>,

    /// Database connection pool
    pub db: Arc<data::Database>,

    /// Movie metadata provider client (TTL-cached)
    pub catalog: catalog::CatalogClient,

    /// Streaming-site source registry
    pub sources: Arc<sources::SourceRegistry>,

    /// IMDb rating lookups
    pub imdb: sources::ImdbClient,
}

impl AppState {
    /// Initialize application state
    ///
    /// # Steps
    /// 1. Connect to SQLite database (runs migrations)
    /// 2. Initialize the catalog cache and client
    /// 3. Initialize the streaming-source fetcher and registry
    ///
    /// # Errors
    /// Returns error if any initialization step fails
    pub async fn new(config: config::AppConfig) -> Result<Self, error::AppError> {
        tracing::info!("Initializing application state...");

        let db = data::Database::connect(&config.database.path).await?;
        tracing::info!("Database connected");

        let catalog_cache = Arc::new(data::CatalogCache::new(
            config.cache.catalog_max_items,
            config.cache.search_ttl,
            config.cache.details_ttl,
        ));
        let catalog_http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| error::AppError::Internal(e.into()))?;
        let catalog = catalog::CatalogClient::new(&config.catalog, catalog_http, catalog_cache);
        tracing::info!("Catalog client initialized");

        let fetch = sources::FetchClient::new(&config.sources)?;
        let sources_registry = sources::SourceRegistry::new(fetch.clone());
        let imdb = sources::ImdbClient::new(fetch);
        tracing::info!("Streaming sources initialized");

        tracing::info!("Application state initialized successfully");

        Ok(Self {
            config: Arc::new(config),
            db: Arc::new(db),
            catalog,
            sources: Arc::new(sources_registry),
            imdb,
        })
    }
}

/// Build the Axum router with all routes.
///
/// This is shared by the binary and integration tests to keep route
/// composition consistent across environments.
pub fn build_router(state: AppState) -> axum::Router {
    use axum::Router;
    use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

    // Everything under /api requires a valid bearer token.
    let api_routes = Router::new()
        .merge(api::friends_router())
        .merge(api::watchlists_router())
        .merge(api::watched_router())
        .merge(api::catalog_router())
        .merge(api::sources_router())
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ));

    Router::new()
        .route("/health", axum::routing::get(health_check))
        .nest("/api", api_routes)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
        .merge(api::metrics_router())
}

async fn health_check() -> &'static str {
    "OK"
}
