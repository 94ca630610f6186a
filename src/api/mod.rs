//! API layer
//!
//! HTTP handlers for:
//! - Friendships
//! - Watchlists (multi-list + legacy flat list)
//! - Watched archive
//! - Catalog proxy
//! - Streaming-source search
//! - Metrics (Prometheus)

mod catalog;
mod friends;
pub mod metrics;
mod sources;
mod watched;
mod watchlists;

pub use catalog::catalog_router;
pub use friends::friends_router;
pub use metrics::metrics_router;
pub use sources::sources_router;
pub use watched::watched_router;
pub use watchlists::watchlists_router;
