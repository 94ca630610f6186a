//! Service layer
//!
//! Contains business logic separated from HTTP handlers.
//! Services orchestrate database operations and enforce the
//! watchlist/friendship rules.

pub mod batch;
mod friendships;
mod watched;
mod watchlists;

pub use batch::BatchSummary;
pub use friendships::{
    Direction, FriendshipFilter, FriendshipService, FriendshipView, RequestOutcome,
};
pub use watched::WatchedService;
pub use watchlists::{
    DeleteOutcome, MigrationOutcome, WatchlistPatch, WatchlistService, WatchlistWithCount,
};
