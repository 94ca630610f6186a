//! Data models
//!
//! Rust structs representing database entities.
//! All models use ULID for IDs and chrono for timestamps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// ID Types
// =============================================================================

/// Entity ID wrapper (ULID format, 26 characters)
///
/// Example: "01ARZ3NDEKTSV4RRFFQ69G5FAV"
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub String);

impl EntityId {
    /// Generate a new ULID
    pub fn new() -> Self {
        Self(ulid::Ulid::new().to_string())
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalize an email for lookup: trimmed, lower-cased.
///
/// Emails are display/lookup attributes only; all foreign keys use the
/// identity provider's stable user ID.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

// =============================================================================
// User (identity directory mirror)
// =============================================================================

/// A user known to this instance.
///
/// Mirrors the identity provider's directory; upserted from verified
/// token claims on each authenticated request.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: String,
    /// Normalized (lower-cased, trimmed) email
    pub email: String,
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Friendship
// =============================================================================

/// Friendship lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FriendshipStatus {
    Pending,
    Accepted,
    Rejected,
}

impl FriendshipStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "accepted" => Some(Self::Accepted),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

/// A directional friendship row.
///
/// `requester_id` sent the request; `addressee_id` received it.
/// At most one row exists per unordered user pair (DB-enforced).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Friendship {
    pub id: String,
    pub requester_id: String,
    pub addressee_id: String,
    /// pending | accepted | rejected
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Friendship {
    /// Returns the other party's user ID relative to `user_id`.
    pub fn other_party(&self, user_id: &str) -> &str {
        if self.requester_id == user_id {
            &self.addressee_id
        } else {
            &self.requester_id
        }
    }

    /// Whether `user_id` sent this request.
    pub fn is_outgoing_for(&self, user_id: &str) -> bool {
        self.requester_id == user_id
    }
}

// =============================================================================
// Watchlist
// =============================================================================

/// Name of the always-present default list new/unsorted movies land in.
pub const DEFAULT_WATCHLIST_NAME: &str = "Невідсортоване";

/// A user-owned movie list.
///
/// Exactly one list per user has `is_default = true`; that list is
/// rename-locked and undeletable, and is created lazily on first read.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Watchlist {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    pub is_default: bool,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub sort_order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Membership of a movie in a watchlist, carrying a denormalized
/// catalog snapshot so lists render without re-querying the provider.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct WatchlistMovie {
    pub id: String,
    pub watchlist_id: String,
    pub user_id: String,
    pub movie_id: i64,
    pub title: String,
    pub poster_path: Option<String>,
    pub release_date: Option<String>,
    pub overview: Option<String>,
    pub vote_average: Option<f64>,
    pub vote_count: Option<i64>,
    pub notes: Option<String>,
    pub priority: Option<i64>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Watched / legacy watchlist
// =============================================================================

/// A movie the user has marked as watched.
///
/// One row per `(user_id, movie_id)`, maintained by upsert.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct WatchedMovie {
    pub id: String,
    pub user_id: String,
    pub movie_id: i64,
    pub title: String,
    pub poster_path: Option<String>,
    pub release_date: Option<String>,
    pub overview: Option<String>,
    pub vote_average: Option<f64>,
    pub vote_count: Option<i64>,
    /// Personal 1-10 rating
    pub rating: Option<i64>,
    pub notes: Option<String>,
    pub watched_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// A row in the legacy single flat watchlist, superseded by
/// multi-list watchlists but retained as the migration source.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct LegacyWatchlistEntry {
    pub id: String,
    pub user_id: String,
    pub movie_id: i64,
    pub title: String,
    pub poster_path: Option<String>,
    pub release_date: Option<String>,
    pub overview: Option<String>,
    pub vote_average: Option<f64>,
    pub vote_count: Option<i64>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Movie snapshot
// =============================================================================

/// Denormalized subset of catalog metadata persisted alongside
/// memberships and records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieSnapshot {
    pub movie_id: i64,
    pub title: String,
    pub poster_path: Option<String>,
    pub release_date: Option<String>,
    pub overview: Option<String>,
    pub vote_average: Option<f64>,
    pub vote_count: Option<i64>,
}

impl MovieSnapshot {
    /// Validate required fields; returns a friendly message on failure.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.movie_id <= 0 {
            return Err("movie_id must be a positive integer".to_string());
        }
        if self.title.trim().is_empty() {
            return Err("title cannot be empty".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_email_trims_and_lowercases() {
        assert_eq!(normalize_email("  A@X.Com "), "a@x.com");
    }

    #[test]
    fn friendship_direction_helpers() {
        let row = Friendship {
            id: EntityId::new().0,
            requester_id: "user-a".to_string(),
            addressee_id: "user-b".to_string(),
            status: "pending".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert!(row.is_outgoing_for("user-a"));
        assert!(!row.is_outgoing_for("user-b"));
        assert_eq!(row.other_party("user-a"), "user-b");
        assert_eq!(row.other_party("user-b"), "user-a");
    }

    #[test]
    fn snapshot_validation() {
        let snapshot = MovieSnapshot {
            movie_id: 550,
            title: "Fight Club".to_string(),
            poster_path: None,
            release_date: None,
            overview: None,
            vote_average: Some(8.4),
            vote_count: Some(26000),
        };
        assert!(snapshot.validate().is_ok());

        let mut bad = snapshot.clone();
        bad.movie_id = 0;
        assert!(bad.validate().is_err());

        let mut bad = snapshot;
        bad.title = "  ".to_string();
        assert!(bad.validate().is_err());
    }
}
