//! Watched-movies and legacy flat-watchlist service
//!
//! Simple per-user upsert stores keyed by `(user_id, movie_id)`.
//! Marking a movie watched optionally removes it from the legacy flat
//! watchlist in the same logical operation; the removal is
//! best-effort, not transactional.

use std::sync::Arc;

use chrono::Utc;

use crate::data::{Database, EntityId, LegacyWatchlistEntry, MovieSnapshot, WatchedMovie};
use crate::error::AppError;

/// Watched-movies service
pub struct WatchedService {
    db: Arc<Database>,
}

impl WatchedService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub async fn list(&self, owner_id: &str) -> Result<Vec<WatchedMovie>, AppError> {
        self.db.list_watched(owner_id).await
    }

    /// Mark a movie as watched.
    ///
    /// Upserts on `(user_id, movie_id)`; by default also removes the
    /// movie from the legacy flat watchlist, unless the caller opts
    /// out with `remove_from_watchlist = false`.
    pub async fn mark_watched(
        &self,
        owner_id: &str,
        snapshot: MovieSnapshot,
        rating: Option<i64>,
        notes: Option<String>,
        remove_from_watchlist: bool,
    ) -> Result<WatchedMovie, AppError> {
        snapshot.validate().map_err(AppError::Validation)?;
        if let Some(rating) = rating {
            if !(1..=10).contains(&rating) {
                return Err(AppError::Validation(
                    "rating must be between 1 and 10".to_string(),
                ));
            }
        }

        let now = Utc::now();
        let movie_id = snapshot.movie_id;
        let watched = WatchedMovie {
            id: EntityId::new().0,
            user_id: owner_id.to_string(),
            movie_id,
            title: snapshot.title,
            poster_path: snapshot.poster_path,
            release_date: snapshot.release_date,
            overview: snapshot.overview,
            vote_average: snapshot.vote_average,
            vote_count: snapshot.vote_count,
            rating,
            notes,
            watched_at: now,
            created_at: now,
        };

        self.db.upsert_watched(&watched).await?;

        if remove_from_watchlist {
            // Cross-entity side effect; a failure here must not undo
            // the watched record.
            if let Err(error) = self.db.delete_legacy_entry(owner_id, movie_id).await {
                tracing::warn!(
                    user_id = %owner_id,
                    movie_id,
                    %error,
                    "Failed to remove watched movie from legacy watchlist"
                );
            }
        }

        self.db
            .get_watched(owner_id, movie_id)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn unmark_watched(&self, owner_id: &str, movie_id: i64) -> Result<(), AppError> {
        if !self.db.delete_watched(owner_id, movie_id).await? {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    // =========================================================================
    // Legacy flat watchlist
    // =========================================================================

    pub async fn list_legacy(&self, owner_id: &str) -> Result<Vec<LegacyWatchlistEntry>, AppError> {
        self.db.list_legacy_watchlist(owner_id).await
    }

    /// Add a movie to the legacy flat list; duplicates are rejected.
    pub async fn add_legacy(
        &self,
        owner_id: &str,
        snapshot: MovieSnapshot,
    ) -> Result<LegacyWatchlistEntry, AppError> {
        snapshot.validate().map_err(AppError::Validation)?;

        let entry = LegacyWatchlistEntry {
            id: EntityId::new().0,
            user_id: owner_id.to_string(),
            movie_id: snapshot.movie_id,
            title: snapshot.title,
            poster_path: snapshot.poster_path,
            release_date: snapshot.release_date,
            overview: snapshot.overview,
            vote_average: snapshot.vote_average,
            vote_count: snapshot.vote_count,
            created_at: Utc::now(),
        };

        if !self.db.insert_legacy_entry_if_absent(&entry).await? {
            return Err(AppError::Validation(
                "Movie is already in the watchlist".to_string(),
            ));
        }

        Ok(entry)
    }

    pub async fn remove_legacy(&self, owner_id: &str, movie_id: i64) -> Result<(), AppError> {
        if !self.db.delete_legacy_entry(owner_id, movie_id).await? {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}
