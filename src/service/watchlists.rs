//! Watchlist service
//!
//! Multi-list watchlists with a single always-present default list.
//! The default list is created lazily on first read, cannot be
//! renamed or deleted, and receives the members of any deleted list.

use std::sync::Arc;

use chrono::Utc;

use super::batch::{self, BatchSummary, ItemOutcome};
use crate::data::{
    DEFAULT_WATCHLIST_NAME, Database, EntityId, MovieSnapshot, Watchlist, WatchlistMovie,
};
use crate::error::AppError;

/// A watchlist with its movie count, as returned by listings.
#[derive(Debug, Clone)]
pub struct WatchlistWithCount {
    pub watchlist: Watchlist,
    pub movie_count: i64,
}

/// Patch applied by the update operation; `None` fields are left as-is.
#[derive(Debug, Clone, Default)]
pub struct WatchlistPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub sort_order: Option<i64>,
}

/// Result of deleting a list, reporting the member-movie move.
#[derive(Debug, Clone)]
pub struct DeleteOutcome {
    pub moved: BatchSummary,
}

/// Result of migrating the legacy flat watchlist.
#[derive(Debug, Clone)]
pub struct MigrationOutcome {
    pub summary: BatchSummary,
    pub total: usize,
}

/// Watchlist service
pub struct WatchlistService {
    db: Arc<Database>,
}

impl WatchlistService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Ensure the user's default list exists and return it.
    ///
    /// Idempotent repair: the conditional insert is atomic, so two
    /// concurrent callers cannot create two defaults.
    pub async fn ensure_default(&self, owner_id: &str) -> Result<Watchlist, AppError> {
        if let Some(existing) = self.db.get_default_watchlist(owner_id).await? {
            return Ok(existing);
        }

        let now = Utc::now();
        let candidate = Watchlist {
            id: EntityId::new().0,
            user_id: owner_id.to_string(),
            name: DEFAULT_WATCHLIST_NAME.to_string(),
            description: None,
            is_default: true,
            color: None,
            icon: None,
            sort_order: 0,
            created_at: now,
            updated_at: now,
        };

        if self.db.insert_default_watchlist_if_absent(&candidate).await? {
            tracing::info!(user_id = %owner_id, "Created default watchlist");
            return Ok(candidate);
        }

        // Lost the race to another repair; read theirs.
        self.db
            .get_default_watchlist(owner_id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("default watchlist vanished")))
    }

    /// List all of the owner's lists, repairing the default if absent.
    pub async fn list(&self, owner_id: &str) -> Result<Vec<WatchlistWithCount>, AppError> {
        self.ensure_default(owner_id).await?;

        let lists = self.db.list_watchlists(owner_id).await?;
        let counts = self.db.count_watchlist_movies(owner_id).await?;

        Ok(lists
            .into_iter()
            .map(|watchlist| {
                let movie_count = counts
                    .iter()
                    .find(|(id, _)| *id == watchlist.id)
                    .map(|(_, count)| *count)
                    .unwrap_or(0);
                WatchlistWithCount {
                    watchlist,
                    movie_count,
                }
            })
            .collect())
    }

    /// Create a new (non-default) list.
    pub async fn create(
        &self,
        owner_id: &str,
        name: &str,
        description: Option<String>,
        color: Option<String>,
        icon: Option<String>,
    ) -> Result<Watchlist, AppError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Name cannot be empty".to_string()));
        }
        if self.db.watchlist_name_exists(owner_id, name, None).await? {
            return Err(AppError::Validation(format!(
                "A watchlist named \"{name}\" already exists"
            )));
        }

        let now = Utc::now();
        let watchlist = Watchlist {
            id: EntityId::new().0,
            user_id: owner_id.to_string(),
            name: name.to_string(),
            description,
            is_default: false,
            color,
            icon,
            sort_order: self.db.max_watchlist_sort_order(owner_id).await? + 1,
            created_at: now,
            updated_at: now,
        };

        match self.db.insert_watchlist(&watchlist).await {
            Ok(()) => Ok(watchlist),
            Err(AppError::Database(sqlx::Error::Database(db_err)))
                if db_err.is_unique_violation() =>
            {
                Err(AppError::Validation(format!(
                    "A watchlist named \"{name}\" already exists"
                )))
            }
            Err(error) => Err(error),
        }
    }

    /// Fetch a list owned by the caller; absence and foreign ownership
    /// are both 404.
    pub async fn get_owned(&self, owner_id: &str, id: &str) -> Result<Watchlist, AppError> {
        let watchlist = self.db.get_watchlist(id).await?.ok_or(AppError::NotFound)?;
        if watchlist.user_id != owner_id {
            return Err(AppError::NotFound);
        }
        Ok(watchlist)
    }

    /// Fetch a list plus its members.
    pub async fn get_with_movies(
        &self,
        owner_id: &str,
        id: &str,
    ) -> Result<(Watchlist, Vec<WatchlistMovie>), AppError> {
        let watchlist = self.get_owned(owner_id, id).await?;
        let movies = self.db.list_watchlist_movies(&watchlist.id).await?;
        Ok((watchlist, movies))
    }

    /// All of a user's lists with their movies, for the read-only
    /// friend view. The default is repaired first so the shape matches
    /// what the owner sees.
    pub async fn lists_with_movies(
        &self,
        owner_id: &str,
    ) -> Result<Vec<(Watchlist, Vec<WatchlistMovie>)>, AppError> {
        self.ensure_default(owner_id).await?;

        let lists = self.db.list_watchlists(owner_id).await?;
        let mut result = Vec::with_capacity(lists.len());
        for watchlist in lists {
            let movies = self.db.list_watchlist_movies(&watchlist.id).await?;
            result.push((watchlist, movies));
        }
        Ok(result)
    }

    /// Apply a patch to a list.
    ///
    /// The default list's name is immutable: a name change on it is
    /// rejected while the remaining fields still apply.
    pub async fn update(
        &self,
        owner_id: &str,
        id: &str,
        patch: WatchlistPatch,
    ) -> Result<Watchlist, AppError> {
        let mut watchlist = self.get_owned(owner_id, id).await?;

        if let Some(name) = patch.name {
            let name = name.trim().to_string();
            if watchlist.is_default {
                if name != watchlist.name {
                    return Err(AppError::Validation(
                        "The default watchlist cannot be renamed".to_string(),
                    ));
                }
            } else {
                if name.is_empty() {
                    return Err(AppError::Validation("Name cannot be empty".to_string()));
                }
                if self
                    .db
                    .watchlist_name_exists(owner_id, &name, Some(id))
                    .await?
                {
                    return Err(AppError::Validation(format!(
                        "A watchlist named \"{name}\" already exists"
                    )));
                }
                watchlist.name = name;
            }
        }
        if let Some(description) = patch.description {
            watchlist.description = Some(description);
        }
        if let Some(color) = patch.color {
            watchlist.color = Some(color);
        }
        if let Some(icon) = patch.icon {
            watchlist.icon = Some(icon);
        }
        if let Some(sort_order) = patch.sort_order {
            watchlist.sort_order = sort_order;
        }
        watchlist.updated_at = Utc::now();

        if !self.db.update_watchlist(&watchlist).await? {
            return Err(AppError::NotFound);
        }
        Ok(watchlist)
    }

    /// Delete a non-default list.
    ///
    /// Its members are moved into the default list (created if somehow
    /// missing), skipping movies already present there; the move is a
    /// best-effort batch and its summary is part of the outcome.
    /// The union of movies across all lists never shrinks.
    pub async fn delete(&self, owner_id: &str, id: &str) -> Result<DeleteOutcome, AppError> {
        let watchlist = self.get_owned(owner_id, id).await?;
        if watchlist.is_default {
            return Err(AppError::Validation(
                "The default watchlist cannot be deleted".to_string(),
            ));
        }

        let default = self.ensure_default(owner_id).await?;
        let movies = self.db.list_watchlist_movies(&watchlist.id).await?;

        let db = Arc::clone(&self.db);
        let default_id = default.id.clone();
        let moved = batch::run(movies, |movie| movie.movie_id, move |movie| {
            let db = Arc::clone(&db);
            let default_id = default_id.clone();
            async move {
                let relocated = WatchlistMovie {
                    id: EntityId::new().0,
                    watchlist_id: default_id,
                    created_at: Utc::now(),
                    ..movie
                };
                if db.insert_watchlist_movie_if_absent(&relocated).await? {
                    Ok(ItemOutcome::Applied)
                } else {
                    Ok(ItemOutcome::Skipped)
                }
            }
        })
        .await;

        // Membership rows of the deleted list go with it via cascade.
        if !self.db.delete_watchlist(&watchlist.id).await? {
            return Err(AppError::NotFound);
        }

        tracing::info!(
            watchlist_id = %watchlist.id,
            moved = moved.succeeded,
            skipped = moved.skipped,
            failed = moved.failed,
            "Deleted watchlist; members moved to default"
        );

        Ok(DeleteOutcome { moved })
    }

    /// Add a movie to a list, updating the snapshot in place if the
    /// membership already exists. List ownership is re-verified.
    pub async fn add_movie(
        &self,
        owner_id: &str,
        watchlist_id: &str,
        snapshot: MovieSnapshot,
        notes: Option<String>,
        priority: Option<i64>,
    ) -> Result<WatchlistMovie, AppError> {
        snapshot.validate().map_err(AppError::Validation)?;
        let watchlist = self.get_owned(owner_id, watchlist_id).await?;

        let movie = WatchlistMovie {
            id: EntityId::new().0,
            watchlist_id: watchlist.id.clone(),
            user_id: owner_id.to_string(),
            movie_id: snapshot.movie_id,
            title: snapshot.title,
            poster_path: snapshot.poster_path,
            release_date: snapshot.release_date,
            overview: snapshot.overview,
            vote_average: snapshot.vote_average,
            vote_count: snapshot.vote_count,
            notes,
            priority,
            created_at: Utc::now(),
        };

        self.db.upsert_watchlist_movie(&movie).await?;

        // On conflict the pre-existing row identity survives; re-read.
        self.db
            .get_watchlist_movie(&watchlist.id, movie.movie_id)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// Update a membership's notes/priority annotations.
    pub async fn update_movie(
        &self,
        owner_id: &str,
        watchlist_id: &str,
        movie_id: i64,
        notes: Option<String>,
        priority: Option<i64>,
    ) -> Result<WatchlistMovie, AppError> {
        let watchlist = self.get_owned(owner_id, watchlist_id).await?;

        let existing = self
            .db
            .get_watchlist_movie(&watchlist.id, movie_id)
            .await?
            .ok_or(AppError::NotFound)?;

        let notes = notes.or(existing.notes);
        let priority = priority.or(existing.priority);
        self.db
            .update_watchlist_movie_annotations(&watchlist.id, movie_id, notes.as_deref(), priority)
            .await?;

        self.db
            .get_watchlist_movie(&watchlist.id, movie_id)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// Remove a movie from a list.
    pub async fn remove_movie(
        &self,
        owner_id: &str,
        watchlist_id: &str,
        movie_id: i64,
    ) -> Result<(), AppError> {
        let watchlist = self.get_owned(owner_id, watchlist_id).await?;

        if !self.db.delete_watchlist_movie(&watchlist.id, movie_id).await? {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    /// Copy all legacy flat-watchlist rows into the default list,
    /// skipping movies already present there.
    ///
    /// Non-destructive and re-runnable: legacy rows are never deleted,
    /// and a second run reports zero migrated / all skipped.
    pub async fn migrate_legacy(&self, owner_id: &str) -> Result<MigrationOutcome, AppError> {
        let default = self.ensure_default(owner_id).await?;
        let entries = self.db.list_legacy_watchlist(owner_id).await?;
        let total = entries.len();

        let db = Arc::clone(&self.db);
        let default_id = default.id.clone();
        let owner = owner_id.to_string();
        let summary = batch::run(entries, |entry| entry.movie_id, move |entry| {
            let db = Arc::clone(&db);
            let default_id = default_id.clone();
            let owner = owner.clone();
            async move {
                let movie = WatchlistMovie {
                    id: EntityId::new().0,
                    watchlist_id: default_id,
                    user_id: owner,
                    movie_id: entry.movie_id,
                    title: entry.title,
                    poster_path: entry.poster_path,
                    release_date: entry.release_date,
                    overview: entry.overview,
                    vote_average: entry.vote_average,
                    vote_count: entry.vote_count,
                    notes: None,
                    priority: None,
                    created_at: Utc::now(),
                };
                if db.insert_watchlist_movie_if_absent(&movie).await? {
                    Ok(ItemOutcome::Applied)
                } else {
                    Ok(ItemOutcome::Skipped)
                }
            }
        })
        .await;

        tracing::info!(
            user_id = %owner_id,
            migrated = summary.succeeded,
            skipped = summary.skipped,
            failed = summary.failed,
            "Legacy watchlist migration finished"
        );

        Ok(MigrationOutcome { summary, total })
    }
}
