//! SQLite database operations
//!
//! All database access goes through this module.
//! Uniqueness and cardinality invariants live in the schema
//! (unique indexes, conditional inserts, upserts); callers treat
//! application-level pre-checks purely as a way to produce
//! friendlier errors.

use std::path::Path;

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};

use super::models::*;
use crate::error::AppError;

/// Database connection pool wrapper.
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    // =========================================================================
    // Connection
    // =========================================================================

    /// Connect to SQLite database
    ///
    /// Creates the database file if it doesn't exist.
    /// Runs pending migrations automatically.
    ///
    /// # Errors
    /// Returns error if connection or migration fails
    pub async fn connect(path: &Path) -> Result<Self, AppError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| AppError::Database(sqlx::Error::Io(e)))?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new().connect_with(options).await?;

        sqlx::migrate!("./migrations").run(&pool).await.map_err(|e| {
            tracing::error!("Migration failed: {}", e);
            AppError::Internal(anyhow::anyhow!("Migration failed: {}", e))
        })?;

        tracing::info!("Database connected and migrated successfully");

        Ok(Self { pool })
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// Insert or refresh a user from verified token claims.
    ///
    /// The ID is the identity provider's stable subject; email and
    /// display name are refreshed on every call.
    pub async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, display_name, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT (id) DO UPDATE SET
                email = excluded.email,
                display_name = excluded.display_name,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.display_name)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_user(&self, id: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Look up a user by normalized email.
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    // =========================================================================
    // Friendships
    // =========================================================================

    pub async fn get_friendship(&self, id: &str) -> Result<Option<Friendship>, AppError> {
        let row = sqlx::query_as::<_, Friendship>("SELECT * FROM friendships WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    /// Get the single friendship row between two users, regardless of
    /// which side sent the request.
    pub async fn get_friendship_between(
        &self,
        user_a: &str,
        user_b: &str,
    ) -> Result<Option<Friendship>, AppError> {
        let row = sqlx::query_as::<_, Friendship>(
            r#"
            SELECT * FROM friendships
            WHERE (requester_id = ? AND addressee_id = ?)
               OR (requester_id = ? AND addressee_id = ?)
            "#,
        )
        .bind(user_a)
        .bind(user_b)
        .bind(user_b)
        .bind(user_a)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// All friendship rows where the user is either party, newest first.
    pub async fn list_friendships_for(&self, user_id: &str) -> Result<Vec<Friendship>, AppError> {
        let rows = sqlx::query_as::<_, Friendship>(
            r#"
            SELECT * FROM friendships
            WHERE requester_id = ? OR addressee_id = ?
            ORDER BY updated_at DESC
            "#,
        )
        .bind(user_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Insert a new pending friendship row.
    ///
    /// The pair-unique index makes a concurrent duplicate insert fail;
    /// callers map that constraint violation to "already sent".
    pub async fn insert_friendship(&self, friendship: &Friendship) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO friendships (id, requester_id, addressee_id, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&friendship.id)
        .bind(&friendship.requester_id)
        .bind(&friendship.addressee_id)
        .bind(&friendship.status)
        .bind(friendship.created_at)
        .bind(friendship.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Transition a friendship row out of `pending`.
    ///
    /// The `status = 'pending'` guard makes a second respond a no-op
    /// at the SQL level.
    ///
    /// # Returns
    /// `true` if the row was still pending and got updated.
    pub async fn update_friendship_status_if_pending(
        &self,
        id: &str,
        status: FriendshipStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE friendships
            SET status = ?, updated_at = ?
            WHERE id = ? AND status = 'pending'
            "#,
        )
        .bind(status.as_str())
        .bind(updated_at)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Revive an existing row as a fresh pending request from `requester_id`.
    ///
    /// Used when a new request arrives for a pair that already has a
    /// rejected row; keeps the one-row-per-pair invariant.
    pub async fn reset_friendship_to_pending(
        &self,
        id: &str,
        requester_id: &str,
        addressee_id: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE friendships
            SET requester_id = ?, addressee_id = ?, status = 'pending', updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(requester_id)
        .bind(addressee_id)
        .bind(updated_at)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// # Returns
    /// `true` if a row was deleted.
    pub async fn delete_friendship(&self, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM friendships WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    // =========================================================================
    // Watchlists
    // =========================================================================

    pub async fn list_watchlists(&self, user_id: &str) -> Result<Vec<Watchlist>, AppError> {
        let rows = sqlx::query_as::<_, Watchlist>(
            r#"
            SELECT * FROM watchlists
            WHERE user_id = ?
            ORDER BY sort_order ASC, created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn get_watchlist(&self, id: &str) -> Result<Option<Watchlist>, AppError> {
        let row = sqlx::query_as::<_, Watchlist>("SELECT * FROM watchlists WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    pub async fn get_default_watchlist(&self, user_id: &str) -> Result<Option<Watchlist>, AppError> {
        let row = sqlx::query_as::<_, Watchlist>(
            "SELECT * FROM watchlists WHERE user_id = ? AND is_default = 1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Insert the default watchlist only when the user has none.
    ///
    /// Atomic at the SQL statement level, so concurrent lazy repairs
    /// cannot create two defaults.
    ///
    /// # Returns
    /// `true` if inserted, `false` if a default already existed.
    pub async fn insert_default_watchlist_if_absent(
        &self,
        watchlist: &Watchlist,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO watchlists (
                id, user_id, name, description, is_default, color, icon,
                sort_order, created_at, updated_at
            )
            SELECT ?, ?, ?, ?, 1, ?, ?, ?, ?, ?
            WHERE NOT EXISTS (
                SELECT 1 FROM watchlists WHERE user_id = ? AND is_default = 1
            )
            "#,
        )
        .bind(&watchlist.id)
        .bind(&watchlist.user_id)
        .bind(&watchlist.name)
        .bind(&watchlist.description)
        .bind(&watchlist.color)
        .bind(&watchlist.icon)
        .bind(watchlist.sort_order)
        .bind(watchlist.created_at)
        .bind(watchlist.updated_at)
        .bind(&watchlist.user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Whether the user already has a list with this name, optionally
    /// excluding one list (for rename checks).
    pub async fn watchlist_name_exists(
        &self,
        user_id: &str,
        name: &str,
        exclude_id: Option<&str>,
    ) -> Result<bool, AppError> {
        let count = match exclude_id {
            Some(exclude_id) => {
                sqlx::query_scalar::<_, i64>(
                    "SELECT COUNT(*) FROM watchlists WHERE user_id = ? AND name = ? AND id <> ?",
                )
                .bind(user_id)
                .bind(name)
                .bind(exclude_id)
                .fetch_one(&self.pool)
                .await?
            }
            None => {
                sqlx::query_scalar::<_, i64>(
                    "SELECT COUNT(*) FROM watchlists WHERE user_id = ? AND name = ?",
                )
                .bind(user_id)
                .bind(name)
                .fetch_one(&self.pool)
                .await?
            }
        };

        Ok(count > 0)
    }

    pub async fn max_watchlist_sort_order(&self, user_id: &str) -> Result<i64, AppError> {
        let max = sqlx::query_scalar::<_, Option<i64>>(
            "SELECT MAX(sort_order) FROM watchlists WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(max.unwrap_or(0))
    }

    pub async fn insert_watchlist(&self, watchlist: &Watchlist) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO watchlists (
                id, user_id, name, description, is_default, color, icon,
                sort_order, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&watchlist.id)
        .bind(&watchlist.user_id)
        .bind(&watchlist.name)
        .bind(&watchlist.description)
        .bind(watchlist.is_default)
        .bind(&watchlist.color)
        .bind(&watchlist.icon)
        .bind(watchlist.sort_order)
        .bind(watchlist.created_at)
        .bind(watchlist.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Write back a fully patched watchlist row.
    ///
    /// # Returns
    /// `true` if a row was updated.
    pub async fn update_watchlist(&self, watchlist: &Watchlist) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE watchlists
            SET name = ?, description = ?, color = ?, icon = ?,
                sort_order = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&watchlist.name)
        .bind(&watchlist.description)
        .bind(&watchlist.color)
        .bind(&watchlist.icon)
        .bind(watchlist.sort_order)
        .bind(watchlist.updated_at)
        .bind(&watchlist.id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Delete a list; membership rows go with it via ON DELETE CASCADE.
    pub async fn delete_watchlist(&self, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM watchlists WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Movie counts per list for one user.
    pub async fn count_watchlist_movies(&self, user_id: &str) -> Result<Vec<(String, i64)>, AppError> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            r#"
            SELECT watchlist_id, COUNT(*) FROM watchlist_movies
            WHERE user_id = ?
            GROUP BY watchlist_id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    // =========================================================================
    // Watchlist movies
    // =========================================================================

    pub async fn list_watchlist_movies(
        &self,
        watchlist_id: &str,
    ) -> Result<Vec<WatchlistMovie>, AppError> {
        let rows = sqlx::query_as::<_, WatchlistMovie>(
            r#"
            SELECT * FROM watchlist_movies
            WHERE watchlist_id = ?
            ORDER BY created_at DESC
            "#,
        )
        .bind(watchlist_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn get_watchlist_movie(
        &self,
        watchlist_id: &str,
        movie_id: i64,
    ) -> Result<Option<WatchlistMovie>, AppError> {
        let row = sqlx::query_as::<_, WatchlistMovie>(
            "SELECT * FROM watchlist_movies WHERE watchlist_id = ? AND movie_id = ?",
        )
        .bind(watchlist_id)
        .bind(movie_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Add a movie to a list, updating the snapshot in place when the
    /// membership already exists.
    pub async fn upsert_watchlist_movie(&self, movie: &WatchlistMovie) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO watchlist_movies (
                id, watchlist_id, user_id, movie_id, title, poster_path,
                release_date, overview, vote_average, vote_count, notes,
                priority, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (watchlist_id, movie_id) DO UPDATE SET
                title = excluded.title,
                poster_path = excluded.poster_path,
                release_date = excluded.release_date,
                overview = excluded.overview,
                vote_average = excluded.vote_average,
                vote_count = excluded.vote_count,
                notes = excluded.notes,
                priority = excluded.priority
            "#,
        )
        .bind(&movie.id)
        .bind(&movie.watchlist_id)
        .bind(&movie.user_id)
        .bind(movie.movie_id)
        .bind(&movie.title)
        .bind(&movie.poster_path)
        .bind(&movie.release_date)
        .bind(&movie.overview)
        .bind(movie.vote_average)
        .bind(movie.vote_count)
        .bind(&movie.notes)
        .bind(movie.priority)
        .bind(movie.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Add a movie to a list only if it isn't already a member.
    ///
    /// Used by list-deletion moves and migration, where existing
    /// members must be skipped rather than overwritten.
    ///
    /// # Returns
    /// `true` if inserted, `false` if the movie was already present.
    pub async fn insert_watchlist_movie_if_absent(
        &self,
        movie: &WatchlistMovie,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO watchlist_movies (
                id, watchlist_id, user_id, movie_id, title, poster_path,
                release_date, overview, vote_average, vote_count, notes,
                priority, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (watchlist_id, movie_id) DO NOTHING
            "#,
        )
        .bind(&movie.id)
        .bind(&movie.watchlist_id)
        .bind(&movie.user_id)
        .bind(movie.movie_id)
        .bind(&movie.title)
        .bind(&movie.poster_path)
        .bind(&movie.release_date)
        .bind(&movie.overview)
        .bind(movie.vote_average)
        .bind(movie.vote_count)
        .bind(&movie.notes)
        .bind(movie.priority)
        .bind(movie.created_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Update the per-membership annotations (notes, priority).
    ///
    /// # Returns
    /// `true` if the membership row exists.
    pub async fn update_watchlist_movie_annotations(
        &self,
        watchlist_id: &str,
        movie_id: i64,
        notes: Option<&str>,
        priority: Option<i64>,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE watchlist_movies
            SET notes = ?, priority = ?
            WHERE watchlist_id = ? AND movie_id = ?
            "#,
        )
        .bind(notes)
        .bind(priority)
        .bind(watchlist_id)
        .bind(movie_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    pub async fn delete_watchlist_movie(
        &self,
        watchlist_id: &str,
        movie_id: i64,
    ) -> Result<bool, AppError> {
        let result =
            sqlx::query("DELETE FROM watchlist_movies WHERE watchlist_id = ? AND movie_id = ?")
                .bind(watchlist_id)
                .bind(movie_id)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() == 1)
    }

    // =========================================================================
    // Watched movies
    // =========================================================================

    pub async fn list_watched(&self, user_id: &str) -> Result<Vec<WatchedMovie>, AppError> {
        let rows = sqlx::query_as::<_, WatchedMovie>(
            r#"
            SELECT * FROM watched_movies
            WHERE user_id = ?
            ORDER BY watched_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn get_watched(
        &self,
        user_id: &str,
        movie_id: i64,
    ) -> Result<Option<WatchedMovie>, AppError> {
        let row = sqlx::query_as::<_, WatchedMovie>(
            "SELECT * FROM watched_movies WHERE user_id = ? AND movie_id = ?",
        )
        .bind(user_id)
        .bind(movie_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Mark a movie watched, refreshing the snapshot and annotations
    /// in place on re-watch.
    pub async fn upsert_watched(&self, watched: &WatchedMovie) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO watched_movies (
                id, user_id, movie_id, title, poster_path, release_date,
                overview, vote_average, vote_count, rating, notes,
                watched_at, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (user_id, movie_id) DO UPDATE SET
                title = excluded.title,
                poster_path = excluded.poster_path,
                release_date = excluded.release_date,
                overview = excluded.overview,
                vote_average = excluded.vote_average,
                vote_count = excluded.vote_count,
                rating = excluded.rating,
                notes = excluded.notes,
                watched_at = excluded.watched_at
            "#,
        )
        .bind(&watched.id)
        .bind(&watched.user_id)
        .bind(watched.movie_id)
        .bind(&watched.title)
        .bind(&watched.poster_path)
        .bind(&watched.release_date)
        .bind(&watched.overview)
        .bind(watched.vote_average)
        .bind(watched.vote_count)
        .bind(watched.rating)
        .bind(&watched.notes)
        .bind(watched.watched_at)
        .bind(watched.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn delete_watched(&self, user_id: &str, movie_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM watched_movies WHERE user_id = ? AND movie_id = ?")
            .bind(user_id)
            .bind(movie_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    // =========================================================================
    // Legacy flat watchlist
    // =========================================================================

    pub async fn list_legacy_watchlist(
        &self,
        user_id: &str,
    ) -> Result<Vec<LegacyWatchlistEntry>, AppError> {
        let rows = sqlx::query_as::<_, LegacyWatchlistEntry>(
            r#"
            SELECT * FROM legacy_watchlist
            WHERE user_id = ?
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// # Returns
    /// `true` if inserted, `false` if the movie was already present.
    pub async fn insert_legacy_entry_if_absent(
        &self,
        entry: &LegacyWatchlistEntry,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO legacy_watchlist (
                id, user_id, movie_id, title, poster_path, release_date,
                overview, vote_average, vote_count, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (user_id, movie_id) DO NOTHING
            "#,
        )
        .bind(&entry.id)
        .bind(&entry.user_id)
        .bind(entry.movie_id)
        .bind(&entry.title)
        .bind(&entry.poster_path)
        .bind(&entry.release_date)
        .bind(&entry.overview)
        .bind(entry.vote_average)
        .bind(entry.vote_count)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    pub async fn delete_legacy_entry(
        &self,
        user_id: &str,
        movie_id: i64,
    ) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM legacy_watchlist WHERE user_id = ? AND movie_id = ?")
            .bind(user_id)
            .bind(movie_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }
}
