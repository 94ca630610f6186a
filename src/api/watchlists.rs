//! Watchlist endpoints (multi-list)

use axum::{
    Router,
    extract::{Path, State},
    response::Json,
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::auth::CurrentUser;
use crate::data::{MovieSnapshot, Watchlist, WatchlistMovie};
use crate::error::AppError;
use crate::metrics::HTTP_REQUESTS_TOTAL;
use crate::service::{WatchlistPatch, WatchlistService, WatchlistWithCount};

/// Watchlist response
#[derive(Debug, Serialize)]
pub struct WatchlistResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub is_default: bool,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub sort_order: i64,
    pub movie_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WatchlistResponse {
    fn from_watchlist(watchlist: Watchlist, movie_count: i64) -> Self {
        Self {
            id: watchlist.id,
            name: watchlist.name,
            description: watchlist.description,
            is_default: watchlist.is_default,
            color: watchlist.color,
            icon: watchlist.icon,
            sort_order: watchlist.sort_order,
            movie_count,
            created_at: watchlist.created_at,
            updated_at: watchlist.updated_at,
        }
    }
}

impl From<WatchlistWithCount> for WatchlistResponse {
    fn from(item: WatchlistWithCount) -> Self {
        Self::from_watchlist(item.watchlist, item.movie_count)
    }
}

/// Watchlist with its member movies
#[derive(Debug, Serialize)]
pub struct WatchlistWithMoviesResponse {
    #[serde(flatten)]
    pub watchlist: WatchlistResponse,
    pub movies: Vec<WatchlistMovie>,
}

impl From<(Watchlist, Vec<WatchlistMovie>)> for WatchlistWithMoviesResponse {
    fn from((watchlist, movies): (Watchlist, Vec<WatchlistMovie>)) -> Self {
        let movie_count = movies.len() as i64;
        Self {
            watchlist: WatchlistResponse::from_watchlist(watchlist, movie_count),
            movies,
        }
    }
}

/// Create watchlist request
#[derive(Debug, Deserialize)]
pub struct CreateWatchlistRequest {
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
}

/// Update watchlist request
#[derive(Debug, Deserialize)]
pub struct UpdateWatchlistRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub sort_order: Option<i64>,
}

/// Add movie request: catalog snapshot plus per-list annotations
#[derive(Debug, Deserialize)]
pub struct AddMovieRequest {
    #[serde(flatten)]
    pub movie: MovieSnapshot,
    pub notes: Option<String>,
    pub priority: Option<i64>,
}

/// Update movie annotations request
#[derive(Debug, Deserialize)]
pub struct UpdateMovieRequest {
    pub notes: Option<String>,
    pub priority: Option<i64>,
}

/// GET /api/watchlists
/// All of the caller's lists, default repaired if missing
pub async fn list_watchlists(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<WatchlistResponse>>, AppError> {
    let lists = WatchlistService::new(state.db.clone())
        .list(&user.id)
        .await?;

    // Record successful request
    HTTP_REQUESTS_TOTAL
        .with_label_values(&["GET", "/api/watchlists", "200"])
        .inc();

    Ok(Json(lists.into_iter().map(Into::into).collect()))
}

/// POST /api/watchlists
pub async fn create_watchlist(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<CreateWatchlistRequest>,
) -> Result<Json<WatchlistResponse>, AppError> {
    let watchlist = WatchlistService::new(state.db.clone())
        .create(&user.id, &req.name, req.description, req.color, req.icon)
        .await?;

    Ok(Json(WatchlistResponse::from_watchlist(watchlist, 0)))
}

/// GET /api/watchlists/:id
/// One list with its movies
pub async fn get_watchlist(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<WatchlistWithMoviesResponse>, AppError> {
    let list_with_movies = WatchlistService::new(state.db.clone())
        .get_with_movies(&user.id, &id)
        .await?;

    Ok(Json(list_with_movies.into()))
}

/// PATCH /api/watchlists/:id
pub async fn update_watchlist(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateWatchlistRequest>,
) -> Result<Json<WatchlistResponse>, AppError> {
    let service = WatchlistService::new(state.db.clone());
    let patch = WatchlistPatch {
        name: req.name,
        description: req.description,
        color: req.color,
        icon: req.icon,
        sort_order: req.sort_order,
    };
    let watchlist = service.update(&user.id, &id, patch).await?;

    let movie_count = state
        .db
        .list_watchlist_movies(&watchlist.id)
        .await?
        .len() as i64;
    Ok(Json(WatchlistResponse::from_watchlist(
        watchlist,
        movie_count,
    )))
}

/// DELETE /api/watchlists/:id
/// Deletes the list; members are moved to the default list first
pub async fn delete_watchlist(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let outcome = WatchlistService::new(state.db.clone())
        .delete(&user.id, &id)
        .await?;

    Ok(Json(serde_json::json!({
        "moved": outcome.moved.succeeded,
        "skipped": outcome.moved.skipped,
        "failed": outcome.moved.failed,
        "failed_movie_ids": outcome.moved.failed_ids,
    })))
}

/// GET /api/watchlists/:id/movies
pub async fn list_watchlist_movies(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Vec<WatchlistMovie>>, AppError> {
    let (_, movies) = WatchlistService::new(state.db.clone())
        .get_with_movies(&user.id, &id)
        .await?;

    Ok(Json(movies))
}

/// POST /api/watchlists/:id/movies
/// Upsert: re-adding an existing movie refreshes its snapshot
pub async fn add_watchlist_movie(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<AddMovieRequest>,
) -> Result<Json<WatchlistMovie>, AppError> {
    let movie = WatchlistService::new(state.db.clone())
        .add_movie(&user.id, &id, req.movie, req.notes, req.priority)
        .await?;

    Ok(Json(movie))
}

/// PATCH /api/watchlists/:id/movies/:movie_id
pub async fn update_watchlist_movie(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((id, movie_id)): Path<(String, i64)>,
    Json(req): Json<UpdateMovieRequest>,
) -> Result<Json<WatchlistMovie>, AppError> {
    let movie = WatchlistService::new(state.db.clone())
        .update_movie(&user.id, &id, movie_id, req.notes, req.priority)
        .await?;

    Ok(Json(movie))
}

/// DELETE /api/watchlists/:id/movies/:movie_id
pub async fn remove_watchlist_movie(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((id, movie_id)): Path<(String, i64)>,
) -> Result<Json<serde_json::Value>, AppError> {
    WatchlistService::new(state.db.clone())
        .remove_movie(&user.id, &id, movie_id)
        .await?;

    Ok(Json(serde_json::json!({})))
}

/// POST /api/migrate-watchlist
/// Copy the legacy flat watchlist into the default list
pub async fn migrate_watchlist(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<serde_json::Value>, AppError> {
    let outcome = WatchlistService::new(state.db.clone())
        .migrate_legacy(&user.id)
        .await?;

    Ok(Json(serde_json::json!({
        "migrated": outcome.summary.succeeded,
        "skipped": outcome.summary.skipped,
        "failed": outcome.summary.failed,
        "failed_movie_ids": outcome.summary.failed_ids,
        "total": outcome.total,
    })))
}

/// Create watchlists router
pub fn watchlists_router() -> Router<AppState> {
    Router::new()
        .route("/watchlists", get(list_watchlists).post(create_watchlist))
        .route(
            "/watchlists/:id",
            get(get_watchlist)
                .patch(update_watchlist)
                .delete(delete_watchlist),
        )
        .route(
            "/watchlists/:id/movies",
            get(list_watchlist_movies).post(add_watchlist_movie),
        )
        .route(
            "/watchlists/:id/movies/:movie_id",
            axum::routing::patch(update_watchlist_movie).delete(remove_watchlist_movie),
        )
        .route("/migrate-watchlist", axum::routing::post(migrate_watchlist))
}
