//! Watched-archive and legacy flat-watchlist endpoints

use axum::{
    Router,
    extract::{Path, State},
    response::Json,
    routing::get,
};
use serde::Deserialize;

use crate::AppState;
use crate::auth::CurrentUser;
use crate::data::{LegacyWatchlistEntry, MovieSnapshot, WatchedMovie};
use crate::error::AppError;
use crate::service::WatchedService;

fn default_remove_from_watchlist() -> bool {
    true
}

/// Mark-watched request
#[derive(Debug, Deserialize)]
pub struct MarkWatchedRequest {
    #[serde(flatten)]
    pub movie: MovieSnapshot,
    /// Personal 1-10 rating
    pub rating: Option<i64>,
    pub notes: Option<String>,
    /// Also drop the movie from the legacy flat watchlist (default)
    #[serde(default = "default_remove_from_watchlist")]
    pub remove_from_watchlist: bool,
}

/// Legacy add request: just the catalog snapshot
#[derive(Debug, Deserialize)]
pub struct AddLegacyRequest {
    #[serde(flatten)]
    pub movie: MovieSnapshot,
}

/// GET /api/watched
pub async fn list_watched(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<WatchedMovie>>, AppError> {
    let movies = WatchedService::new(state.db.clone()).list(&user.id).await?;
    Ok(Json(movies))
}

/// POST /api/watched
/// Upsert on (user, movie); re-marking refreshes rating/notes
pub async fn mark_watched(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<MarkWatchedRequest>,
) -> Result<Json<WatchedMovie>, AppError> {
    let watched = WatchedService::new(state.db.clone())
        .mark_watched(
            &user.id,
            req.movie,
            req.rating,
            req.notes,
            req.remove_from_watchlist,
        )
        .await?;

    Ok(Json(watched))
}

/// DELETE /api/watched/:movie_id
pub async fn unmark_watched(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(movie_id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    WatchedService::new(state.db.clone())
        .unmark_watched(&user.id, movie_id)
        .await?;

    Ok(Json(serde_json::json!({})))
}

/// GET /api/watchlist (legacy flat list)
pub async fn list_legacy(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<LegacyWatchlistEntry>>, AppError> {
    let entries = WatchedService::new(state.db.clone())
        .list_legacy(&user.id)
        .await?;
    Ok(Json(entries))
}

/// POST /api/watchlist (legacy flat list; duplicates rejected)
pub async fn add_legacy(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<AddLegacyRequest>,
) -> Result<Json<LegacyWatchlistEntry>, AppError> {
    let entry = WatchedService::new(state.db.clone())
        .add_legacy(&user.id, req.movie)
        .await?;

    Ok(Json(entry))
}

/// DELETE /api/watchlist/:movie_id (legacy flat list)
pub async fn remove_legacy(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(movie_id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    WatchedService::new(state.db.clone())
        .remove_legacy(&user.id, movie_id)
        .await?;

    Ok(Json(serde_json::json!({})))
}

/// Create watched + legacy watchlist router
pub fn watched_router() -> Router<AppState> {
    Router::new()
        .route("/watched", get(list_watched).post(mark_watched))
        .route("/watched/:movie_id", axum::routing::delete(unmark_watched))
        .route("/watchlist", get(list_legacy).post(add_legacy))
        .route("/watchlist/:movie_id", axum::routing::delete(remove_legacy))
}
