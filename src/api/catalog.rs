//! Catalog proxy endpoints
//!
//! Thin pass-through to the metadata provider; responses are served
//! as-is so clients see the provider's shapes.

use axum::{
    Router,
    extract::{Path, Query, State},
    response::Json,
    routing::get,
};
use serde::Deserialize;

use crate::AppState;
use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::metrics::HTTP_REQUESTS_TOTAL;

fn default_page() -> u32 {
    1
}

/// Search parameters
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub query: String,
    #[serde(default = "default_page")]
    pub page: u32,
}

/// GET /api/catalog/search?query=&page=
pub async fn search(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Query(params): Query<SearchParams>,
) -> Result<Json<serde_json::Value>, AppError> {
    let body = state.catalog.search(&params.query, params.page).await?;

    // Record successful request
    HTTP_REQUESTS_TOTAL
        .with_label_values(&["GET", "/api/catalog/search", "200"])
        .inc();

    Ok(Json(body))
}

/// GET /api/catalog/movies/:id
pub async fn movie_details(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    Ok(Json(state.catalog.movie_details(id).await?))
}

/// GET /api/catalog/movies/:id/credits
pub async fn credits(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    Ok(Json(state.catalog.credits(id).await?))
}

/// GET /api/catalog/movies/:id/videos
pub async fn videos(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    Ok(Json(state.catalog.videos(id).await?))
}

/// GET /api/catalog/movies/:id/providers
pub async fn watch_providers(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    Ok(Json(state.catalog.watch_providers(id).await?))
}

/// GET /api/catalog/movies/:id/images
pub async fn images(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    Ok(Json(state.catalog.images(id).await?))
}

/// Create catalog router
pub fn catalog_router() -> Router<AppState> {
    Router::new()
        .route("/catalog/search", get(search))
        .route("/catalog/movies/:id", get(movie_details))
        .route("/catalog/movies/:id/credits", get(credits))
        .route("/catalog/movies/:id/videos", get(videos))
        .route("/catalog/movies/:id/providers", get(watch_providers))
        .route("/catalog/movies/:id/images", get(images))
}
