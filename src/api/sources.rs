//! Streaming-source and IMDb lookup endpoints

use axum::{
    Router,
    extract::{Query, State},
    response::Json,
    routing::get,
};
use serde::Deserialize;

use crate::AppState;
use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::metrics::HTTP_REQUESTS_TOTAL;
use crate::sources::{ImdbRating, SourceOutcome};

/// Streaming-source search parameters
#[derive(Debug, Deserialize)]
pub struct SourceSearchParams {
    pub title: String,
    pub year: Option<i32>,
    /// Restrict the fan-out to one source id
    pub service: Option<String>,
}

/// IMDb rating lookup parameters
#[derive(Debug, Deserialize)]
pub struct ImdbRatingParams {
    pub title: String,
    pub year: Option<i32>,
}

/// GET /api/ua-services/search?title=&year=&service=
/// Fan-out search across the configured streaming sites; one outcome
/// per queried source, per-source failures included in the body
pub async fn search_sources(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Query(params): Query<SourceSearchParams>,
) -> Result<Json<Vec<SourceOutcome>>, AppError> {
    let title = params.title.trim();
    if title.is_empty() {
        return Err(AppError::Validation("title cannot be empty".to_string()));
    }

    if let Some(service) = &params.service {
        if !state.sources.knows(service) {
            return Err(AppError::Validation(format!(
                "Unknown service \"{service}\""
            )));
        }
    }

    let outcomes = state
        .sources
        .search_all(title, params.year, params.service.as_deref())
        .await;

    // Record successful request
    HTTP_REQUESTS_TOTAL
        .with_label_values(&["GET", "/api/ua-services/search", "200"])
        .inc();

    Ok(Json(outcomes))
}

/// GET /api/imdb/rating?title=&year=
/// 404 when no candidate title matches or the page has no rating
pub async fn imdb_rating(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Query(params): Query<ImdbRatingParams>,
) -> Result<Json<ImdbRating>, AppError> {
    let rating = state
        .imdb
        .rating(&params.title, params.year)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(rating))
}

/// Create streaming-sources router
pub fn sources_router() -> Router<AppState> {
    Router::new()
        .route("/ua-services/search", get(search_sources))
        .route("/imdb/rating", get(imdb_rating))
}
