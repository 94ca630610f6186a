//! Catalog HTTP client
//!
//! Proxies search/details/credits/videos/providers/images calls to
//! the metadata provider, converting non-2xx responses into upstream
//! errors and caching successful bodies.

use std::sync::Arc;
use std::time::Instant;

use crate::config::CatalogConfig;
use crate::data::CatalogCache;
use crate::error::AppError;
use crate::metrics::{CATALOG_REQUEST_DURATION_SECONDS, CATALOG_REQUESTS_TOTAL};

/// Client for the movie metadata provider.
#[derive(Clone)]
pub struct CatalogClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    language: String,
    cache: Arc<CatalogCache>,
}

impl CatalogClient {
    pub fn new(config: &CatalogConfig, http: reqwest::Client, cache: Arc<CatalogCache>) -> Self {
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            language: config.language.clone(),
            cache,
        }
    }

    /// Search the catalog by free-text query.
    pub async fn search(&self, query: &str, page: u32) -> Result<serde_json::Value, AppError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::Validation("query cannot be empty".to_string()));
        }

        let cache_key = format!("search:{query}:{page}");
        if let Some(cached) = self.cache.get_search(&cache_key).await {
            return Ok((*cached).clone());
        }

        let body = self
            .fetch(
                "search",
                "/search/movie",
                &[
                    ("query", query.to_string()),
                    ("page", page.to_string()),
                    ("include_adult", "false".to_string()),
                ],
            )
            .await?;

        self.cache.insert_search(cache_key, body.clone()).await;
        Ok(body)
    }

    /// Full details for one movie.
    pub async fn movie_details(&self, movie_id: i64) -> Result<serde_json::Value, AppError> {
        self.detail_endpoint("details", movie_id, "").await
    }

    /// Cast and crew.
    pub async fn credits(&self, movie_id: i64) -> Result<serde_json::Value, AppError> {
        self.detail_endpoint("credits", movie_id, "/credits").await
    }

    /// Trailers and other videos.
    pub async fn videos(&self, movie_id: i64) -> Result<serde_json::Value, AppError> {
        self.detail_endpoint("videos", movie_id, "/videos").await
    }

    /// Regional streaming/rent/buy providers.
    pub async fn watch_providers(&self, movie_id: i64) -> Result<serde_json::Value, AppError> {
        self.detail_endpoint("providers", movie_id, "/watch/providers")
            .await
    }

    /// Posters and backdrops.
    pub async fn images(&self, movie_id: i64) -> Result<serde_json::Value, AppError> {
        self.detail_endpoint("images", movie_id, "/images").await
    }

    async fn detail_endpoint(
        &self,
        operation: &str,
        movie_id: i64,
        suffix: &str,
    ) -> Result<serde_json::Value, AppError> {
        if movie_id <= 0 {
            return Err(AppError::Validation(
                "movie id must be a positive integer".to_string(),
            ));
        }

        let cache_key = format!("{operation}:{movie_id}");
        if let Some(cached) = self.cache.get_details(&cache_key).await {
            return Ok((*cached).clone());
        }

        let path = format!("/movie/{movie_id}{suffix}");
        let body = self.fetch(operation, &path, &[]).await?;

        self.cache.insert_details(cache_key, body.clone()).await;
        Ok(body)
    }

    async fn fetch(
        &self,
        operation: &str,
        path: &str,
        extra_query: &[(&str, String)],
    ) -> Result<serde_json::Value, AppError> {
        let url = format!("{}{}", self.base_url, path);
        let started = Instant::now();

        let mut request = self
            .http
            .get(&url)
            .bearer_auth(&self.api_key)
            .query(&[("language", self.language.as_str())]);
        for (key, value) in extra_query {
            request = request.query(&[(*key, value.as_str())]);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(error) => {
                CATALOG_REQUESTS_TOTAL
                    .with_label_values(&[operation, "error"])
                    .inc();
                return Err(error.into());
            }
        };

        CATALOG_REQUEST_DURATION_SECONDS
            .with_label_values(&[operation])
            .observe(started.elapsed().as_secs_f64());

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            CATALOG_REQUESTS_TOTAL
                .with_label_values(&[operation, "not_found"])
                .inc();
            return Err(AppError::NotFound);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                operation,
                status = %status,
                body = %body,
                "Catalog API request failed"
            );
            CATALOG_REQUESTS_TOTAL
                .with_label_values(&[operation, "upstream_error"])
                .inc();
            return Err(AppError::Upstream(format!(
                "Catalog API returned status {status}"
            )));
        }

        CATALOG_REQUESTS_TOTAL
            .with_label_values(&[operation, "ok"])
            .inc();

        let body = response.json::<serde_json::Value>().await?;
        Ok(body)
    }
}
