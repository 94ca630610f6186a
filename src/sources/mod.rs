//! Streaming-source adapters
//!
//! Each Ukrainian streaming site implements the small
//! [`StreamingSource`] capability; [`search_all`] fans the query out
//! to every source concurrently and collects per-source outcomes, so
//! one site's failure never affects another's result. Selection
//! heuristics stay deliberately per-site.

mod fetch;
mod imdb;
mod sites;

pub use fetch::FetchClient;
pub use imdb::{ImdbClient, ImdbRating};
pub use sites::{EneyidaSource, KinoukrSource, UakinoSource};

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::AppError;
use crate::metrics::SOURCE_SEARCHES_TOTAL;

/// A match found on one streaming site.
#[derive(Debug, Clone, Serialize)]
pub struct SourceMatch {
    /// Title as listed on the site
    pub title: String,
    /// Direct link to the title page
    pub url: String,
    /// Release year, when the site exposes one
    pub year: Option<i32>,
}

/// One streaming site's search capability.
#[async_trait]
pub trait StreamingSource: Send + Sync {
    /// Stable identifier used in queries and metrics (e.g. "uakino")
    fn id(&self) -> &'static str;

    /// Human-readable site name
    fn display_name(&self) -> &'static str;

    /// Search the site; `Ok(None)` means "no plausible match".
    async fn search(
        &self,
        fetch: &FetchClient,
        title: &str,
        year: Option<i32>,
    ) -> Result<Option<SourceMatch>, AppError>;
}

/// Per-source result of a fan-out search.
#[derive(Debug, Clone, Serialize)]
pub struct SourceOutcome {
    pub service: String,
    pub name: String,
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<SourceMatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Registry of configured streaming sources plus the shared fetcher.
pub struct SourceRegistry {
    fetch: FetchClient,
    sources: Vec<Arc<dyn StreamingSource>>,
}

impl SourceRegistry {
    /// Registry with the built-in site adapters.
    pub fn new(fetch: FetchClient) -> Self {
        Self {
            fetch,
            sources: vec![
                Arc::new(UakinoSource),
                Arc::new(KinoukrSource),
                Arc::new(EneyidaSource),
            ],
        }
    }

    #[cfg(test)]
    pub fn with_sources(fetch: FetchClient, sources: Vec<Arc<dyn StreamingSource>>) -> Self {
        Self { fetch, sources }
    }

    /// Whether `service` names a known source.
    pub fn knows(&self, service: &str) -> bool {
        self.sources.iter().any(|s| s.id() == service)
    }

    /// Query all sources (or just `only_service`) concurrently.
    ///
    /// Always returns one outcome per queried source; failures are
    /// captured in the outcome rather than propagated.
    pub async fn search_all(
        &self,
        title: &str,
        year: Option<i32>,
        only_service: Option<&str>,
    ) -> Vec<SourceOutcome> {
        let selected: Vec<&Arc<dyn StreamingSource>> = self
            .sources
            .iter()
            .filter(|source| only_service.is_none_or(|wanted| source.id() == wanted))
            .collect();

        let searches = selected.iter().map(|source| {
            let source = Arc::clone(source);
            let fetch = self.fetch.clone();
            let title = title.to_string();
            async move {
                let outcome = source.search(&fetch, &title, year).await;
                match outcome {
                    Ok(result) => {
                        SOURCE_SEARCHES_TOTAL
                            .with_label_values(&[source.id(), "ok"])
                            .inc();
                        SourceOutcome {
                            service: source.id().to_string(),
                            name: source.display_name().to_string(),
                            found: result.is_some(),
                            result,
                            error: None,
                        }
                    }
                    Err(error) => {
                        tracing::warn!(source = source.id(), %error, "Source search failed");
                        SOURCE_SEARCHES_TOTAL
                            .with_label_values(&[source.id(), "error"])
                            .inc();
                        SourceOutcome {
                            service: source.id().to_string(),
                            name: source.display_name().to_string(),
                            found: false,
                            result: None,
                            error: Some(error.to_string()),
                        }
                    }
                }
            }
        });

        futures::future::join_all(searches).await
    }
}
