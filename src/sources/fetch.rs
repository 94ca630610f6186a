//! Proxy-aware page fetching
//!
//! Several target sites reject datacenter IPs, so requests are first
//! routed through configured forwarding proxies (URL-prefix style:
//! the encoded target URL is appended to the proxy URL). After a
//! fixed number of proxy attempts the client falls back to a direct
//! request before surfacing the error.

use crate::config::SourcesConfig;
use crate::error::AppError;

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/120.0 Safari/537.36";

/// HTTP client with proxy rotation and direct fallback.
#[derive(Clone)]
pub struct FetchClient {
    http: reqwest::Client,
    proxies: Vec<String>,
    retries: u32,
}

impl FetchClient {
    pub fn new(config: &SourcesConfig) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(std::time::Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| AppError::Internal(e.into()))?;

        Ok(Self {
            http,
            proxies: config.proxies.clone(),
            retries: config.proxy_retries,
        })
    }

    /// Fetch a page body as text.
    ///
    /// Tries proxies round-robin up to the configured retry count,
    /// then once directly. Returns the first successful body.
    pub async fn get_text(&self, url: &str) -> Result<String, AppError> {
        let mut last_error: Option<AppError> = None;

        if !self.proxies.is_empty() {
            for attempt in 0..self.retries {
                let proxy = &self.proxies[attempt as usize % self.proxies.len()];
                let proxied = format!("{}{}", proxy, urlencoding::encode(url));

                match self.try_fetch(&proxied).await {
                    Ok(body) => return Ok(body),
                    Err(error) => {
                        tracing::debug!(url, proxy = %proxy, attempt, %error, "Proxy fetch failed");
                        last_error = Some(error);
                    }
                }
            }
        }

        // Direct fallback.
        match self.try_fetch(url).await {
            Ok(body) => Ok(body),
            Err(error) => {
                tracing::debug!(url, %error, "Direct fetch failed");
                Err(last_error.unwrap_or(error))
            }
        }
    }

    /// Fetch and deserialize a JSON body.
    pub async fn get_json(&self, url: &str) -> Result<serde_json::Value, AppError> {
        let body = self.get_text(url).await?;
        serde_json::from_str(&body)
            .map_err(|e| AppError::Upstream(format!("Invalid JSON from {url}: {e}")))
    }

    async fn try_fetch(&self, url: &str) -> Result<String, AppError> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Upstream(format!(
                "Request to {url} returned status {status}"
            )));
        }
        Ok(response.text().await?)
    }
}
