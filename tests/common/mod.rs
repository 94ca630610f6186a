//! Common test utilities for E2E tests

use std::path::PathBuf;

use kinotrack::{AppState, config};
use tempfile::TempDir;
use tokio::net::TcpListener;

pub const TEST_TOKEN_SECRET: &str = "test-secret-key-32-bytes-long!!!";

/// Test server instance
pub struct TestServer {
    pub addr: String,
    pub state: AppState,
    pub _temp_dir: TempDir,
    pub client: reqwest::Client,
}

impl TestServer {
    /// Create a new test server instance
    pub async fn new() -> Self {
        // Create temporary directory for test database
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        let config = test_config(db_path);

        // Initialize app state
        let state = AppState::new(config).await.unwrap();

        // Create HTTP client
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap();

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let addr_str = format!("http://{}", addr);

        // Build router
        let app = kinotrack::build_router(state.clone());

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait a bit for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        Self {
            addr: addr_str,
            state,
            _temp_dir: temp_dir,
            client,
        }
    }

    /// Get base URL for API requests
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.addr, path)
    }

    /// Create a signed access token for a test user
    pub fn token_for(&self, sub: &str, email: &str) -> String {
        use chrono::{Duration, Utc};
        use kinotrack::auth::{Claims, create_access_token};

        let now = Utc::now();
        let claims = Claims {
            sub: sub.to_string(),
            email: email.to_string(),
            name: Some(format!("Test {sub}")),
            iat: now,
            exp: now + Duration::hours(1),
        };

        create_access_token(&claims, TEST_TOKEN_SECRET).expect("Failed to create test token")
    }

    /// Tokens for the two standard test users
    pub fn two_users(&self) -> (String, String) {
        (
            self.token_for("user-a", "a@example.com"),
            self.token_for("user-b", "b@example.com"),
        )
    }
}

fn test_config(db_path: PathBuf) -> config::AppConfig {
    config::AppConfig {
        server: config::ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0, // Let OS assign port
        },
        database: config::DatabaseConfig { path: db_path },
        auth: config::AuthConfig {
            token_secret: TEST_TOKEN_SECRET.to_string(),
        },
        catalog: config::CatalogConfig {
            // Unroutable: catalog calls are not exercised end-to-end.
            base_url: "http://127.0.0.1:9".to_string(),
            api_key: "test-api-key".to_string(),
            language: "uk-UA".to_string(),
        },
        sources: config::SourcesConfig {
            proxies: vec![],
            proxy_retries: 1,
            request_timeout_seconds: 5,
        },
        cache: config::CacheConfig {
            catalog_max_items: 100,
            search_ttl: 60,
            details_ttl: 60,
        },
        logging: config::LoggingConfig {
            level: "info".to_string(),
            format: "pretty".to_string(),
        },
    }
}

/// A movie snapshot body for add/mark requests
pub fn movie_body(movie_id: i64, title: &str) -> serde_json::Value {
    serde_json::json!({
        "movie_id": movie_id,
        "title": title,
        "poster_path": "/poster.jpg",
        "release_date": "1999-10-15",
        "overview": "Test overview",
        "vote_average": 8.4,
        "vote_count": 26000,
    })
}
