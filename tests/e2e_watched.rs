//! E2E tests for the watched archive and the legacy flat watchlist

mod common;

use common::{TestServer, movie_body};

async fn legacy_entries(server: &TestServer, token: &str) -> Vec<serde_json::Value> {
    server
        .client
        .get(server.url("/api/watchlist"))
        .bearer_auth(token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn mark_watched_is_upsert() {
    let server = TestServer::new().await;
    let token = server.token_for("user-a", "a@example.com");

    let mut body = movie_body(550, "Fight Club");
    body["rating"] = serde_json::json!(8);
    let response = server
        .client
        .post(server.url("/api/watched"))
        .bearer_auth(&token)
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let first: serde_json::Value = response.json().await.unwrap();
    assert_eq!(first["rating"], 8);

    // Re-marking refreshes rating/notes, not the row identity
    let mut body = movie_body(550, "Fight Club");
    body["rating"] = serde_json::json!(10);
    body["notes"] = serde_json::json!("better on rewatch");
    let second: serde_json::Value = server
        .client
        .post(server.url("/api/watched"))
        .bearer_auth(&token)
        .json(&body)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(second["id"], first["id"]);
    assert_eq!(second["rating"], 10);
    assert_eq!(second["notes"], "better on rewatch");

    let watched: Vec<serde_json::Value> = server
        .client
        .get(server.url("/api/watched"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(watched.len(), 1);
}

#[tokio::test]
async fn rating_out_of_range_is_rejected() {
    let server = TestServer::new().await;
    let token = server.token_for("user-a", "a@example.com");

    let mut body = movie_body(550, "Fight Club");
    body["rating"] = serde_json::json!(11);
    let response = server
        .client
        .post(server.url("/api/watched"))
        .bearer_auth(&token)
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn marking_watched_removes_from_legacy_watchlist() {
    let server = TestServer::new().await;
    let token = server.token_for("user-a", "a@example.com");

    let response = server
        .client
        .post(server.url("/api/watchlist"))
        .bearer_auth(&token)
        .json(&movie_body(550, "Fight Club"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(legacy_entries(&server, &token).await.len(), 1);

    let response = server
        .client
        .post(server.url("/api/watched"))
        .bearer_auth(&token)
        .json(&movie_body(550, "Fight Club"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    // Removed from the legacy list by default
    assert!(legacy_entries(&server, &token).await.is_empty());
}

#[tokio::test]
async fn remove_from_watchlist_can_be_opted_out() {
    let server = TestServer::new().await;
    let token = server.token_for("user-a", "a@example.com");

    server
        .client
        .post(server.url("/api/watchlist"))
        .bearer_auth(&token)
        .json(&movie_body(550, "Fight Club"))
        .send()
        .await
        .unwrap();

    let mut body = movie_body(550, "Fight Club");
    body["remove_from_watchlist"] = serde_json::json!(false);
    let response = server
        .client
        .post(server.url("/api/watched"))
        .bearer_auth(&token)
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    assert_eq!(legacy_entries(&server, &token).await.len(), 1);
}

#[tokio::test]
async fn unmark_watched() {
    let server = TestServer::new().await;
    let token = server.token_for("user-a", "a@example.com");

    server
        .client
        .post(server.url("/api/watched"))
        .bearer_auth(&token)
        .json(&movie_body(550, "Fight Club"))
        .send()
        .await
        .unwrap();

    let response = server
        .client
        .delete(server.url("/api/watched/550"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    // Already gone
    let response = server
        .client
        .delete(server.url("/api/watched/550"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn legacy_watchlist_rejects_duplicates() {
    let server = TestServer::new().await;
    let token = server.token_for("user-a", "a@example.com");

    let response = server
        .client
        .post(server.url("/api/watchlist"))
        .bearer_auth(&token)
        .json(&movie_body(550, "Fight Club"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let response = server
        .client
        .post(server.url("/api/watchlist"))
        .bearer_auth(&token)
        .json(&movie_body(550, "Fight Club"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Movie is already in the watchlist");
}

#[tokio::test]
async fn legacy_watchlist_remove() {
    let server = TestServer::new().await;
    let token = server.token_for("user-a", "a@example.com");

    server
        .client
        .post(server.url("/api/watchlist"))
        .bearer_auth(&token)
        .json(&movie_body(550, "Fight Club"))
        .send()
        .await
        .unwrap();

    let response = server
        .client
        .delete(server.url("/api/watchlist/550"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert!(legacy_entries(&server, &token).await.is_empty());

    let response = server
        .client
        .delete(server.url("/api/watchlist/550"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn per_user_isolation() {
    let server = TestServer::new().await;
    let token_a = server.token_for("user-a", "a@example.com");
    let token_b = server.token_for("user-b", "b@example.com");

    server
        .client
        .post(server.url("/api/watched"))
        .bearer_auth(&token_a)
        .json(&movie_body(550, "Fight Club"))
        .send()
        .await
        .unwrap();

    let watched_b: Vec<serde_json::Value> = server
        .client
        .get(server.url("/api/watched"))
        .bearer_auth(&token_b)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(watched_b.is_empty());
}
