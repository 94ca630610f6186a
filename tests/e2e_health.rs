//! E2E tests for health, metrics, and authentication gating

mod common;

use common::TestServer;

#[tokio::test]
async fn health_check_works() {
    let server = TestServer::new().await;

    let response = server
        .client
        .get(server.url("/health"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn metrics_endpoint_is_public() {
    let server = TestServer::new().await;

    let response = server
        .client
        .get(server.url("/metrics"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body = response.text().await.unwrap();
    assert!(body.contains("# TYPE") || body.is_empty());
}

#[tokio::test]
async fn api_requires_bearer_token() {
    let server = TestServer::new().await;

    let response = server
        .client
        .get(server.url("/api/friends"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);

    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn api_rejects_invalid_token() {
    let server = TestServer::new().await;

    let response = server
        .client
        .get(server.url("/api/friends"))
        .bearer_auth("not-a-valid-token")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn authenticated_user_is_mirrored_into_users_table() {
    let server = TestServer::new().await;
    let token = server.token_for("user-a", "a@example.com");

    let response = server
        .client
        .get(server.url("/api/friends"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let user = server
        .state
        .db
        .get_user("user-a")
        .await
        .unwrap()
        .expect("user should be mirrored");
    assert_eq!(user.email, "a@example.com");
}
