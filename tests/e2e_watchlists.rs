//! E2E tests for multi-list watchlists

mod common;

use common::{TestServer, movie_body};

const DEFAULT_NAME: &str = "Невідсортоване";

async fn list_watchlists(server: &TestServer, token: &str) -> Vec<serde_json::Value> {
    server
        .client
        .get(server.url("/api/watchlists"))
        .bearer_auth(token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

async fn create_watchlist(server: &TestServer, token: &str, name: &str) -> serde_json::Value {
    let response = server
        .client
        .post(server.url("/api/watchlists"))
        .bearer_auth(token)
        .json(&serde_json::json!({"name": name}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    response.json().await.unwrap()
}

async fn add_movie(
    server: &TestServer,
    token: &str,
    list_id: &str,
    movie_id: i64,
    title: &str,
) -> serde_json::Value {
    let response = server
        .client
        .post(server.url(&format!("/api/watchlists/{list_id}/movies")))
        .bearer_auth(token)
        .json(&movie_body(movie_id, title))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    response.json().await.unwrap()
}

#[tokio::test]
async fn default_list_is_created_on_first_read() {
    let server = TestServer::new().await;
    let token = server.token_for("user-a", "a@example.com");

    let lists = list_watchlists(&server, &token).await;
    assert_eq!(lists.len(), 1);
    assert_eq!(lists[0]["name"], DEFAULT_NAME);
    assert_eq!(lists[0]["is_default"], true);
    assert_eq!(lists[0]["movie_count"], 0);

    // Second read does not create another one
    let lists = list_watchlists(&server, &token).await;
    assert_eq!(lists.len(), 1);
}

#[tokio::test]
async fn create_rejects_blank_and_duplicate_names() {
    let server = TestServer::new().await;
    let token = server.token_for("user-a", "a@example.com");

    create_watchlist(&server, &token, "Horror").await;

    let response = server
        .client
        .post(server.url("/api/watchlists"))
        .bearer_auth(&token)
        .json(&serde_json::json!({"name": "  "}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    let response = server
        .client
        .post(server.url("/api/watchlists"))
        .bearer_auth(&token)
        .json(&serde_json::json!({"name": "Horror"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    // Same name is fine for a different user
    let token_b = server.token_for("user-b", "b@example.com");
    create_watchlist(&server, &token_b, "Horror").await;
}

#[tokio::test]
async fn default_list_name_is_immutable() {
    let server = TestServer::new().await;
    let token = server.token_for("user-a", "a@example.com");

    let lists = list_watchlists(&server, &token).await;
    let default_id = lists[0]["id"].as_str().unwrap().to_string();

    // Renaming the default fails
    let response = server
        .client
        .patch(server.url(&format!("/api/watchlists/{default_id}")))
        .bearer_auth(&token)
        .json(&serde_json::json!({"name": "Something else"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    // Other fields still apply
    let response = server
        .client
        .patch(server.url(&format!("/api/watchlists/{default_id}")))
        .bearer_auth(&token)
        .json(&serde_json::json!({"description": "Catch-all", "color": "#aabbcc"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let updated: serde_json::Value = response.json().await.unwrap();
    assert_eq!(updated["name"], DEFAULT_NAME);
    assert_eq!(updated["description"], "Catch-all");

    // Deleting the default fails too
    let response = server
        .client
        .delete(server.url(&format!("/api/watchlists/{default_id}")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn add_movie_is_upsert() {
    let server = TestServer::new().await;
    let token = server.token_for("user-a", "a@example.com");

    let list = create_watchlist(&server, &token, "Classics").await;
    let list_id = list["id"].as_str().unwrap().to_string();

    let first = add_movie(&server, &token, &list_id, 550, "Fight Club").await;
    assert_eq!(first["movie_id"], 550);

    // Re-adding refreshes the snapshot in place
    let mut body = movie_body(550, "Fight Club");
    body["vote_average"] = serde_json::json!(8.9);
    let response = server
        .client
        .post(server.url(&format!("/api/watchlists/{list_id}/movies")))
        .bearer_auth(&token)
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let second: serde_json::Value = response.json().await.unwrap();
    assert_eq!(second["id"], first["id"]);
    assert_eq!(second["vote_average"], 8.9);

    let movies: Vec<serde_json::Value> = server
        .client
        .get(server.url(&format!("/api/watchlists/{list_id}/movies")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(movies.len(), 1);
}

#[tokio::test]
async fn movie_annotations_update_and_remove() {
    let server = TestServer::new().await;
    let token = server.token_for("user-a", "a@example.com");

    let list = create_watchlist(&server, &token, "Queue").await;
    let list_id = list["id"].as_str().unwrap().to_string();
    add_movie(&server, &token, &list_id, 550, "Fight Club").await;

    let response = server
        .client
        .patch(server.url(&format!("/api/watchlists/{list_id}/movies/550")))
        .bearer_auth(&token)
        .json(&serde_json::json!({"notes": "rewatch", "priority": 1}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let updated: serde_json::Value = response.json().await.unwrap();
    assert_eq!(updated["notes"], "rewatch");
    assert_eq!(updated["priority"], 1);

    let response = server
        .client
        .delete(server.url(&format!("/api/watchlists/{list_id}/movies/550")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    // Gone now
    let response = server
        .client
        .patch(server.url(&format!("/api/watchlists/{list_id}/movies/550")))
        .bearer_auth(&token)
        .json(&serde_json::json!({"notes": "x"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn deleting_a_list_moves_members_to_default() {
    let server = TestServer::new().await;
    let token = server.token_for("user-a", "a@example.com");

    let lists = list_watchlists(&server, &token).await;
    let default_id = lists[0]["id"].as_str().unwrap().to_string();

    let doomed = create_watchlist(&server, &token, "Doomed").await;
    let doomed_id = doomed["id"].as_str().unwrap().to_string();

    add_movie(&server, &token, &doomed_id, 550, "Fight Club").await;
    add_movie(&server, &token, &doomed_id, 600, "Full Metal Jacket").await;
    // 550 is already in the default: the move must skip it
    add_movie(&server, &token, &default_id, 550, "Fight Club").await;

    let response = server
        .client
        .delete(server.url(&format!("/api/watchlists/{doomed_id}")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let outcome: serde_json::Value = response.json().await.unwrap();
    assert_eq!(outcome["moved"], 1);
    assert_eq!(outcome["skipped"], 1);
    assert_eq!(outcome["failed"], 0);

    // The union of movies survives in the default list
    let movies: Vec<serde_json::Value> = server
        .client
        .get(server.url(&format!("/api/watchlists/{default_id}/movies")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let mut ids: Vec<i64> = movies.iter().map(|m| m["movie_id"].as_i64().unwrap()).collect();
    ids.sort();
    assert_eq!(ids, vec![550, 600]);

    let lists = list_watchlists(&server, &token).await;
    assert_eq!(lists.len(), 1);
}

#[tokio::test]
async fn foreign_lists_are_not_found() {
    let server = TestServer::new().await;
    let token_a = server.token_for("user-a", "a@example.com");
    let token_b = server.token_for("user-b", "b@example.com");

    let list = create_watchlist(&server, &token_a, "Private").await;
    let list_id = list["id"].as_str().unwrap().to_string();

    // Absence and foreign ownership are both 404
    let response = server
        .client
        .get(server.url(&format!("/api/watchlists/{list_id}")))
        .bearer_auth(&token_b)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);

    let response = server
        .client
        .delete(server.url(&format!("/api/watchlists/{list_id}")))
        .bearer_auth(&token_b)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}
