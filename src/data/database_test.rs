//! Database tests

use super::*;
use chrono::Utc;
use tempfile::TempDir;

/// Helper to create a test database
async fn create_test_db() -> (Database, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let db = Database::connect(&db_path).await.unwrap();
    (db, temp_dir)
}

fn test_user(id: &str, email: &str) -> User {
    User {
        id: id.to_string(),
        email: email.to_string(),
        display_name: Some(format!("User {id}")),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn test_watchlist(user_id: &str, name: &str, is_default: bool) -> Watchlist {
    Watchlist {
        id: EntityId::new().0,
        user_id: user_id.to_string(),
        name: name.to_string(),
        description: None,
        is_default,
        color: None,
        icon: None,
        sort_order: if is_default { 0 } else { 1 },
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn test_membership(watchlist_id: &str, user_id: &str, movie_id: i64) -> WatchlistMovie {
    WatchlistMovie {
        id: EntityId::new().0,
        watchlist_id: watchlist_id.to_string(),
        user_id: user_id.to_string(),
        movie_id,
        title: format!("Movie {movie_id}"),
        poster_path: Some(format!("/poster-{movie_id}.jpg")),
        release_date: Some("1999-10-15".to_string()),
        overview: None,
        vote_average: Some(8.4),
        vote_count: Some(26000),
        notes: None,
        priority: None,
        created_at: Utc::now(),
    }
}

#[tokio::test]
async fn test_database_connection() {
    let (_db, _temp_dir) = create_test_db().await;
}

#[tokio::test]
async fn test_user_upsert_refreshes_email() {
    let (db, _temp_dir) = create_test_db().await;

    db.upsert_user(&test_user("u1", "a@x.com")).await.unwrap();
    let mut updated = test_user("u1", "renamed@x.com");
    updated.display_name = Some("Renamed".to_string());
    db.upsert_user(&updated).await.unwrap();

    let fetched = db.get_user("u1").await.unwrap().unwrap();
    assert_eq!(fetched.email, "renamed@x.com");
    assert_eq!(fetched.display_name.as_deref(), Some("Renamed"));

    assert!(db.get_user_by_email("a@x.com").await.unwrap().is_none());
    assert!(db.get_user_by_email("renamed@x.com").await.unwrap().is_some());
}

#[tokio::test]
async fn test_friendship_pair_is_unique_regardless_of_direction() {
    let (db, _temp_dir) = create_test_db().await;

    db.upsert_user(&test_user("u1", "a@x.com")).await.unwrap();
    db.upsert_user(&test_user("u2", "b@x.com")).await.unwrap();

    let forward = Friendship {
        id: EntityId::new().0,
        requester_id: "u1".to_string(),
        addressee_id: "u2".to_string(),
        status: "pending".to_string(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };
    db.insert_friendship(&forward).await.unwrap();

    // Reverse-direction insert must hit the pair-unique index.
    let reverse = Friendship {
        id: EntityId::new().0,
        requester_id: "u2".to_string(),
        addressee_id: "u1".to_string(),
        status: "pending".to_string(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };
    assert!(db.insert_friendship(&reverse).await.is_err());

    let found = db.get_friendship_between("u2", "u1").await.unwrap();
    assert_eq!(found.unwrap().id, forward.id);
}

#[tokio::test]
async fn test_friendship_status_guard_rejects_second_transition() {
    let (db, _temp_dir) = create_test_db().await;

    db.upsert_user(&test_user("u1", "a@x.com")).await.unwrap();
    db.upsert_user(&test_user("u2", "b@x.com")).await.unwrap();

    let row = Friendship {
        id: EntityId::new().0,
        requester_id: "u1".to_string(),
        addressee_id: "u2".to_string(),
        status: "pending".to_string(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };
    db.insert_friendship(&row).await.unwrap();

    let first = db
        .update_friendship_status_if_pending(&row.id, FriendshipStatus::Accepted, Utc::now())
        .await
        .unwrap();
    assert!(first);

    let second = db
        .update_friendship_status_if_pending(&row.id, FriendshipStatus::Rejected, Utc::now())
        .await
        .unwrap();
    assert!(!second, "row is no longer pending");

    let fetched = db.get_friendship(&row.id).await.unwrap().unwrap();
    assert_eq!(fetched.status, "accepted");
}

#[tokio::test]
async fn test_default_watchlist_conditional_insert() {
    let (db, _temp_dir) = create_test_db().await;
    db.upsert_user(&test_user("u1", "a@x.com")).await.unwrap();

    let first = test_watchlist("u1", DEFAULT_WATCHLIST_NAME, true);
    assert!(db.insert_default_watchlist_if_absent(&first).await.unwrap());

    // Second repair attempt is a no-op, not a second default.
    let second = test_watchlist("u1", DEFAULT_WATCHLIST_NAME, true);
    assert!(!db.insert_default_watchlist_if_absent(&second).await.unwrap());

    let lists = db.list_watchlists("u1").await.unwrap();
    assert_eq!(lists.len(), 1);
    assert!(lists[0].is_default);
}

#[tokio::test]
async fn test_watchlist_name_unique_per_user() {
    let (db, _temp_dir) = create_test_db().await;
    db.upsert_user(&test_user("u1", "a@x.com")).await.unwrap();
    db.upsert_user(&test_user("u2", "b@x.com")).await.unwrap();

    db.insert_watchlist(&test_watchlist("u1", "Action", false))
        .await
        .unwrap();

    assert!(db.watchlist_name_exists("u1", "Action", None).await.unwrap());
    assert!(!db.watchlist_name_exists("u2", "Action", None).await.unwrap());

    // Same name for the same user violates UNIQUE(user_id, name).
    assert!(
        db.insert_watchlist(&test_watchlist("u1", "Action", false))
            .await
            .is_err()
    );

    // Another user may reuse the name.
    db.insert_watchlist(&test_watchlist("u2", "Action", false))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_membership_upsert_updates_in_place() {
    let (db, _temp_dir) = create_test_db().await;
    db.upsert_user(&test_user("u1", "a@x.com")).await.unwrap();

    let list = test_watchlist("u1", "Action", false);
    db.insert_watchlist(&list).await.unwrap();

    let mut movie = test_membership(&list.id, "u1", 550);
    db.upsert_watchlist_movie(&movie).await.unwrap();

    movie.notes = Some("rewatch with friends".to_string());
    movie.vote_average = Some(8.5);
    db.upsert_watchlist_movie(&movie).await.unwrap();

    let rows = db.list_watchlist_movies(&list.id).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].notes.as_deref(), Some("rewatch with friends"));
    assert_eq!(rows[0].vote_average, Some(8.5));
}

#[tokio::test]
async fn test_membership_conditional_insert_skips_existing() {
    let (db, _temp_dir) = create_test_db().await;
    db.upsert_user(&test_user("u1", "a@x.com")).await.unwrap();

    let list = test_watchlist("u1", "Action", false);
    db.insert_watchlist(&list).await.unwrap();

    assert!(
        db.insert_watchlist_movie_if_absent(&test_membership(&list.id, "u1", 550))
            .await
            .unwrap()
    );
    assert!(
        !db.insert_watchlist_movie_if_absent(&test_membership(&list.id, "u1", 550))
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn test_deleting_watchlist_cascades_memberships() {
    let (db, _temp_dir) = create_test_db().await;
    db.upsert_user(&test_user("u1", "a@x.com")).await.unwrap();

    let list = test_watchlist("u1", "Action", false);
    db.insert_watchlist(&list).await.unwrap();
    db.upsert_watchlist_movie(&test_membership(&list.id, "u1", 550))
        .await
        .unwrap();

    assert!(db.delete_watchlist(&list.id).await.unwrap());
    assert!(db.list_watchlist_movies(&list.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_watched_upsert_keyed_by_user_and_movie() {
    let (db, _temp_dir) = create_test_db().await;
    db.upsert_user(&test_user("u1", "a@x.com")).await.unwrap();

    let watched = WatchedMovie {
        id: EntityId::new().0,
        user_id: "u1".to_string(),
        movie_id: 550,
        title: "Fight Club".to_string(),
        poster_path: None,
        release_date: None,
        overview: None,
        vote_average: Some(8.4),
        vote_count: Some(26000),
        rating: Some(9),
        notes: None,
        watched_at: Utc::now(),
        created_at: Utc::now(),
    };
    db.upsert_watched(&watched).await.unwrap();

    let mut rewatch = watched.clone();
    rewatch.id = EntityId::new().0;
    rewatch.rating = Some(10);
    db.upsert_watched(&rewatch).await.unwrap();

    let rows = db.list_watched("u1").await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].rating, Some(10));
    // Original row identity survives the upsert.
    assert_eq!(rows[0].id, watched.id);
}

#[tokio::test]
async fn test_legacy_entry_conditional_insert_and_delete() {
    let (db, _temp_dir) = create_test_db().await;
    db.upsert_user(&test_user("u1", "a@x.com")).await.unwrap();

    let entry = LegacyWatchlistEntry {
        id: EntityId::new().0,
        user_id: "u1".to_string(),
        movie_id: 550,
        title: "Fight Club".to_string(),
        poster_path: None,
        release_date: None,
        overview: None,
        vote_average: None,
        vote_count: None,
        created_at: Utc::now(),
    };

    assert!(db.insert_legacy_entry_if_absent(&entry).await.unwrap());
    assert!(!db.insert_legacy_entry_if_absent(&entry).await.unwrap());

    assert!(db.delete_legacy_entry("u1", 550).await.unwrap());
    assert!(!db.delete_legacy_entry("u1", 550).await.unwrap());
}
