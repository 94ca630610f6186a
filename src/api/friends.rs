//! Friendship endpoints

use axum::{
    Router,
    extract::{Path, Query, State},
    response::Json,
    routing::{get, patch},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::auth::CurrentUser;
use crate::data::{FriendshipStatus, User};
use crate::error::AppError;
use crate::service::{
    Direction, FriendshipFilter, FriendshipService, FriendshipView, RequestOutcome,
    WatchlistService,
};

use super::watchlists::WatchlistWithMoviesResponse;

/// The other party in a friendship, as shown to the caller
#[derive(Debug, Serialize)]
pub struct FriendSummary {
    pub id: String,
    pub email: String,
    pub display_name: Option<String>,
}

impl From<User> for FriendSummary {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            display_name: user.display_name,
        }
    }
}

/// Friendship response
#[derive(Debug, Serialize)]
pub struct FriendshipResponse {
    pub id: String,
    pub status: String,
    pub direction: Direction,
    pub friend: FriendSummary,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<FriendshipView> for FriendshipResponse {
    fn from(view: FriendshipView) -> Self {
        Self {
            id: view.friendship.id,
            status: view.friendship.status,
            direction: view.direction,
            friend: view.friend.into(),
            created_at: view.friendship.created_at,
            updated_at: view.friendship.updated_at,
        }
    }
}

/// List filter parameters
#[derive(Debug, Deserialize)]
pub struct ListFriendsParams {
    pub status: Option<String>,
}

/// Send friend request body
#[derive(Debug, Deserialize)]
pub struct SendRequestBody {
    pub email: String,
}

/// Respond to request body
#[derive(Debug, Deserialize)]
pub struct RespondBody {
    /// "accepted" or "rejected"
    pub status: String,
}

/// GET /api/friends?status=all|accepted|pending|sent
pub async fn list_friends(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(params): Query<ListFriendsParams>,
) -> Result<Json<Vec<FriendshipResponse>>, AppError> {
    let filter = match params.status.as_deref() {
        None => FriendshipFilter::All,
        Some(value) => FriendshipFilter::parse(value).ok_or_else(|| {
            AppError::Validation(
                "status must be one of 'all', 'accepted', 'pending', 'sent'".to_string(),
            )
        })?,
    };

    let views = FriendshipService::new(state.db.clone())
        .list(&user.id, filter)
        .await?;

    Ok(Json(views.into_iter().map(Into::into).collect()))
}

/// POST /api/friends
/// Send a friend request by email
pub async fn send_friend_request(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<SendRequestBody>,
) -> Result<Json<FriendshipResponse>, AppError> {
    let service = FriendshipService::new(state.db.clone());

    let (friendship, direction) = match service.send_request(&user.id, &body.email).await? {
        RequestOutcome::Requested(row) => (row, Direction::Outgoing),
        // The target had already asked; the caller sees the accepted
        // row from the incoming side.
        RequestOutcome::AutoAccepted(row) => (row, Direction::Incoming),
    };

    let friend_id = friendship.other_party(&user.id).to_string();
    let friend = state
        .db
        .get_user(&friend_id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(FriendshipResponse {
        id: friendship.id,
        status: friendship.status,
        direction,
        friend: friend.into(),
        created_at: friendship.created_at,
        updated_at: friendship.updated_at,
    }))
}

/// PATCH /api/friends/:id
/// Accept or reject a pending request (addressee only)
pub async fn respond_friend_request(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(body): Json<RespondBody>,
) -> Result<Json<FriendshipResponse>, AppError> {
    let decision = FriendshipStatus::parse(&body.status).ok_or_else(|| {
        AppError::Validation("status must be 'accepted' or 'rejected'".to_string())
    })?;

    let friendship = FriendshipService::new(state.db.clone())
        .respond(&user.id, &id, decision)
        .await?;

    let friend_id = friendship.other_party(&user.id).to_string();
    let friend = state
        .db
        .get_user(&friend_id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(FriendshipResponse {
        id: friendship.id,
        status: friendship.status,
        direction: Direction::Incoming,
        friend: friend.into(),
        created_at: friendship.created_at,
        updated_at: friendship.updated_at,
    }))
}

/// DELETE /api/friends/:id
/// Cancel a sent request or remove a friendship (either party)
pub async fn remove_friend(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    FriendshipService::new(state.db.clone())
        .remove(&user.id, &id)
        .await?;

    Ok(Json(serde_json::json!({})))
}

/// GET /api/friends/:email/watchlist
/// Read-only view of an accepted friend's watchlists with movies
pub async fn friend_watchlists(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(email): Path<String>,
) -> Result<Json<Vec<WatchlistWithMoviesResponse>>, AppError> {
    let friend = FriendshipService::new(state.db.clone())
        .require_accepted_friend(&user.id, &email)
        .await?;

    let lists = WatchlistService::new(state.db.clone())
        .lists_with_movies(&friend.id)
        .await?;

    Ok(Json(lists.into_iter().map(Into::into).collect()))
}

/// Create friends router
pub fn friends_router() -> Router<AppState> {
    Router::new()
        .route("/friends", get(list_friends).post(send_friend_request))
        .route(
            "/friends/:id",
            patch(respond_friend_request).delete(remove_friend),
        )
        .route("/friends/:id/watchlist", get(friend_watchlists))
}
