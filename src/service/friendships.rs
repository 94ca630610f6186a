//! Friendship service
//!
//! The friendship state machine: one directional row per unordered
//! user pair, `pending -> accepted | rejected`, symmetric removal.

use std::sync::Arc;

use chrono::Utc;

use crate::data::{Database, EntityId, Friendship, FriendshipStatus, User, normalize_email};
use crate::error::AppError;

/// Which slice of the caller's friendships to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FriendshipFilter {
    All,
    Accepted,
    /// Incoming pending requests
    Pending,
    /// Outgoing pending requests
    Sent,
}

impl FriendshipFilter {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "all" => Some(Self::All),
            "accepted" => Some(Self::Accepted),
            "pending" => Some(Self::Pending),
            "sent" => Some(Self::Sent),
            _ => None,
        }
    }
}

/// Whether the caller sent or received the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Incoming,
    Outgoing,
}

/// A friendship row annotated for the caller's perspective.
#[derive(Debug, Clone)]
pub struct FriendshipView {
    pub friendship: Friendship,
    pub direction: Direction,
    /// The other party
    pub friend: User,
}

/// Result of sending a friend request.
#[derive(Debug, Clone)]
pub enum RequestOutcome {
    /// A fresh pending request was created (or a rejected row revived).
    Requested(Friendship),
    /// The target had already sent a request to the caller; it was
    /// auto-accepted instead of creating a duplicate.
    AutoAccepted(Friendship),
}

/// Friendship service
pub struct FriendshipService {
    db: Arc<Database>,
}

impl FriendshipService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// List the caller's friendships, filtered and annotated with
    /// direction and the other party's user record.
    ///
    /// Rows whose other party is missing from the users mirror are
    /// dropped rather than failing the whole listing.
    pub async fn list(
        &self,
        caller_id: &str,
        filter: FriendshipFilter,
    ) -> Result<Vec<FriendshipView>, AppError> {
        let rows = self.db.list_friendships_for(caller_id).await?;

        let mut views = Vec::new();
        for row in rows {
            let outgoing = row.is_outgoing_for(caller_id);
            let keep = match filter {
                FriendshipFilter::All => true,
                FriendshipFilter::Accepted => row.status == "accepted",
                FriendshipFilter::Pending => row.status == "pending" && !outgoing,
                FriendshipFilter::Sent => row.status == "pending" && outgoing,
            };
            if !keep {
                continue;
            }

            let other_id = row.other_party(caller_id).to_string();
            let Some(friend) = self.db.get_user(&other_id).await? else {
                tracing::warn!(
                    friendship_id = %row.id,
                    user_id = %other_id,
                    "Friendship references unknown user; skipping"
                );
                continue;
            };

            views.push(FriendshipView {
                direction: if outgoing {
                    Direction::Outgoing
                } else {
                    Direction::Incoming
                },
                friendship: row,
                friend,
            });
        }

        Ok(views)
    }

    /// Send a friend request to `target_email`.
    ///
    /// Merge semantics: a reverse pending request is accepted instead
    /// of creating a duplicate row; a rejected row is revived as a new
    /// pending request from the caller.
    pub async fn send_request(
        &self,
        caller_id: &str,
        target_email: &str,
    ) -> Result<RequestOutcome, AppError> {
        let target_email = normalize_email(target_email);
        if target_email.is_empty() || !target_email.contains('@') {
            return Err(AppError::Validation("Invalid email address".to_string()));
        }

        let target = self
            .db
            .get_user_by_email(&target_email)
            .await?
            .ok_or(AppError::NotFound)?;

        if target.id == caller_id {
            return Err(AppError::Validation(
                "You cannot send a friend request to yourself".to_string(),
            ));
        }

        let now = Utc::now();

        if let Some(existing) = self.db.get_friendship_between(caller_id, &target.id).await? {
            return match (existing.status.as_str(), existing.is_outgoing_for(caller_id)) {
                ("accepted", _) => Err(AppError::Validation("Already friends".to_string())),
                ("pending", true) => {
                    Err(AppError::Validation("Friend request already sent".to_string()))
                }
                ("pending", false) => {
                    // They asked first; accept instead of duplicating.
                    self.db
                        .update_friendship_status_if_pending(
                            &existing.id,
                            FriendshipStatus::Accepted,
                            now,
                        )
                        .await?;
                    let row = self
                        .db
                        .get_friendship(&existing.id)
                        .await?
                        .ok_or(AppError::NotFound)?;
                    Ok(RequestOutcome::AutoAccepted(row))
                }
                _ => {
                    // Rejected previously; revive as a fresh request.
                    self.db
                        .reset_friendship_to_pending(&existing.id, caller_id, &target.id, now)
                        .await?;
                    let row = self
                        .db
                        .get_friendship(&existing.id)
                        .await?
                        .ok_or(AppError::NotFound)?;
                    Ok(RequestOutcome::Requested(row))
                }
            };
        }

        let friendship = Friendship {
            id: EntityId::new().0,
            requester_id: caller_id.to_string(),
            addressee_id: target.id.clone(),
            status: FriendshipStatus::Pending.as_str().to_string(),
            created_at: now,
            updated_at: now,
        };

        // The pair-unique index backstops the check above under
        // concurrent requests from both sides.
        match self.db.insert_friendship(&friendship).await {
            Ok(()) => Ok(RequestOutcome::Requested(friendship)),
            Err(AppError::Database(sqlx::Error::Database(db_err)))
                if db_err.is_unique_violation() =>
            {
                Err(AppError::Validation("Friend request already sent".to_string()))
            }
            Err(error) => Err(error),
        }
    }

    /// Respond to a pending request.
    ///
    /// Only the addressee may respond, and only while the row is
    /// pending — a second respond fails with 400.
    pub async fn respond(
        &self,
        caller_id: &str,
        friendship_id: &str,
        decision: FriendshipStatus,
    ) -> Result<Friendship, AppError> {
        if decision == FriendshipStatus::Pending {
            return Err(AppError::Validation(
                "Decision must be 'accepted' or 'rejected'".to_string(),
            ));
        }

        let row = self
            .db
            .get_friendship(friendship_id)
            .await?
            .ok_or(AppError::NotFound)?;

        if row.requester_id != caller_id && row.addressee_id != caller_id {
            return Err(AppError::NotFound);
        }
        if row.addressee_id != caller_id {
            return Err(AppError::Forbidden);
        }

        let updated = self
            .db
            .update_friendship_status_if_pending(friendship_id, decision, Utc::now())
            .await?;
        if !updated {
            return Err(AppError::Validation(
                "Friend request is no longer pending".to_string(),
            ));
        }

        self.db
            .get_friendship(friendship_id)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// Remove a friendship row.
    ///
    /// Allowed for either party regardless of status; used both to
    /// cancel a sent request and to unfriend.
    pub async fn remove(&self, caller_id: &str, friendship_id: &str) -> Result<(), AppError> {
        let row = self
            .db
            .get_friendship(friendship_id)
            .await?
            .ok_or(AppError::NotFound)?;

        if row.requester_id != caller_id && row.addressee_id != caller_id {
            return Err(AppError::NotFound);
        }

        self.db.delete_friendship(friendship_id).await?;
        Ok(())
    }

    /// Resolve a friend by email and require an accepted friendship
    /// with the caller. Used by the read-only friend-watchlist view.
    pub async fn require_accepted_friend(
        &self,
        caller_id: &str,
        friend_email: &str,
    ) -> Result<User, AppError> {
        let friend = self
            .db
            .get_user_by_email(&normalize_email(friend_email))
            .await?
            .ok_or(AppError::NotFound)?;

        let relationship = self
            .db
            .get_friendship_between(caller_id, &friend.id)
            .await?;

        match relationship {
            Some(row) if row.status == "accepted" => Ok(friend),
            _ => Err(AppError::Forbidden),
        }
    }
}
