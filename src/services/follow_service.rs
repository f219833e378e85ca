//! Follow Service - the directed social graph

use std::collections::HashSet;

use sea_orm::*;
use serde::Deserialize;

use super::{require_user, summaries_by_id};
use crate::domain::DomainError;
use crate::models::follow::{self, Entity as Follow};
use crate::models::UserSummary;
use crate::utils::time::now_timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FollowAction {
    Follow,
    Unfollow,
}

impl FollowAction {
    pub fn parse(action: &str) -> Result<Self, DomainError> {
        match action {
            "follow" => Ok(FollowAction::Follow),
            "unfollow" => Ok(FollowAction::Unfollow),
            _ => Err(DomainError::Validation(
                "Action must be either 'follow' or 'unfollow'".to_string(),
            )),
        }
    }
}

/// What a follow/unfollow request actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowOutcome {
    Followed,
    AlreadyFollowing,
    Unfollowed,
    NotFollowing,
}

impl FollowOutcome {
    pub fn message(self) -> &'static str {
        match self {
            FollowOutcome::Followed => "Successfully followed user",
            FollowOutcome::AlreadyFollowing => "You are already following this user",
            FollowOutcome::Unfollowed => "Successfully unfollowed user",
            FollowOutcome::NotFollowing => "You are not following this user",
        }
    }
}

async fn find_edge(
    db: &DatabaseConnection,
    follower_id: &str,
    following_id: &str,
) -> Result<Option<follow::Model>, DbErr> {
    Follow::find_by_id((follower_id.to_string(), following_id.to_string()))
        .one(db)
        .await
}

/// Apply a follow or unfollow from `user_id` towards `target_user_id`.
/// Repeating an action is not an error.
pub async fn apply_follow_action(
    db: &DatabaseConnection,
    user_id: &str,
    target_user_id: &str,
    action: FollowAction,
) -> Result<FollowOutcome, DomainError> {
    if target_user_id.trim().is_empty() {
        return Err(DomainError::Validation(
            "Target user ID is required".to_string(),
        ));
    }

    if target_user_id == user_id {
        return Err(DomainError::Validation(
            "You cannot follow yourself".to_string(),
        ));
    }

    require_user(db, target_user_id, "Target user not found").await?;

    let existing = find_edge(db, user_id, target_user_id).await?;

    let outcome = match (action, existing) {
        (FollowAction::Follow, Some(_)) => FollowOutcome::AlreadyFollowing,
        (FollowAction::Follow, None) => {
            let edge = follow::ActiveModel {
                follower_id: Set(user_id.to_string()),
                following_id: Set(target_user_id.to_string()),
                created_at: Set(now_timestamp()),
            };
            Follow::insert(edge).exec(db).await?;
            FollowOutcome::Followed
        }
        (FollowAction::Unfollow, Some(edge)) => {
            edge.delete(db).await?;
            FollowOutcome::Unfollowed
        }
        (FollowAction::Unfollow, None) => FollowOutcome::NotFollowing,
    };

    tracing::info!(
        "Follow action {:?} from {} to {}: {:?}",
        action,
        user_id,
        target_user_id,
        outcome
    );

    Ok(outcome)
}

pub async fn is_following(
    db: &DatabaseConnection,
    follower_id: &str,
    following_id: &str,
) -> Result<bool, DomainError> {
    Ok(find_edge(db, follower_id, following_id).await?.is_some())
}

/// Both directions of the follow relation exist.
pub async fn is_mutual_follow(
    db: &DatabaseConnection,
    a: &str,
    b: &str,
) -> Result<bool, DomainError> {
    Ok(is_following(db, a, b).await? && is_following(db, b, a).await?)
}

/// Ids of users that `user_id` follows.
pub async fn following_ids(
    db: &DatabaseConnection,
    user_id: &str,
) -> Result<Vec<String>, DomainError> {
    let ids: Vec<String> = Follow::find()
        .select_only()
        .column(follow::Column::FollowingId)
        .filter(follow::Column::FollowerId.eq(user_id))
        .into_tuple()
        .all(db)
        .await?;
    Ok(ids)
}

/// Ids of users that follow `user_id`.
pub async fn follower_ids(
    db: &DatabaseConnection,
    user_id: &str,
) -> Result<Vec<String>, DomainError> {
    let ids: Vec<String> = Follow::find()
        .select_only()
        .column(follow::Column::FollowerId)
        .filter(follow::Column::FollowingId.eq(user_id))
        .into_tuple()
        .all(db)
        .await?;
    Ok(ids)
}

/// Followers of `user_id` that `user_id` also follows back.
pub async fn mutual_ids(
    db: &DatabaseConnection,
    user_id: &str,
) -> Result<Vec<String>, DomainError> {
    let followers = follower_ids(db, user_id).await?;
    let following: HashSet<String> = following_ids(db, user_id).await?.into_iter().collect();
    Ok(intersect(followers, &following))
}

/// Keep the elements of `left` present in `right`, preserving `left`'s order.
pub fn intersect(left: Vec<String>, right: &HashSet<String>) -> Vec<String> {
    left.into_iter().filter(|id| right.contains(id)).collect()
}

/// The subset of `candidates` that `user_id` follows.
pub async fn followed_among(
    db: &DatabaseConnection,
    user_id: &str,
    candidates: &[String],
) -> Result<HashSet<String>, DomainError> {
    if candidates.is_empty() {
        return Ok(HashSet::new());
    }
    let ids: Vec<String> = Follow::find()
        .select_only()
        .column(follow::Column::FollowingId)
        .filter(follow::Column::FollowerId.eq(user_id))
        .filter(follow::Column::FollowingId.is_in(candidates.iter().cloned()))
        .into_tuple()
        .all(db)
        .await?;
    Ok(ids.into_iter().collect())
}

pub async fn list_followers(
    db: &DatabaseConnection,
    user_id: &str,
) -> Result<Vec<UserSummary>, DomainError> {
    require_user(db, user_id, "User not found").await?;
    let ids = follower_ids(db, user_id).await?;
    ordered_summaries(db, ids).await
}

pub async fn list_following(
    db: &DatabaseConnection,
    user_id: &str,
) -> Result<Vec<UserSummary>, DomainError> {
    require_user(db, user_id, "User not found").await?;
    let ids = following_ids(db, user_id).await?;
    ordered_summaries(db, ids).await
}

async fn ordered_summaries(
    db: &DatabaseConnection,
    ids: Vec<String>,
) -> Result<Vec<UserSummary>, DomainError> {
    let mut by_id = summaries_by_id(db, &ids).await?;
    let mut users: Vec<UserSummary> = ids.iter().filter_map(|id| by_id.remove(id)).collect();
    users.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    Ok(users)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intersect_keeps_left_order() {
        let right: HashSet<String> = ["c", "a"].iter().map(|s| s.to_string()).collect();
        let left = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        assert_eq!(intersect(left, &right), vec!["a", "c"]);
    }

    #[test]
    fn action_parsing() {
        assert_eq!(FollowAction::parse("follow").unwrap(), FollowAction::Follow);
        assert_eq!(
            FollowAction::parse("unfollow").unwrap(),
            FollowAction::Unfollow
        );
        assert!(FollowAction::parse("block").is_err());
    }
}
