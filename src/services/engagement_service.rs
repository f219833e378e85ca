//! Engagement Service - likes, shares and comments on posts

use sea_orm::*;
use serde::Serialize;

use super::post_service::get_post;
use super::summaries_by_id;
use crate::domain::validation::COMMENT_MAX_LEN;
use crate::domain::{DomainError, FieldErrors};
use crate::models::comment::{self, CommentDto, Entity as Comment};
use crate::models::like::{self, Entity as Like};
use crate::models::share::{self, Entity as Share};
use crate::models::UserSummary;
use crate::utils::{new_id, time::now_timestamp};

/// Result of flipping a like or share.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    On,
    Off,
}

impl Toggle {
    pub fn is_on(self) -> bool {
        matches!(self, Toggle::On)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeStatus {
    pub like_count: u64,
    pub is_liked: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareStatus {
    pub share_count: u64,
    pub is_shared: bool,
}

fn require_post_id(post_id: &str) -> Result<(), DomainError> {
    let mut errors = FieldErrors::new();
    errors.require_id("postId", "Post ID", post_id);
    errors.into_result().map_err(DomainError::from)
}

/// Like the post, or remove the caller's like if present.
pub async fn toggle_like(
    db: &DatabaseConnection,
    user_id: &str,
    post_id: &str,
) -> Result<Toggle, DomainError> {
    require_post_id(post_id)?;
    get_post(db, post_id).await?;

    let existing = Like::find()
        .filter(like::Column::UserId.eq(user_id))
        .filter(like::Column::PostId.eq(post_id))
        .one(db)
        .await?;

    if let Some(existing) = existing {
        existing.delete(db).await?;
        tracing::debug!("User {} unliked post {}", user_id, post_id);
        return Ok(Toggle::Off);
    }

    like::ActiveModel {
        id: Set(new_id()),
        user_id: Set(user_id.to_string()),
        post_id: Set(post_id.to_string()),
        created_at: Set(now_timestamp()),
    }
    .insert(db)
    .await?;

    tracing::debug!("User {} liked post {}", user_id, post_id);
    Ok(Toggle::On)
}

pub async fn like_status(
    db: &DatabaseConnection,
    post_id: &str,
    viewer_id: Option<&str>,
) -> Result<LikeStatus, DomainError> {
    if post_id.trim().is_empty() {
        return Err(DomainError::Validation("Post ID is required".to_string()));
    }

    let like_count = Like::find()
        .filter(like::Column::PostId.eq(post_id))
        .count(db)
        .await?;

    let is_liked = match viewer_id {
        Some(viewer) => Like::find()
            .filter(like::Column::PostId.eq(post_id))
            .filter(like::Column::UserId.eq(viewer))
            .one(db)
            .await?
            .is_some(),
        None => false,
    };

    Ok(LikeStatus {
        like_count,
        is_liked,
    })
}

/// Share the post, or withdraw the caller's share if present.
pub async fn toggle_share(
    db: &DatabaseConnection,
    user_id: &str,
    post_id: &str,
) -> Result<Toggle, DomainError> {
    require_post_id(post_id)?;
    get_post(db, post_id).await?;

    let existing = Share::find()
        .filter(share::Column::UserId.eq(user_id))
        .filter(share::Column::PostId.eq(post_id))
        .one(db)
        .await?;

    if let Some(existing) = existing {
        existing.delete(db).await?;
        return Ok(Toggle::Off);
    }

    share::ActiveModel {
        id: Set(new_id()),
        user_id: Set(user_id.to_string()),
        post_id: Set(post_id.to_string()),
        created_at: Set(now_timestamp()),
    }
    .insert(db)
    .await?;

    Ok(Toggle::On)
}

pub async fn share_status(
    db: &DatabaseConnection,
    post_id: &str,
    viewer_id: Option<&str>,
) -> Result<ShareStatus, DomainError> {
    if post_id.trim().is_empty() {
        return Err(DomainError::Validation("Post ID is required".to_string()));
    }

    let share_count = Share::find()
        .filter(share::Column::PostId.eq(post_id))
        .count(db)
        .await?;

    let is_shared = match viewer_id {
        Some(viewer) => Share::find()
            .filter(share::Column::PostId.eq(post_id))
            .filter(share::Column::UserId.eq(viewer))
            .one(db)
            .await?
            .is_some(),
        None => false,
    };

    Ok(ShareStatus {
        share_count,
        is_shared,
    })
}

pub async fn add_comment(
    db: &DatabaseConnection,
    user_id: &str,
    post_id: &str,
    content: String,
) -> Result<CommentDto, DomainError> {
    let mut errors = FieldErrors::new();
    errors.require_id("postId", "Post ID", post_id);
    errors.require_text("content", "Comment content", &content, COMMENT_MAX_LEN);
    errors.into_result()?;

    get_post(db, post_id).await?;

    let saved = comment::ActiveModel {
        id: Set(new_id()),
        content: Set(content),
        user_id: Set(user_id.to_string()),
        post_id: Set(post_id.to_string()),
        created_at: Set(now_timestamp()),
    }
    .insert(db)
    .await?;

    tracing::info!("Comment {} added to post {}", saved.id, post_id);

    let author = summaries_by_id(db, &[user_id.to_string()])
        .await?
        .remove(user_id);
    Ok(CommentDto::new(saved, author))
}

/// Comments on a post, oldest first.
pub async fn list_comments(
    db: &DatabaseConnection,
    post_id: &str,
) -> Result<Vec<CommentDto>, DomainError> {
    if post_id.trim().is_empty() {
        return Err(DomainError::Validation("Post ID is required".to_string()));
    }

    let rows = Comment::find()
        .filter(comment::Column::PostId.eq(post_id))
        .order_by_asc(comment::Column::CreatedAt)
        .find_also_related(crate::models::user::Entity)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(c, author)| CommentDto::new(c, author.map(UserSummary::from)))
        .collect())
}
