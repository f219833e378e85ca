//! Post Service - authoring, feeds and search

use std::collections::HashSet;

use sea_orm::*;
use serde::{Deserialize, Serialize};

use super::{contains_literal, count_grouped, follow_service, summaries_by_id};
use crate::domain::validation::POST_MAX_LEN;
use crate::domain::{DomainError, FieldErrors};
use crate::models::comment::{self, Entity as Comment};
use crate::models::like::{self, Entity as Like};
use crate::models::post::{self, Entity as Post};
use crate::models::share::{self, Entity as Share};
use crate::models::UserSummary;
use crate::utils::{new_id, time::now_timestamp};

pub const SEARCH_LIMIT: u64 = 20;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostCounts {
    pub likes: i64,
    pub comments: i64,
    pub shares: i64,
}

/// Post enriched with its author card, engagement counts and the viewer's
/// own like/share state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDto {
    pub id: String,
    pub content: String,
    pub image_url: Option<String>,
    pub user_id: String,
    pub created_at: String,
    pub updated_at: String,
    pub user: Option<UserSummary>,
    #[serde(rename = "_count")]
    pub count: PostCounts,
    pub is_liked: bool,
    pub is_shared: bool,
}

#[derive(Debug, Clone)]
pub struct CreatePostInput {
    pub content: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedType {
    #[default]
    All,
    Following,
}

impl FeedType {
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("following") => FeedType::Following,
            _ => FeedType::All,
        }
    }
}

pub async fn create_post(
    db: &DatabaseConnection,
    user_id: &str,
    input: CreatePostInput,
) -> Result<PostDto, DomainError> {
    let mut errors = FieldErrors::new();
    errors.require_text("content", "Content", &input.content, POST_MAX_LEN);
    errors.into_result()?;

    let image_url = input.image_url.filter(|url| !url.trim().is_empty());
    let now = now_timestamp();

    let new_post = post::ActiveModel {
        id: Set(new_id()),
        content: Set(input.content),
        image_url: Set(image_url),
        user_id: Set(user_id.to_string()),
        created_at: Set(now.clone()),
        updated_at: Set(now),
    };

    let saved = new_post.insert(db).await?;
    tracing::info!("Post {} created by {}", saved.id, user_id);

    let mut enriched = enrich_posts(db, vec![saved], Some(user_id)).await?;
    enriched
        .pop()
        .ok_or_else(|| DomainError::Internal("created post vanished".to_string()))
}

/// Newest-first feed. The following feed falls back to the viewer's own
/// posts when they follow nobody; without a viewer it is the global feed.
pub async fn list_feed(
    db: &DatabaseConnection,
    feed: FeedType,
    viewer_id: Option<&str>,
) -> Result<Vec<PostDto>, DomainError> {
    let mut query = Post::find();

    if let (FeedType::Following, Some(viewer)) = (feed, viewer_id) {
        let following = follow_service::following_ids(db, viewer).await?;
        let author_ids = if following.is_empty() {
            vec![viewer.to_string()]
        } else {
            following
        };
        query = query.filter(post::Column::UserId.is_in(author_ids));
    }

    let posts = query
        .order_by_desc(post::Column::CreatedAt)
        .all(db)
        .await?;

    enrich_posts(db, posts, viewer_id).await
}

pub async fn list_user_posts(
    db: &DatabaseConnection,
    user_id: &str,
    viewer_id: Option<&str>,
) -> Result<Vec<PostDto>, DomainError> {
    if user_id.trim().is_empty() {
        return Err(DomainError::Validation("User ID is required".to_string()));
    }

    let posts = Post::find()
        .filter(post::Column::UserId.eq(user_id))
        .order_by_desc(post::Column::CreatedAt)
        .all(db)
        .await?;

    enrich_posts(db, posts, viewer_id).await
}

/// Case-insensitive content search, newest first, at most [`SEARCH_LIMIT`].
pub async fn search_posts(
    db: &DatabaseConnection,
    query: &str,
    viewer_id: Option<&str>,
) -> Result<Vec<PostDto>, DomainError> {
    let query = query.trim();
    if query.is_empty() {
        return Ok(Vec::new());
    }

    let posts = Post::find()
        .filter(contains_literal(post::Column::Content, query))
        .order_by_desc(post::Column::CreatedAt)
        .limit(SEARCH_LIMIT)
        .all(db)
        .await?;

    tracing::debug!("Found {} posts matching {:?}", posts.len(), query);

    enrich_posts(db, posts, viewer_id).await
}

pub async fn get_post(db: &DatabaseConnection, post_id: &str) -> Result<post::Model, DomainError> {
    Post::find_by_id(post_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| DomainError::NotFound("Post not found".to_string()))
}

/// Delete a post. Only its author may do so.
pub async fn delete_post(
    db: &DatabaseConnection,
    user_id: &str,
    post_id: &str,
) -> Result<(), DomainError> {
    let post = get_post(db, post_id).await?;

    if post.user_id != user_id {
        return Err(DomainError::Forbidden(
            "You can only delete your own posts".to_string(),
        ));
    }

    let txn = db.begin().await?;
    Like::delete_many()
        .filter(like::Column::PostId.eq(post_id))
        .exec(&txn)
        .await?;
    Share::delete_many()
        .filter(share::Column::PostId.eq(post_id))
        .exec(&txn)
        .await?;
    Comment::delete_many()
        .filter(comment::Column::PostId.eq(post_id))
        .exec(&txn)
        .await?;
    post.delete(&txn).await?;
    txn.commit().await?;

    tracing::info!("Post {} deleted by {}", post_id, user_id);
    Ok(())
}

/// Attach authors, counts and viewer state to a page of posts, keeping order.
pub async fn enrich_posts(
    db: &DatabaseConnection,
    posts: Vec<post::Model>,
    viewer_id: Option<&str>,
) -> Result<Vec<PostDto>, DomainError> {
    if posts.is_empty() {
        return Ok(Vec::new());
    }

    let post_ids: Vec<String> = posts.iter().map(|p| p.id.clone()).collect();
    let author_ids: Vec<String> = posts
        .iter()
        .map(|p| p.user_id.clone())
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();

    let authors = summaries_by_id(db, &author_ids).await?;
    let likes = count_grouped::<Like>(db, like::Column::PostId, &post_ids).await?;
    let comments = count_grouped::<Comment>(db, comment::Column::PostId, &post_ids).await?;
    let shares = count_grouped::<Share>(db, share::Column::PostId, &post_ids).await?;

    let (liked, shared) = match viewer_id {
        Some(viewer) => (
            viewer_post_ids::<Like>(db, like::Column::UserId, like::Column::PostId, viewer, &post_ids)
                .await?,
            viewer_post_ids::<Share>(
                db,
                share::Column::UserId,
                share::Column::PostId,
                viewer,
                &post_ids,
            )
            .await?,
        ),
        None => (HashSet::new(), HashSet::new()),
    };

    Ok(posts
        .into_iter()
        .map(|p| PostDto {
            count: PostCounts {
                likes: likes.get(&p.id).copied().unwrap_or(0),
                comments: comments.get(&p.id).copied().unwrap_or(0),
                shares: shares.get(&p.id).copied().unwrap_or(0),
            },
            is_liked: liked.contains(&p.id),
            is_shared: shared.contains(&p.id),
            user: authors.get(&p.user_id).cloned(),
            id: p.id,
            content: p.content,
            image_url: p.image_url,
            user_id: p.user_id,
            created_at: p.created_at,
            updated_at: p.updated_at,
        })
        .collect())
}

/// Post ids among `post_ids` that `viewer` has a row for in a likes-like table.
async fn viewer_post_ids<E>(
    db: &DatabaseConnection,
    user_column: E::Column,
    post_column: E::Column,
    viewer: &str,
    post_ids: &[String],
) -> Result<HashSet<String>, DbErr>
where
    E: EntityTrait,
{
    let ids: Vec<String> = E::find()
        .select_only()
        .column(post_column)
        .filter(user_column.eq(viewer))
        .filter(post_column.is_in(post_ids.iter().cloned()))
        .into_tuple()
        .all(db)
        .await?;
    Ok(ids.into_iter().collect())
}
