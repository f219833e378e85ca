use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use serde_json::json;

use crate::auth::{Claims, OptionalClaims};
use crate::domain::DomainError;
use crate::services::post_service::{self, CreatePostInput, FeedType, PostDto};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    #[serde(default)]
    content: String,
    image_url: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedQuery {
    feed_type: Option<String>,
}

#[derive(Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    query: String,
}

#[utoipa::path(
    post,
    path = "/api/posts",
    responses(
        (status = 201, description = "Post created"),
        (status = 400, description = "Invalid content"),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn create_post(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Json(payload): Json<CreatePostRequest>,
) -> Result<impl IntoResponse, DomainError> {
    let post = post_service::create_post(
        &db,
        claims.user_id(),
        CreatePostInput {
            content: payload.content,
            image_url: payload.image_url,
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Post created successfully", "post": post })),
    ))
}

#[utoipa::path(
    get,
    path = "/api/posts",
    params(("feedType" = Option<String>, Query, description = "`all` or `following`")),
    responses((status = 200, description = "Posts, newest first"))
)]
pub async fn list_posts(
    State(db): State<DatabaseConnection>,
    session: OptionalClaims,
    Query(params): Query<FeedQuery>,
) -> Result<Json<Vec<PostDto>>, DomainError> {
    let feed = FeedType::parse(params.feed_type.as_deref());
    let posts = post_service::list_feed(&db, feed, session.user_id()).await?;
    Ok(Json(posts))
}

#[utoipa::path(
    get,
    path = "/api/posts/user/{user_id}",
    params(("user_id" = String, Path, description = "Author id")),
    responses((status = 200, description = "The user's posts, newest first"))
)]
pub async fn list_user_posts(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<PostDto>>, DomainError> {
    let posts = post_service::list_user_posts(&db, &user_id, Some(claims.user_id())).await?;
    Ok(Json(posts))
}

#[utoipa::path(
    get,
    path = "/api/posts/search",
    params(("query" = String, Query, description = "Content fragment")),
    responses((status = 200, description = "Up to twenty matching posts"))
)]
pub async fn search_posts(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Query(params): Query<SearchQuery>,
) -> Result<Json<Vec<PostDto>>, DomainError> {
    let posts = post_service::search_posts(&db, &params.query, Some(claims.user_id())).await?;
    Ok(Json(posts))
}

#[utoipa::path(
    delete,
    path = "/api/posts/{post_id}",
    params(("post_id" = String, Path, description = "Post id")),
    responses(
        (status = 200, description = "Post deleted"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Post not found")
    )
)]
pub async fn delete_post(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Path(post_id): Path<String>,
) -> Result<impl IntoResponse, DomainError> {
    post_service::delete_post(&db, claims.user_id(), &post_id).await?;
    Ok(Json(json!({ "message": "Post deleted successfully" })))
}
