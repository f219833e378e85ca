use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use serde_json::json;

use crate::auth::{Claims, OptionalClaims};
use crate::domain::DomainError;
use crate::models::comment::CommentDto;
use crate::services::engagement_service::{self, LikeStatus, ShareStatus, Toggle};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRef {
    #[serde(default)]
    post_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRequest {
    #[serde(default)]
    post_id: String,
    #[serde(default)]
    content: String,
}

/// 201 when switched on, 200 when switched off.
fn toggle_status(toggle: Toggle) -> StatusCode {
    if toggle.is_on() {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    }
}

#[utoipa::path(
    post,
    path = "/api/posts/like",
    responses(
        (status = 201, description = "Post liked"),
        (status = 200, description = "Like removed"),
        (status = 404, description = "Post not found")
    )
)]
pub async fn toggle_like(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Json(payload): Json<PostRef>,
) -> Result<impl IntoResponse, DomainError> {
    let toggle = engagement_service::toggle_like(&db, claims.user_id(), &payload.post_id).await?;
    let message = if toggle.is_on() {
        "Post liked successfully"
    } else {
        "Post unliked successfully"
    };

    Ok((
        toggle_status(toggle),
        Json(json!({ "message": message, "liked": toggle.is_on() })),
    ))
}

#[utoipa::path(
    get,
    path = "/api/posts/like",
    params(("postId" = String, Query, description = "Post id")),
    responses((status = 200, description = "Like count and the caller's like state"))
)]
pub async fn like_status(
    State(db): State<DatabaseConnection>,
    session: OptionalClaims,
    Query(params): Query<PostRef>,
) -> Result<Json<LikeStatus>, DomainError> {
    let status = engagement_service::like_status(&db, &params.post_id, session.user_id()).await?;
    Ok(Json(status))
}

#[utoipa::path(
    post,
    path = "/api/posts/share",
    responses(
        (status = 201, description = "Post shared"),
        (status = 200, description = "Share removed"),
        (status = 404, description = "Post not found")
    )
)]
pub async fn toggle_share(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Json(payload): Json<PostRef>,
) -> Result<impl IntoResponse, DomainError> {
    let toggle = engagement_service::toggle_share(&db, claims.user_id(), &payload.post_id).await?;
    let message = if toggle.is_on() {
        "Post shared successfully"
    } else {
        "Post unshared successfully"
    };

    Ok((
        toggle_status(toggle),
        Json(json!({ "message": message, "shared": toggle.is_on() })),
    ))
}

#[utoipa::path(
    get,
    path = "/api/posts/share",
    params(("postId" = String, Query, description = "Post id")),
    responses((status = 200, description = "Share count and the caller's share state"))
)]
pub async fn share_status(
    State(db): State<DatabaseConnection>,
    session: OptionalClaims,
    Query(params): Query<PostRef>,
) -> Result<Json<ShareStatus>, DomainError> {
    let status = engagement_service::share_status(&db, &params.post_id, session.user_id()).await?;
    Ok(Json(status))
}

#[utoipa::path(
    post,
    path = "/api/posts/comment",
    responses(
        (status = 201, description = "Comment added"),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Post not found")
    )
)]
pub async fn add_comment(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Json(payload): Json<CommentRequest>,
) -> Result<impl IntoResponse, DomainError> {
    let comment =
        engagement_service::add_comment(&db, claims.user_id(), &payload.post_id, payload.content)
            .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Comment added successfully", "comment": comment })),
    ))
}

#[utoipa::path(
    get,
    path = "/api/posts/comment",
    params(("postId" = String, Query, description = "Post id")),
    responses((status = 200, description = "Comments, oldest first"))
)]
pub async fn list_comments(
    State(db): State<DatabaseConnection>,
    Query(params): Query<PostRef>,
) -> Result<Json<Vec<CommentDto>>, DomainError> {
    let comments = engagement_service::list_comments(&db, &params.post_id).await?;
    Ok(Json(comments))
}
