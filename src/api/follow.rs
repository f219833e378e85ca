use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use serde_json::json;

use crate::auth::{Claims, OptionalClaims};
use crate::domain::DomainError;
use crate::models::UserSummary;
use crate::services::follow_service::{self, FollowAction};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowRequest {
    #[serde(default)]
    target_user_id: String,
    #[serde(default)]
    action: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckQuery {
    #[serde(default)]
    target_user_id: String,
}

#[utoipa::path(
    post,
    path = "/api/follow",
    responses(
        (status = 200, description = "Follow state updated"),
        (status = 400, description = "Missing target, bad action or self-follow"),
        (status = 404, description = "Target user not found")
    )
)]
pub async fn follow(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Json(payload): Json<FollowRequest>,
) -> Result<impl IntoResponse, DomainError> {
    if payload.target_user_id.trim().is_empty() {
        return Err(DomainError::Validation(
            "Target user ID is required".to_string(),
        ));
    }
    let action = FollowAction::parse(&payload.action)?;

    let outcome =
        follow_service::apply_follow_action(&db, claims.user_id(), &payload.target_user_id, action)
            .await?;

    Ok(Json(json!({ "message": outcome.message() })))
}

#[utoipa::path(
    get,
    path = "/api/follow/check",
    params(("targetUserId" = String, Query, description = "User to check")),
    responses((status = 200, description = "Whether the caller follows the target"))
)]
pub async fn check_follow(
    State(db): State<DatabaseConnection>,
    session: OptionalClaims,
    Query(params): Query<CheckQuery>,
) -> Result<impl IntoResponse, DomainError> {
    if params.target_user_id.trim().is_empty() {
        return Err(DomainError::Validation(
            "Target user ID is required".to_string(),
        ));
    }

    let is_following = match session.user_id() {
        Some(user_id) => {
            follow_service::is_following(&db, user_id, &params.target_user_id).await?
        }
        None => false,
    };

    Ok(Json(json!({ "isFollowing": is_following })))
}

#[utoipa::path(
    get,
    path = "/api/users/{user_id}/followers",
    params(("user_id" = String, Path, description = "User id")),
    responses((status = 200, description = "Users following this user"))
)]
pub async fn list_followers(
    State(db): State<DatabaseConnection>,
    _claims: Claims,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<UserSummary>>, DomainError> {
    Ok(Json(follow_service::list_followers(&db, &user_id).await?))
}

#[utoipa::path(
    get,
    path = "/api/users/{user_id}/following",
    params(("user_id" = String, Path, description = "User id")),
    responses((status = 200, description = "Users this user follows"))
)]
pub async fn list_following(
    State(db): State<DatabaseConnection>,
    _claims: Claims,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<UserSummary>>, DomainError> {
    Ok(Json(follow_service::list_following(&db, &user_id).await?))
}
