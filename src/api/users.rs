use axum::{
    extract::{Path, Query, State},
    Json,
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;

use crate::auth::{Claims, OptionalClaims};
use crate::domain::DomainError;
use crate::services::user_service::{
    self, ProfileView, SearchScope, SuggestedUser, UserSearchHit,
};

#[derive(Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    query: String,
}

async fn search(
    db: &DatabaseConnection,
    claims: &Claims,
    query: &str,
    scope: SearchScope,
) -> Result<Json<Vec<UserSearchHit>>, DomainError> {
    let hits = user_service::search_users(db, claims.user_id(), query, scope).await?;
    Ok(Json(hits))
}

#[utoipa::path(
    get,
    path = "/api/users/search",
    params(("query" = String, Query, description = "Name or email fragment")),
    responses((status = 200, description = "Up to ten matching users"))
)]
pub async fn search_users(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Query(params): Query<SearchQuery>,
) -> Result<Json<Vec<UserSearchHit>>, DomainError> {
    search(&db, &claims, &params.query, SearchScope::Everyone).await
}

#[utoipa::path(
    get,
    path = "/api/users/followers/search",
    params(("query" = String, Query, description = "Name or email fragment")),
    responses((status = 200, description = "Matching users who follow the caller"))
)]
pub async fn search_followers(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Query(params): Query<SearchQuery>,
) -> Result<Json<Vec<UserSearchHit>>, DomainError> {
    search(&db, &claims, &params.query, SearchScope::Followers).await
}

#[utoipa::path(
    get,
    path = "/api/users/mutual-followers/search",
    params(("query" = String, Query, description = "Name or email fragment")),
    responses((status = 200, description = "Matching mutual followers"))
)]
/// Candidates for a new conversation.
pub async fn search_mutual_followers(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Query(params): Query<SearchQuery>,
) -> Result<Json<Vec<UserSearchHit>>, DomainError> {
    search(&db, &claims, &params.query, SearchScope::MutualFollowers).await
}

#[utoipa::path(
    get,
    path = "/api/users/suggested",
    responses((status = 200, description = "Users the caller does not follow yet"))
)]
pub async fn suggested_users(
    State(db): State<DatabaseConnection>,
    claims: Claims,
) -> Result<Json<Vec<SuggestedUser>>, DomainError> {
    Ok(Json(user_service::suggested_users(&db, claims.user_id()).await?))
}

#[utoipa::path(
    get,
    path = "/api/users/{user_id}",
    params(("user_id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "Public profile with counts"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(db): State<DatabaseConnection>,
    session: OptionalClaims,
    Path(user_id): Path<String>,
) -> Result<Json<ProfileView>, DomainError> {
    let profile = user_service::get_profile(&db, &user_id, session.user_id()).await?;
    Ok(Json(profile))
}
