//! User Service - accounts, profiles and people discovery

use std::collections::HashSet;

use sea_orm::*;
use serde::Serialize;

use super::follow_service::{self, followed_among};
use super::{contains_literal, count_grouped, require_user};
use crate::auth::{hash_password, verify_password};
use crate::domain::validation::{
    is_http_url, is_valid_email, BIO_MAX_LEN, NAME_MAX_LEN, NAME_MIN_LEN, PASSWORD_MIN_LEN,
};
use crate::domain::{DomainError, FieldErrors};
use crate::models::follow::{self, Entity as Follow};
use crate::models::post::{self, Entity as Post};
use crate::models::user::{self, Entity as User, UserProfileDto, UserSummary};
use crate::utils::{new_id, time::now_timestamp};

pub const SEARCH_LIMIT: u64 = 10;
pub const SUGGESTED_LIMIT: usize = 6;

#[derive(Debug, Clone)]
pub struct SignupInput {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileCounts {
    pub posts: u64,
    pub followed_by: u64,
    pub following: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    #[serde(flatten)]
    pub user: UserProfileDto,
    #[serde(rename = "_count")]
    pub count: ProfileCounts,
    pub is_following: bool,
    pub is_current_user: bool,
}

/// Search hit with the caller's follow state.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSearchHit {
    #[serde(flatten)]
    pub user: UserSummary,
    pub is_following: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowerCount {
    pub followed_by: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SuggestedUser {
    #[serde(flatten)]
    pub user: UserSummary,
    #[serde(rename = "_count")]
    pub count: FollowerCount,
}

/// Fields to change on a profile; `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub image: Option<String>,
    pub banner_image: Option<String>,
}

impl ProfileUpdate {
    /// Checks the text fields. Picture URLs are not validated here.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if let Some(name) = &self.name {
            validate_name(&mut errors, name);
        }
        if let Some(bio) = &self.bio {
            if bio.chars().count() > BIO_MAX_LEN {
                errors.add(
                    "bio",
                    format!("Bio cannot exceed {} characters", BIO_MAX_LEN),
                );
            }
        }
        if let Some(website) = &self.website {
            if !is_http_url(website) {
                errors.add("website", "Website must be an http(s) URL");
            }
        }
        errors.into_result()
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_name(errors: &mut FieldErrors, name: &str) {
    let len = name.trim().chars().count();
    if len < NAME_MIN_LEN {
        errors.add(
            "name",
            format!("Name must be at least {} characters", NAME_MIN_LEN),
        );
    } else if len > NAME_MAX_LEN {
        errors.add(
            "name",
            format!("Name cannot exceed {} characters", NAME_MAX_LEN),
        );
    }
}

/// Register a new account.
pub async fn signup(
    db: &DatabaseConnection,
    input: SignupInput,
) -> Result<UserProfileDto, DomainError> {
    let email = normalize_email(&input.email);

    let mut errors = FieldErrors::new();
    validate_name(&mut errors, &input.name);
    if !is_valid_email(&email) {
        errors.add("email", "Invalid email address");
    }
    if input.password.chars().count() < PASSWORD_MIN_LEN {
        errors.add(
            "password",
            format!("Password must be at least {} characters", PASSWORD_MIN_LEN),
        );
    }
    errors.into_result()?;

    let existing = User::find()
        .filter(user::Column::Email.eq(&email))
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(DomainError::Conflict(
            "An account with this email already exists".to_string(),
        ));
    }

    let password_hash = hash_password(&input.password).map_err(DomainError::Internal)?;
    let now = now_timestamp();

    let new_user = user::ActiveModel {
        id: Set(new_id()),
        name: Set(input.name.trim().to_string()),
        email: Set(email),
        password_hash: Set(password_hash),
        image: Set(None),
        banner_image: Set(None),
        bio: Set(None),
        location: Set(None),
        website: Set(None),
        created_at: Set(now.clone()),
        updated_at: Set(now),
    };

    let saved = new_user.insert(db).await?;
    tracing::info!("New account registered: {}", saved.id);

    Ok(UserProfileDto::from(saved))
}

/// Check credentials. Unknown email and wrong password are indistinguishable.
pub async fn authenticate(
    db: &DatabaseConnection,
    email: &str,
    password: &str,
) -> Result<user::Model, DomainError> {
    let invalid = || DomainError::Unauthorized("Invalid email or password".to_string());
    let email = normalize_email(email);

    let Some(user) = User::find()
        .filter(user::Column::Email.eq(&email))
        .one(db)
        .await?
    else {
        tracing::warn!("Login attempt for unknown email");
        return Err(invalid());
    };

    match verify_password(password, &user.password_hash) {
        Ok(true) => Ok(user),
        Ok(false) => {
            tracing::warn!("Password verification failed for user: {}", user.id);
            Err(invalid())
        }
        Err(e) => {
            tracing::error!("Stored password hash unreadable for {}: {}", user.id, e);
            Err(invalid())
        }
    }
}

pub async fn get_user(db: &DatabaseConnection, id: &str) -> Result<UserProfileDto, DomainError> {
    let user = require_user(db, id, "User not found").await?;
    Ok(UserProfileDto::from(user))
}

/// Public profile with post/follower/following counts.
pub async fn get_profile(
    db: &DatabaseConnection,
    user_id: &str,
    viewer_id: Option<&str>,
) -> Result<ProfileView, DomainError> {
    let user = require_user(db, user_id, "User not found").await?;

    let posts = Post::find()
        .filter(post::Column::UserId.eq(user_id))
        .count(db)
        .await?;
    let followed_by = Follow::find()
        .filter(follow::Column::FollowingId.eq(user_id))
        .count(db)
        .await?;
    let following = Follow::find()
        .filter(follow::Column::FollowerId.eq(user_id))
        .count(db)
        .await?;

    let is_following = match viewer_id {
        Some(viewer) if viewer != user_id => {
            follow_service::is_following(db, viewer, user_id).await?
        }
        _ => false,
    };

    Ok(ProfileView {
        user: UserProfileDto::from(user),
        count: ProfileCounts {
            posts,
            followed_by,
            following,
        },
        is_following,
        is_current_user: viewer_id == Some(user_id),
    })
}

pub async fn update_profile(
    db: &DatabaseConnection,
    user_id: &str,
    update: ProfileUpdate,
) -> Result<UserProfileDto, DomainError> {
    update.validate()?;

    let user = require_user(db, user_id, "User not found").await?;
    let mut active: user::ActiveModel = user.into();

    if let Some(name) = update.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(bio) = update.bio {
        active.bio = Set(Some(bio));
    }
    if let Some(location) = update.location {
        active.location = Set(Some(location));
    }
    if let Some(website) = update.website {
        active.website = Set(Some(website));
    }
    if let Some(image) = update.image {
        active.image = Set(Some(image));
    }
    if let Some(banner) = update.banner_image {
        active.banner_image = Set(Some(banner));
    }
    active.updated_at = Set(now_timestamp());

    let updated = active.update(db).await?;
    tracing::info!("Profile updated for user: {}", updated.id);
    Ok(UserProfileDto::from(updated))
}

/// Which population a user search runs over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchScope {
    Everyone,
    /// Users who follow the caller
    Followers,
    /// Users who follow the caller and whom the caller follows
    MutualFollowers,
}

fn name_or_email_contains(query: &str) -> Condition {
    Condition::any()
        .add(contains_literal(user::Column::Name, query))
        .add(contains_literal(user::Column::Email, query))
}

/// Name/email substring search, at most [`SEARCH_LIMIT`] hits.
/// A blank query yields no results.
pub async fn search_users(
    db: &DatabaseConnection,
    caller_id: &str,
    query: &str,
    scope: SearchScope,
) -> Result<Vec<UserSearchHit>, DomainError> {
    let query = query.trim();
    if query.is_empty() {
        return Ok(Vec::new());
    }

    let mut condition = Condition::all().add(name_or_email_contains(query));

    match scope {
        SearchScope::Everyone => {}
        SearchScope::Followers => {
            let ids = follow_service::follower_ids(db, caller_id).await?;
            condition = condition.add(user::Column::Id.is_in(ids));
        }
        SearchScope::MutualFollowers => {
            let ids = follow_service::mutual_ids(db, caller_id).await?;
            tracing::debug!("Mutual followers of {}: {}", caller_id, ids.len());
            condition = condition.add(user::Column::Id.is_in(ids));
        }
    }

    let users = User::find()
        .filter(condition)
        .order_by_asc(user::Column::Name)
        .limit(SEARCH_LIMIT)
        .all(db)
        .await?;

    let ids: Vec<String> = users.iter().map(|u| u.id.clone()).collect();
    let followed = followed_among(db, caller_id, &ids).await?;

    Ok(users
        .into_iter()
        .map(|u| UserSearchHit {
            is_following: followed.contains(&u.id),
            user: UserSummary::from(u),
        })
        .collect())
}

/// Most-followed users the caller does not follow yet, excluding the caller.
pub async fn suggested_users(
    db: &DatabaseConnection,
    caller_id: &str,
) -> Result<Vec<SuggestedUser>, DomainError> {
    let mut excluded: HashSet<String> = follow_service::following_ids(db, caller_id)
        .await?
        .into_iter()
        .collect();
    excluded.insert(caller_id.to_string());

    let candidates = User::find()
        .filter(user::Column::Id.is_not_in(excluded.iter().cloned()))
        .all(db)
        .await?;

    let ids: Vec<String> = candidates.iter().map(|u| u.id.clone()).collect();
    let counts = count_grouped::<Follow>(db, follow::Column::FollowingId, &ids).await?;

    let mut ranked: Vec<SuggestedUser> = candidates
        .into_iter()
        .map(|u| SuggestedUser {
            count: FollowerCount {
                followed_by: counts.get(&u.id).copied().unwrap_or(0),
            },
            user: UserSummary::from(u),
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.count
            .followed_by
            .cmp(&a.count.followed_by)
            .then_with(|| a.user.name.cmp(&b.user.name))
    });
    ranked.truncate(SUGGESTED_LIMIT);

    Ok(ranked)
}
