use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use serde_json::json;

use crate::auth::{create_jwt, Claims};
use crate::domain::DomainError;
use crate::models::user::UserProfileDto;
use crate::services::user_service::{self, SignupInput};

#[derive(Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

#[utoipa::path(
    post,
    path = "/api/auth/signup",
    responses(
        (status = 201, description = "Account created"),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn signup(
    State(db): State<DatabaseConnection>,
    Json(payload): Json<SignupRequest>,
) -> Result<impl IntoResponse, DomainError> {
    let user = user_service::signup(
        &db,
        SignupInput {
            name: payload.name,
            email: payload.email,
            password: payload.password,
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User created successfully", "user": user })),
    ))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    responses(
        (status = 200, description = "Session token issued"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(db): State<DatabaseConnection>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, DomainError> {
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(DomainError::Validation(
            "Email and password are required".to_string(),
        ));
    }

    let user = user_service::authenticate(&db, &payload.email, &payload.password).await?;
    let token = create_jwt(&user.id, &user.email).map_err(DomainError::Internal)?;

    tracing::info!("User {} logged in", user.id);

    Ok(Json(json!({
        "token": token,
        "user": UserProfileDto::from(user),
    })))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Signed-in user"),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn get_me(
    State(db): State<DatabaseConnection>,
    claims: Claims,
) -> Result<Json<UserProfileDto>, DomainError> {
    let user = user_service::get_user(&db, claims.user_id()).await?;
    Ok(Json(user))
}
