mod common;

use axum::http::StatusCode;
use climbtime::auth::{create_jwt, decode_jwt, hash_password, verify_password};
use serde_json::json;

use common::spawn_app;

#[tokio::test]
async fn test_password_hashing() {
    let password = "super_secret_password";
    let hash = hash_password(password).expect("Failed to hash password");

    assert_ne!(password, hash);
    assert!(verify_password(password, &hash).unwrap());
    assert!(!verify_password("wrong_password", &hash).unwrap());
}

#[tokio::test]
async fn test_jwt_creation_and_verification() {
    let token = create_jwt("user-42", "climber@example.com").expect("Failed to create JWT");
    assert!(!token.is_empty());

    let claims = decode_jwt(&token).expect("Failed to verify JWT");
    assert_eq!(claims.sub, "user-42");
    assert_eq!(claims.email, "climber@example.com");
}

#[tokio::test]
async fn test_signup_login_me_flow() {
    let app = spawn_app().await;

    let (status, body) = app
        .post(
            "/api/auth/signup",
            None,
            json!({ "name": "Alex Honnold", "email": "Alex@Example.com", "password": "freesolo" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["email"], "alex@example.com");
    assert!(body["user"].get("passwordHash").is_none());
    assert!(body["user"].get("password_hash").is_none());

    let (status, body) = app
        .post(
            "/api/auth/login",
            None,
            json!({ "email": "alex@example.com", "password": "freesolo" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_string();
    let user_id = body["user"]["id"].as_str().unwrap().to_string();

    let (status, me) = app.get("/api/auth/me", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["id"], user_id.as_str());
    assert_eq!(me["name"], "Alex Honnold");
}

#[tokio::test]
async fn test_duplicate_email_conflicts() {
    let app = spawn_app().await;
    let payload = json!({ "name": "Lynn Hill", "email": "lynn@example.com", "password": "thenose" });

    let (status, _) = app.post("/api/auth/signup", None, payload.clone()).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app.post("/api/auth/signup", None, payload).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_bad_credentials_are_indistinguishable() {
    let app = spawn_app().await;
    app.post(
        "/api/auth/signup",
        None,
        json!({ "name": "Tommy", "email": "tommy@example.com", "password": "dawnwall" }),
    )
    .await;

    let (wrong_status, wrong_body) = app
        .post(
            "/api/auth/login",
            None,
            json!({ "email": "tommy@example.com", "password": "nope-nope" }),
        )
        .await;
    let (unknown_status, unknown_body) = app
        .post(
            "/api/auth/login",
            None,
            json!({ "email": "ghost@example.com", "password": "dawnwall" }),
        )
        .await;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_body, unknown_body);
}

#[tokio::test]
async fn test_signup_validation_reports_fields() {
    let app = spawn_app().await;

    let (status, body) = app
        .post(
            "/api/auth/signup",
            None,
            json!({ "name": "A", "email": "not-an-email", "password": "123" }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid input");
    assert!(body["details"]["name"].is_string());
    assert!(body["details"]["email"].is_string());
    assert!(body["details"]["password"].is_string());
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = spawn_app().await;

    let (status, body) = app.get("/api/auth/me", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());

    let (status, _) = app.get("/api/auth/me", Some("not-a-jwt")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .post("/api/posts", None, json!({ "content": "anonymous beta" }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = spawn_app().await;
    let (status, body) = app.get("/api/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "climbtime");
}
