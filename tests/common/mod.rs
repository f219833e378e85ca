#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use climbtime::auth;
use climbtime::config::Config;
use climbtime::db;
use climbtime::infrastructure::AppState;
use climbtime::prediction::{PredictionClient, RetryPolicy};
use climbtime::server::build_router;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use serde_json::Value;
use std::path::PathBuf;
use std::time::Duration;
use tower::util::ServiceExt; // for `oneshot`

pub struct TestApp {
    pub router: Router,
    pub db: DatabaseConnection,
    pub upload_dir: PathBuf,
}

// Prediction calls go to a closed port unless a mock server is given
pub async fn spawn_app() -> TestApp {
    spawn_app_with_prediction("http://127.0.0.1:9").await
}

pub async fn spawn_app_with_prediction(prediction_url: &str) -> TestApp {
    let db = db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB");
    let config = Config::for_tests(prediction_url);
    let upload_dir = config.upload_dir.clone();
    let prediction = PredictionClient::new(prediction_url, Duration::from_secs(5))
        .expect("Failed to build prediction client")
        .with_policies(
            RetryPolicy::PREDICT.without_delay(),
            RetryPolicy::HEALTH.without_delay(),
        );
    let state = AppState::with_prediction(db.clone(), config, prediction);

    TestApp {
        router: build_router(state),
        db,
        upload_dir,
    }
}

impl TestApp {
    /// Files currently in the upload directory (0 if it was never created).
    pub fn stored_uploads(&self) -> usize {
        std::fs::read_dir(&self.upload_dir)
            .map(|entries| entries.count())
            .unwrap_or(0)
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let req = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(req).await
    }

    pub async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn follow(&self, token: &str, target: &str) {
        let (status, _) = self
            .post(
                "/api/follow",
                Some(token),
                serde_json::json!({ "targetUserId": target, "action": "follow" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
    }
}

/// Insert a user directly and mint a session for them.
pub async fn create_user(db: &DatabaseConnection, name: &str) -> (String, String) {
    let id = uuid::Uuid::new_v4().to_string();
    let email = format!("{}@example.com", name.to_lowercase().replace(' ', "."));
    let now = chrono::Utc::now().to_rfc3339();
    climbtime::models::user::ActiveModel {
        id: Set(id.clone()),
        name: Set(name.to_string()),
        email: Set(email.clone()),
        password_hash: Set("$argon2id$dummy_hash".to_string()),
        image: Set(None),
        banner_image: Set(None),
        bio: Set(None),
        location: Set(None),
        website: Set(None),
        created_at: Set(now.clone()),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("Failed to create user");

    let token = auth::create_jwt(&id, &email).expect("Failed to create token");
    (id, token)
}

pub fn multipart_body(boundary: &str, parts: &[(&str, Option<&str>, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, file_name, data) in parts {
        body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
        match file_name {
            Some(file_name) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: image/jpeg\r\n\r\n",
                        name, file_name
                    )
                    .as_bytes(),
                );
            }
            None => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name)
                        .as_bytes(),
                );
            }
        }
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());
    body
}

pub fn multipart_request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    parts: &[(&str, Option<&str>, &[u8])],
) -> Request<Body> {
    let boundary = "climbtime-test-boundary";
    let mut builder = Request::builder().method(method).uri(uri).header(
        header::CONTENT_TYPE,
        format!("multipart/form-data; boundary={}", boundary),
    );
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder
        .body(Body::from(multipart_body(boundary, parts)))
        .unwrap()
}
