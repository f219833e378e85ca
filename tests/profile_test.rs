mod common;

use axum::http::{Method, StatusCode};

use common::{create_user, multipart_request, spawn_app};

#[tokio::test]
async fn test_get_own_profile() {
    let app = spawn_app().await;
    let (id, token) = create_user(&app.db, "Janja").await;

    let (status, profile) = app.get("/api/profile", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["id"], id.as_str());
    assert_eq!(profile["isCurrentUser"], true);
    assert_eq!(profile["_count"]["posts"], 0);
}

#[tokio::test]
async fn test_update_profile_fields_and_pictures() {
    let app = spawn_app().await;
    let (id, token) = create_user(&app.db, "Janja").await;

    let req = multipart_request(
        Method::PUT,
        "/api/profile",
        Some(&token),
        &[
            ("name", None, b"Janja G".as_slice()),
            ("bio", None, b"Competition climber".as_slice()),
            ("location", None, b"".as_slice()),
            ("website", None, b"https://example.com".as_slice()),
            ("bannerPictureDataUrl", None, b"data:image/png;base64,AAAA".as_slice()),
            ("profilePicture", Some("me.jpg"), b"\xFF\xD8\xFF".as_slice()),
        ],
    );
    let (status, body) = app.send(req).await;
    assert_eq!(status, StatusCode::OK);

    let user = &body["user"];
    assert_eq!(user["name"], "Janja G");
    assert_eq!(user["bio"], "Competition climber");
    assert_eq!(user["location"], serde_json::Value::Null);
    assert_eq!(user["bannerImage"], "data:image/png;base64,AAAA");

    let image = user["image"].as_str().unwrap();
    assert!(image.starts_with(&format!("/uploads/{}_profile_", id)));
    assert!(image.ends_with("_me.jpg"));
    assert_eq!(app.stored_uploads(), 1);
}

#[tokio::test]
async fn test_update_profile_rejects_bad_website() {
    let app = spawn_app().await;
    let (_, token) = create_user(&app.db, "Janja").await;

    let req = multipart_request(
        Method::PUT,
        "/api/profile",
        Some(&token),
        &[("website", None, b"ftp://example.com".as_slice())],
    );
    let (status, body) = app.send(req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"]["website"].is_string());
}

#[tokio::test]
async fn test_rejected_update_keeps_no_uploaded_files() {
    let app = spawn_app().await;
    let (_, token) = create_user(&app.db, "Janja").await;

    let req = multipart_request(
        Method::PUT,
        "/api/profile",
        Some(&token),
        &[
            ("website", None, b"ftp://nope".as_slice()),
            ("profilePicture", Some("wall.jpg"), b"\xFF\xD8\xFF".as_slice()),
            ("bannerPicture", Some("crag.jpg"), b"\xFF\xD8\xFF".as_slice()),
        ],
    );
    let (status, _) = app.send(req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.stored_uploads(), 0);

    let (_, profile) = app.get("/api/profile", Some(&token)).await;
    assert_eq!(profile["image"], serde_json::Value::Null);
}

#[tokio::test]
async fn test_update_rejects_malformed_website_host() {
    let app = spawn_app().await;
    let (_, token) = create_user(&app.db, "Janja").await;

    for website in ["https://%%%", "http:///", "http://[::1"] {
        let req = multipart_request(
            Method::PUT,
            "/api/profile",
            Some(&token),
            &[("website", None, website.as_bytes())],
        );
        let (status, body) = app.send(req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", website);
        assert!(body["details"]["website"].is_string());
    }
}
