mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{create_user, spawn_app, TestApp};

async fn start(app: &TestApp, token: &str, receiver: &str) -> (StatusCode, serde_json::Value) {
    app.post(
        "/api/messages/conversation",
        Some(token),
        json!({ "receiverId": receiver }),
    )
    .await
}

#[tokio::test]
async fn test_conversation_requires_mutual_follow() {
    let app = spawn_app().await;
    let (a_id, a) = create_user(&app.db, "Ava").await;
    let (b_id, b) = create_user(&app.db, "Ben").await;

    let (status, body) = start(&app, &a, &b_id).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body["error"],
        "You can only message users who follow you and whom you follow"
    );

    // One direction is not enough
    app.follow(&a, &b_id).await;
    let (status, _) = start(&app, &a, &b_id).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    app.follow(&b, &a_id).await;
    let (status, body) = start(&app, &a, &b_id).await;
    assert_eq!(status, StatusCode::OK);
    let conversation_id = body["conversationId"].as_str().unwrap().to_string();

    // Same conversation from the other side
    let (status, body) = start(&app, &b, &a_id).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["conversationId"], conversation_id.as_str());
}

#[tokio::test]
async fn test_conversation_input_errors() {
    let app = spawn_app().await;
    let (a_id, a) = create_user(&app.db, "Ava").await;

    let (status, _) = start(&app, &a, "").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = start(&app, &a, &a_id).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = start(&app, &a, "nobody").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_send_read_and_unread_counts() {
    let app = spawn_app().await;
    let (a_id, a) = create_user(&app.db, "Ava").await;
    let (b_id, b) = create_user(&app.db, "Ben").await;
    let (_, outsider) = create_user(&app.db, "Eve").await;
    app.follow(&a, &b_id).await;
    app.follow(&b, &a_id).await;

    let (_, body) = start(&app, &a, &b_id).await;
    let conversation_id = body["conversationId"].as_str().unwrap().to_string();

    for text in ["send it", "tomorrow at 9?"] {
        let (status, message) = app
            .post(
                "/api/messages",
                Some(&a),
                json!({ "conversationId": conversation_id, "content": text, "receiverId": b_id }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(message["receiverId"], b_id.as_str());
        assert_eq!(message["read"], false);
    }

    let (_, unread) = app.get("/api/messages/unread/count", Some(&b)).await;
    assert_eq!(unread["count"], 2);

    let (_, inbox) = app.get("/api/messages", Some(&b)).await;
    assert_eq!(inbox[0]["id"], conversation_id.as_str());
    assert_eq!(inbox[0]["unreadCount"], 2);
    assert_eq!(inbox[0]["lastMessage"]["content"], "tomorrow at 9?");

    // Outsiders can neither read nor write
    let uri = format!("/api/messages/{}", conversation_id);
    let (status, _) = app.get(&uri, Some(&outsider)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app
        .post(
            "/api/messages",
            Some(&outsider),
            json!({ "conversationId": conversation_id, "content": "hi" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // The sender reading does not clear the receiver's unread messages
    app.get(&uri, Some(&a)).await;
    let (_, unread) = app.get("/api/messages/unread/count", Some(&b)).await;
    assert_eq!(unread["count"], 2);

    let (status, messages) = app.get(&uri, Some(&b)).await;
    assert_eq!(status, StatusCode::OK);
    let texts: Vec<&str> = messages
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["content"].as_str().unwrap())
        .collect();
    assert_eq!(texts, vec!["send it", "tomorrow at 9?"]);

    let (_, unread) = app.get("/api/messages/unread/count", Some(&b)).await;
    assert_eq!(unread["count"], 0);

    let (_, messages) = app.get(&uri, Some(&b)).await;
    assert_eq!(messages[0]["read"], true);
}

#[tokio::test]
async fn test_send_message_validation() {
    let app = spawn_app().await;
    let (a_id, a) = create_user(&app.db, "Ava").await;
    let (b_id, b) = create_user(&app.db, "Ben").await;
    let (c_id, _) = create_user(&app.db, "Cal").await;
    app.follow(&a, &b_id).await;
    app.follow(&b, &a_id).await;
    let (_, body) = start(&app, &a, &b_id).await;
    let conversation_id = body["conversationId"].as_str().unwrap().to_string();

    let (status, _) = app
        .post("/api/messages", Some(&a), json!({ "conversationId": conversation_id }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/api/messages",
            Some(&a),
            json!({ "conversationId": conversation_id, "content": "x".repeat(2001) }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/api/messages",
            Some(&a),
            json!({ "conversationId": "missing", "content": "hello" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .post(
            "/api/messages",
            Some(&a),
            json!({ "conversationId": conversation_id, "content": "hello", "receiverId": c_id }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Unfollowing closes the channel
    app.post(
        "/api/follow",
        Some(&b),
        json!({ "targetUserId": a_id, "action": "unfollow" }),
    )
    .await;
    let (status, _) = app
        .post(
            "/api/messages",
            Some(&a),
            json!({ "conversationId": conversation_id, "content": "still there?" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
