use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use serde_json::json;

use crate::auth::Claims;
use crate::domain::DomainError;
use crate::models::message::MessageDto;
use crate::services::message_service::{self, ConversationSummary, SendMessageInput};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartConversationRequest {
    #[serde(default)]
    receiver_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    #[serde(default)]
    conversation_id: String,
    #[serde(default)]
    content: String,
    receiver_id: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/messages/conversation",
    responses(
        (status = 200, description = "Existing or new conversation id"),
        (status = 403, description = "Users do not follow each other"),
        (status = 404, description = "Receiver not found")
    )
)]
pub async fn start_conversation(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Json(payload): Json<StartConversationRequest>,
) -> Result<impl IntoResponse, DomainError> {
    let conversation_id =
        message_service::start_conversation(&db, claims.user_id(), &payload.receiver_id).await?;
    Ok(Json(json!({ "conversationId": conversation_id })))
}

#[utoipa::path(
    post,
    path = "/api/messages",
    responses(
        (status = 200, description = "Message sent"),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Not a participant, or follow is no longer mutual"),
        (status = 404, description = "Conversation not found")
    )
)]
pub async fn send_message(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Json(payload): Json<SendMessageRequest>,
) -> Result<Json<MessageDto>, DomainError> {
    let message = message_service::send_message(
        &db,
        claims.user_id(),
        SendMessageInput {
            conversation_id: payload.conversation_id,
            content: payload.content,
            receiver_id: payload.receiver_id,
        },
    )
    .await?;

    Ok(Json(message))
}

#[utoipa::path(
    get,
    path = "/api/messages/{conversation_id}",
    params(("conversation_id" = String, Path, description = "Conversation id")),
    responses(
        (status = 200, description = "Messages, oldest first; incoming ones are marked read"),
        (status = 403, description = "Not a participant"),
        (status = 404, description = "Conversation not found")
    )
)]
pub async fn read_conversation(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Path(conversation_id): Path<String>,
) -> Result<Json<Vec<MessageDto>>, DomainError> {
    let messages =
        message_service::read_conversation(&db, claims.user_id(), &conversation_id).await?;
    Ok(Json(messages))
}

#[utoipa::path(
    get,
    path = "/api/messages",
    responses((status = 200, description = "Conversations, most recent first"))
)]
pub async fn list_conversations(
    State(db): State<DatabaseConnection>,
    claims: Claims,
) -> Result<Json<Vec<ConversationSummary>>, DomainError> {
    Ok(Json(
        message_service::list_conversations(&db, claims.user_id()).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/messages/unread/count",
    responses((status = 200, description = "Unread messages addressed to the caller"))
)]
pub async fn unread_count(
    State(db): State<DatabaseConnection>,
    claims: Claims,
) -> Result<impl IntoResponse, DomainError> {
    let count = message_service::unread_count(&db, claims.user_id()).await?;
    Ok(Json(json!({ "count": count })))
}
