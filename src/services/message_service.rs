//! Message Service - conversations between mutually-following users

use sea_orm::sea_query::Expr;
use sea_orm::*;
use serde::Serialize;

use super::{follow_service, require_user, summaries_by_id};
use crate::domain::validation::MESSAGE_MAX_LEN;
use crate::domain::{DomainError, FieldErrors};
use crate::models::conversation::{self, Entity as Conversation};
use crate::models::message::{self, Entity as Message, MessageDto};
use crate::models::UserSummary;
use crate::utils::{new_id, time::now_timestamp};

const NOT_MUTUAL: &str = "You can only message users who follow you and whom you follow";

#[derive(Debug, Clone)]
pub struct SendMessageInput {
    pub conversation_id: String,
    pub content: String,
    pub receiver_id: Option<String>,
}

/// Inbox entry for the caller.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    pub id: String,
    pub initiator_id: String,
    pub receiver_id: String,
    pub initiator: Option<UserSummary>,
    pub receiver: Option<UserSummary>,
    pub last_message_at: String,
    pub created_at: String,
    pub last_message: Option<MessageDto>,
    pub unread_count: u64,
}

/// Find the conversation for the unordered pair, or create it.
/// Both users must follow each other.
pub async fn start_conversation(
    db: &DatabaseConnection,
    user_id: &str,
    receiver_id: &str,
) -> Result<String, DomainError> {
    if receiver_id.trim().is_empty() {
        return Err(DomainError::Validation("Missing receiverId".to_string()));
    }
    if receiver_id == user_id {
        return Err(DomainError::Validation(
            "You cannot start a conversation with yourself".to_string(),
        ));
    }

    require_user(db, receiver_id, "Receiver not found").await?;

    if !follow_service::is_mutual_follow(db, user_id, receiver_id).await? {
        return Err(DomainError::Forbidden(NOT_MUTUAL.to_string()));
    }

    let pair = Condition::any()
        .add(
            Condition::all()
                .add(conversation::Column::InitiatorId.eq(user_id))
                .add(conversation::Column::ReceiverId.eq(receiver_id)),
        )
        .add(
            Condition::all()
                .add(conversation::Column::InitiatorId.eq(receiver_id))
                .add(conversation::Column::ReceiverId.eq(user_id)),
        );

    if let Some(existing) = Conversation::find().filter(pair.clone()).one(db).await? {
        return Ok(existing.id);
    }

    let now = now_timestamp();
    let inserted = conversation::ActiveModel {
        id: Set(new_id()),
        initiator_id: Set(user_id.to_string()),
        receiver_id: Set(receiver_id.to_string()),
        last_message_at: Set(now.clone()),
        created_at: Set(now),
    }
    .insert(db)
    .await;

    let created = match inserted {
        Ok(created) => created,
        // The other participant created the pair first
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            return Conversation::find()
                .filter(pair)
                .one(db)
                .await?
                .map(|existing| existing.id)
                .ok_or_else(|| DomainError::Database(e.to_string()));
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!(
        "Conversation {} started between {} and {}",
        created.id,
        user_id,
        receiver_id
    );

    Ok(created.id)
}

/// Load a conversation the caller takes part in.
async fn participant_conversation(
    db: &DatabaseConnection,
    user_id: &str,
    conversation_id: &str,
) -> Result<conversation::Model, DomainError> {
    let conversation = Conversation::find_by_id(conversation_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| DomainError::NotFound("Conversation not found".to_string()))?;

    if !conversation.has_participant(user_id) {
        tracing::warn!(
            "User {} tried to access conversation {}",
            user_id,
            conversation_id
        );
        return Err(DomainError::Forbidden(
            "You are not a participant in this conversation".to_string(),
        ));
    }

    Ok(conversation)
}

pub async fn send_message(
    db: &DatabaseConnection,
    user_id: &str,
    input: SendMessageInput,
) -> Result<MessageDto, DomainError> {
    let mut errors = FieldErrors::new();
    errors.require_id("conversationId", "Conversation ID", &input.conversation_id);
    errors.require_text("content", "Message", &input.content, MESSAGE_MAX_LEN);
    errors.into_result()?;

    let conversation = participant_conversation(db, user_id, &input.conversation_id).await?;
    let receiver_id = conversation.other_participant(user_id).to_string();

    if let Some(claimed) = input.receiver_id.as_deref() {
        if !claimed.is_empty() && claimed != receiver_id {
            return Err(DomainError::Validation(
                "Receiver is not part of this conversation".to_string(),
            ));
        }
    }

    if !follow_service::is_mutual_follow(db, user_id, &receiver_id).await? {
        return Err(DomainError::Forbidden(NOT_MUTUAL.to_string()));
    }

    let now = now_timestamp();
    let txn = db.begin().await?;

    let saved = message::ActiveModel {
        id: Set(new_id()),
        content: Set(input.content),
        sender_id: Set(user_id.to_string()),
        receiver_id: Set(receiver_id),
        conversation_id: Set(conversation.id.clone()),
        read: Set(false),
        created_at: Set(now.clone()),
    }
    .insert(&txn)
    .await?;

    let mut active: conversation::ActiveModel = conversation.into();
    active.last_message_at = Set(now);
    active.update(&txn).await?;

    txn.commit().await?;

    Ok(MessageDto::from(saved))
}

/// Messages oldest first; afterwards the caller's unread ones are marked read.
pub async fn read_conversation(
    db: &DatabaseConnection,
    user_id: &str,
    conversation_id: &str,
) -> Result<Vec<MessageDto>, DomainError> {
    participant_conversation(db, user_id, conversation_id).await?;

    let messages = Message::find()
        .filter(message::Column::ConversationId.eq(conversation_id))
        .order_by_asc(message::Column::CreatedAt)
        .all(db)
        .await?;

    let marked = Message::update_many()
        .col_expr(message::Column::Read, Expr::value(true))
        .filter(message::Column::ConversationId.eq(conversation_id))
        .filter(message::Column::ReceiverId.eq(user_id))
        .filter(message::Column::Read.eq(false))
        .exec(db)
        .await?;

    if marked.rows_affected > 0 {
        tracing::debug!(
            "Marked {} messages read in {} for {}",
            marked.rows_affected,
            conversation_id,
            user_id
        );
    }

    Ok(messages.into_iter().map(MessageDto::from).collect())
}

/// The caller's conversations, most recently active first.
pub async fn list_conversations(
    db: &DatabaseConnection,
    user_id: &str,
) -> Result<Vec<ConversationSummary>, DomainError> {
    let conversations = Conversation::find()
        .filter(
            Condition::any()
                .add(conversation::Column::InitiatorId.eq(user_id))
                .add(conversation::Column::ReceiverId.eq(user_id)),
        )
        .order_by_desc(conversation::Column::LastMessageAt)
        .all(db)
        .await?;

    let mut participant_ids: Vec<String> = conversations
        .iter()
        .flat_map(|c| [c.initiator_id.clone(), c.receiver_id.clone()])
        .collect();
    participant_ids.sort();
    participant_ids.dedup();
    let people = summaries_by_id(db, &participant_ids).await?;

    let mut summaries = Vec::with_capacity(conversations.len());
    for c in conversations {
        let last_message = Message::find()
            .filter(message::Column::ConversationId.eq(c.id.as_str()))
            .order_by_desc(message::Column::CreatedAt)
            .one(db)
            .await?
            .map(MessageDto::from);

        let unread_count = Message::find()
            .filter(message::Column::ConversationId.eq(c.id.as_str()))
            .filter(message::Column::ReceiverId.eq(user_id))
            .filter(message::Column::Read.eq(false))
            .count(db)
            .await?;

        summaries.push(ConversationSummary {
            initiator: people.get(&c.initiator_id).cloned(),
            receiver: people.get(&c.receiver_id).cloned(),
            id: c.id,
            initiator_id: c.initiator_id,
            receiver_id: c.receiver_id,
            last_message_at: c.last_message_at,
            created_at: c.created_at,
            last_message,
            unread_count,
        });
    }

    Ok(summaries)
}

pub async fn unread_count(db: &DatabaseConnection, user_id: &str) -> Result<u64, DomainError> {
    let count = Message::find()
        .filter(message::Column::ReceiverId.eq(user_id))
        .filter(message::Column::Read.eq(false))
        .count(db)
        .await?;
    Ok(count)
}
