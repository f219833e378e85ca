use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "messages")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub content: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub conversation_id: String,
    pub read: bool,
    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::conversation::Entity",
        from = "Column::ConversationId",
        to = "super::conversation::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Conversation,
}

impl Related<super::conversation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Conversation.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDto {
    pub id: String,
    pub content: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub conversation_id: String,
    pub read: bool,
    pub created_at: String,
}

impl From<Model> for MessageDto {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            content: model.content,
            sender_id: model.sender_id,
            receiver_id: model.receiver_id,
            conversation_id: model.conversation_id,
            read: model.read,
            created_at: model.created_at,
        }
    }
}
