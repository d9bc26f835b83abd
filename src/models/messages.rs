use crate::entities::messages::Message as MessageEntity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub conversation_id: i64,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub content: String,
    pub unread: bool,
    pub created_at: DateTime<Utc>,
}

impl From<MessageEntity> for Message {
    fn from(value: MessageEntity) -> Self {
        Self {
            id: value.id,
            conversation_id: value.conversation_id,
            sender_id: value.sender_id,
            receiver_id: value.receiver_id,
            content: value.content,
            unread: value.unread,
            created_at: value.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SendMessageArgs {
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UnreadCountResponse {
    pub count: i64,
}
