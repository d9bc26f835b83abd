use crate::models::messages::Message;
use crate::models::users::UserInfo;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct ResolveConversationArgs {
    pub user_id: i64,
}

/// One row of the conversation list, projected for the requesting user.
#[derive(Debug, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub id: i64,
    pub last_message_at: DateTime<Utc>,
    pub other_user: UserInfo,
    pub last_message: Option<Message>,
    pub unread_count: i64,
}

/// A single conversation with its full message history, oldest first.
#[derive(Debug, Serialize, Deserialize)]
pub struct ConversationDetail {
    pub id: i64,
    pub other_user: UserInfo,
    pub messages: Vec<Message>,
}

/// Outcome of resolve-or-create. `created` is reported by the insert path
/// itself rather than inferred from the message count, so a pre-existing
/// empty conversation is never misclassified as new.
#[derive(Debug)]
pub struct ConversationResolution {
    pub detail: ConversationDetail,
    pub created: bool,
}
