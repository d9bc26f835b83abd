use chrono::{DateTime, Utc};

#[derive(Debug, sqlx::FromRow)]
pub struct Conversation {
    pub id: i64,
    /// Canonical `"{min_user_id}:{max_user_id}"` key, unique per user pair.
    pub pair_key: String,
    pub created_at: DateTime<Utc>,
    pub last_message_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
pub struct Participant {
    pub conversation_id: i64,
    pub user_id: i64,
    pub last_read_at: Option<DateTime<Utc>>,
}

/// A conversation joined with the display fields of the requester's peer,
/// as returned by the conversation list query. The peer columns come from
/// outer joins and are NULL when the second participant row or its user
/// directory entry is missing, so that integrity fault stays visible to the
/// caller instead of the row silently dropping out of the list.
#[derive(Debug, sqlx::FromRow)]
pub struct ConversationWithPeer {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub last_message_at: DateTime<Utc>,
    pub peer_id: Option<i64>,
    pub peer_name: Option<String>,
    pub peer_avatar_url: Option<String>,
    pub peer_headline: Option<String>,
}
