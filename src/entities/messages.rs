use chrono::{DateTime, Utc};

#[derive(Debug, sqlx::FromRow)]
pub struct Message {
    pub id: i64,
    pub conversation_id: i64,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub content: String,
    /// Set on insert, cleared for the receiver by mark-read.
    pub unread: bool,
    pub created_at: DateTime<Utc>,
}
