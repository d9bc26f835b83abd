use crate::common::context::Context;
use crate::entities::messages::Message;
use chrono::Utc;

const TABLE_NAME: &str = "messages";
const READ_FIELDS: &str =
    "id, conversation_id, sender_id, receiver_id, content, unread, created_at";

/// Appends a message and bumps the parent conversation's `last_message_at`
/// to the same instant, in one transaction. The auto-increment id is the
/// ordering key: unlike the bound timestamp it stays monotonic even when
/// the application clock steps backwards between sends.
pub async fn create<C: Context>(
    ctx: &C,
    conversation_id: i64,
    sender_id: i64,
    receiver_id: i64,
    content: &str,
) -> sqlx::Result<Message> {
    const INSERT: &str = const_str::concat!(
        "INSERT INTO ",
        TABLE_NAME,
        " (conversation_id, sender_id, receiver_id, content, unread, created_at) ",
        "VALUES (?, ?, ?, ?, TRUE, ?)"
    );
    const TOUCH: &str = "UPDATE conversations SET last_message_at = ? WHERE id = ?";

    let now = Utc::now();
    let mut tx = ctx.db().begin().await?;
    let result = sqlx::query(INSERT)
        .bind(conversation_id)
        .bind(sender_id)
        .bind(receiver_id)
        .bind(content)
        .bind(now)
        .execute(&mut *tx)
        .await?;
    sqlx::query(TOUCH)
        .bind(now)
        .bind(conversation_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    Ok(Message {
        id: result.last_insert_id() as i64,
        conversation_id,
        sender_id,
        receiver_id,
        content: content.to_string(),
        unread: true,
        created_at: now,
    })
}

pub async fn fetch_for_conversation<C: Context>(
    ctx: &C,
    conversation_id: i64,
) -> sqlx::Result<Vec<Message>> {
    const QUERY: &str = const_str::concat!(
        "SELECT ",
        READ_FIELDS,
        " FROM ",
        TABLE_NAME,
        " WHERE conversation_id = ? ORDER BY id ASC"
    );
    sqlx::query_as(QUERY)
        .bind(conversation_id)
        .fetch_all(ctx.db())
        .await
}

/// The newest message of each conversation the user participates in.
pub async fn fetch_last_per_conversation<C: Context>(
    ctx: &C,
    user_id: i64,
) -> sqlx::Result<Vec<Message>> {
    const QUERY: &str = const_str::concat!(
        "SELECT ",
        READ_FIELDS,
        " FROM ",
        TABLE_NAME,
        " WHERE id IN (",
        "SELECT MAX(m.id) FROM messages m ",
        "INNER JOIN conversation_participants p ",
        "ON p.conversation_id = m.conversation_id ",
        "WHERE p.user_id = ? GROUP BY m.conversation_id)"
    );
    sqlx::query_as(QUERY).bind(user_id).fetch_all(ctx.db()).await
}

/// Unread message counts addressed to the user, grouped by conversation.
pub async fn unread_counts_by_conversation<C: Context>(
    ctx: &C,
    receiver_id: i64,
) -> sqlx::Result<Vec<(i64, i64)>> {
    const QUERY: &str = const_str::concat!(
        "SELECT conversation_id, COUNT(*) FROM ",
        TABLE_NAME,
        " WHERE receiver_id = ? AND unread IS TRUE GROUP BY conversation_id"
    );
    sqlx::query_as(QUERY)
        .bind(receiver_id)
        .fetch_all(ctx.db())
        .await
}

pub async fn unread_count_total<C: Context>(ctx: &C, receiver_id: i64) -> sqlx::Result<i64> {
    const QUERY: &str = const_str::concat!(
        "SELECT COUNT(*) FROM ",
        TABLE_NAME,
        " WHERE receiver_id = ? AND unread IS TRUE"
    );
    sqlx::query_scalar(QUERY)
        .bind(receiver_id)
        .fetch_one(ctx.db())
        .await
}

pub async fn mark_read<C: Context>(
    ctx: &C,
    conversation_id: i64,
    receiver_id: i64,
) -> sqlx::Result<()> {
    const QUERY: &str = const_str::concat!(
        "UPDATE ",
        TABLE_NAME,
        " SET unread = FALSE ",
        "WHERE conversation_id = ? AND receiver_id = ? AND unread IS TRUE"
    );
    sqlx::query(QUERY)
        .bind(conversation_id)
        .bind(receiver_id)
        .execute(ctx.db())
        .await?;
    Ok(())
}
