use crate::common::context::Context;
use crate::entities::conversations::{Conversation, ConversationWithPeer, Participant};
use chrono::Utc;

const TABLE_NAME: &str = "conversations";
const READ_FIELDS: &str = "id, pair_key, created_at, last_message_at";

/// Canonical key for an unordered user pair. A unique index on this column is
/// what makes find-or-create safe under concurrent requests.
pub fn pair_key(user_a: i64, user_b: i64) -> String {
    let (lo, hi) = match user_a <= user_b {
        true => (user_a, user_b),
        false => (user_b, user_a),
    };
    format!("{lo}:{hi}")
}

pub async fn fetch_one<C: Context>(ctx: &C, conversation_id: i64) -> sqlx::Result<Conversation> {
    const QUERY: &str = const_str::concat!(
        "SELECT ",
        READ_FIELDS,
        " FROM ",
        TABLE_NAME,
        " WHERE id = ?"
    );
    sqlx::query_as(QUERY)
        .bind(conversation_id)
        .fetch_one(ctx.db())
        .await
}

pub async fn fetch_by_pair<C: Context>(
    ctx: &C,
    user_a: i64,
    user_b: i64,
) -> sqlx::Result<Option<Conversation>> {
    const QUERY: &str = const_str::concat!(
        "SELECT ",
        READ_FIELDS,
        " FROM ",
        TABLE_NAME,
        " WHERE pair_key = ?"
    );
    sqlx::query_as(QUERY)
        .bind(pair_key(user_a, user_b))
        .fetch_optional(ctx.db())
        .await
}

/// Creates the conversation together with both participant rows in one
/// transaction. Fails with a unique violation on `pair_key` when a concurrent
/// request created the pair first; the caller re-queries in that case.
pub async fn create<C: Context>(
    ctx: &C,
    user_a: i64,
    user_b: i64,
) -> sqlx::Result<Conversation> {
    const INSERT_CONVERSATION: &str = const_str::concat!(
        "INSERT INTO ",
        TABLE_NAME,
        " (pair_key, created_at, last_message_at) VALUES (?, ?, ?)"
    );
    const INSERT_PARTICIPANT: &str =
        "INSERT INTO conversation_participants (conversation_id, user_id) VALUES (?, ?)";

    let key = pair_key(user_a, user_b);
    let now = Utc::now();
    let mut tx = ctx.db().begin().await?;
    let result = sqlx::query(INSERT_CONVERSATION)
        .bind(&key)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;
    let conversation_id = result.last_insert_id() as i64;
    for user_id in [user_a, user_b] {
        sqlx::query(INSERT_PARTICIPANT)
            .bind(conversation_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;
    Ok(Conversation {
        id: conversation_id,
        pair_key: key,
        created_at: now,
        last_message_at: now,
    })
}

pub async fn fetch_participants<C: Context>(
    ctx: &C,
    conversation_id: i64,
) -> sqlx::Result<Vec<Participant>> {
    const QUERY: &str = const_str::concat!(
        "SELECT conversation_id, user_id, last_read_at ",
        "FROM conversation_participants WHERE conversation_id = ?"
    );
    sqlx::query_as(QUERY)
        .bind(conversation_id)
        .fetch_all(ctx.db())
        .await
}

/// Every conversation the user participates in, joined with the display
/// fields of the other participant, most recently active first.
pub async fn fetch_all_for_user<C: Context>(
    ctx: &C,
    user_id: i64,
) -> sqlx::Result<Vec<ConversationWithPeer>> {
    const QUERY: &str = const_str::concat!(
        "SELECT c.id, c.created_at, c.last_message_at, ",
        "peer.user_id AS peer_id, u.name AS peer_name, ",
        "u.avatar_url AS peer_avatar_url, u.headline AS peer_headline ",
        "FROM ",
        TABLE_NAME,
        " c ",
        "INNER JOIN conversation_participants me ",
        "ON me.conversation_id = c.id AND me.user_id = ? ",
        "LEFT JOIN conversation_participants peer ",
        "ON peer.conversation_id = c.id AND peer.user_id <> ? ",
        "LEFT JOIN users u ON u.id = peer.user_id ",
        "ORDER BY c.last_message_at DESC"
    );
    sqlx::query_as(QUERY)
        .bind(user_id)
        .bind(user_id)
        .fetch_all(ctx.db())
        .await
}

pub async fn mark_participant_read<C: Context>(
    ctx: &C,
    conversation_id: i64,
    user_id: i64,
) -> sqlx::Result<()> {
    const QUERY: &str = const_str::concat!(
        "UPDATE conversation_participants SET last_read_at = ? ",
        "WHERE conversation_id = ? AND user_id = ?"
    );
    sqlx::query(QUERY)
        .bind(Utc::now())
        .bind(conversation_id)
        .bind(user_id)
        .execute(ctx.db())
        .await?;
    Ok(())
}
