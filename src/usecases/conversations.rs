use crate::common::context::Context;
use crate::common::error::{AppError, ServiceResult, unexpected};
use crate::entities::conversations::Participant;
use crate::models::conversations::{
    ConversationDetail, ConversationResolution, ConversationSummary,
};
use crate::models::messages::Message;
use crate::models::users::UserInfo;
use crate::repositories::{conversations, messages, users};
use std::collections::HashMap;
use tracing::error;

/// Returns the single conversation for the unordered pair (requester, other),
/// creating it on first contact. `created` comes straight from the insert
/// path: when a concurrent request wins the race on the pair-key unique
/// index, the loser re-queries and reports the winner's row as found.
pub async fn resolve_or_create<C: Context>(
    ctx: &C,
    requester_id: i64,
    other_id: i64,
) -> ServiceResult<ConversationResolution> {
    if requester_id == other_id {
        return Err(AppError::ConversationsWithSelf);
    }
    let other_user = super::users::fetch_one(ctx, other_id).await?;

    let (conversation, created) = match conversations::fetch_by_pair(ctx, requester_id, other_id)
        .await
    {
        Ok(Some(conversation)) => (conversation, false),
        Ok(None) => match conversations::create(ctx, requester_id, other_id).await {
            Ok(conversation) => (conversation, true),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                match conversations::fetch_by_pair(ctx, requester_id, other_id).await {
                    Ok(Some(conversation)) => (conversation, false),
                    Ok(None) => {
                        return unexpected(anyhow::anyhow!(
                            "Lost the conversation creation race but the winning row is gone"
                        ));
                    }
                    Err(e) => return unexpected(e),
                }
            }
            Err(e) => return unexpected(e),
        },
        Err(e) => return unexpected(e),
    };

    let messages = match created {
        true => vec![],
        false => match messages::fetch_for_conversation(ctx, conversation.id).await {
            Ok(messages) => messages.into_iter().map(Message::from).collect(),
            Err(e) => return unexpected(e),
        },
    };
    Ok(ConversationResolution {
        detail: ConversationDetail {
            id: conversation.id,
            other_user,
            messages,
        },
        created,
    })
}

/// Projects the user's conversation list: other participant, last message and
/// unread count per conversation, most recently active first.
pub async fn fetch_all<C: Context>(
    ctx: &C,
    user_id: i64,
) -> ServiceResult<Vec<ConversationSummary>> {
    let rows = match conversations::fetch_all_for_user(ctx, user_id).await {
        Ok(rows) => rows,
        Err(e) => return unexpected(e),
    };
    let mut last_messages: HashMap<i64, Message> =
        match messages::fetch_last_per_conversation(ctx, user_id).await {
            Ok(messages) => messages
                .into_iter()
                .map(|m| (m.conversation_id, Message::from(m)))
                .collect(),
            Err(e) => return unexpected(e),
        };
    let unread_counts: HashMap<i64, i64> =
        match messages::unread_counts_by_conversation(ctx, user_id).await {
            Ok(counts) => counts.into_iter().collect(),
            Err(e) => return unexpected(e),
        };

    let mut summaries = Vec::with_capacity(rows.len());
    for row in rows {
        let other_user = match (row.peer_id, row.peer_name) {
            (Some(id), Some(name)) => UserInfo {
                id,
                name,
                avatar_url: row.peer_avatar_url,
                headline: row.peer_headline,
            },
            // same integrity fault the detail view reports; never drop the
            // conversation from the list silently
            _ => {
                error!(
                    conversation_id = row.id,
                    "Conversation peer is missing from the participant set or user directory"
                );
                return Err(AppError::ConversationsMissingCounterpart);
            }
        };
        summaries.push(ConversationSummary {
            id: row.id,
            last_message_at: row.last_message_at,
            other_user,
            last_message: last_messages.remove(&row.id),
            unread_count: unread_counts.get(&row.id).copied().unwrap_or(0),
        });
    }
    Ok(summaries)
}

/// Full view of one conversation; the requester must be a participant.
pub async fn fetch_one<C: Context>(
    ctx: &C,
    user_id: i64,
    conversation_id: i64,
) -> ServiceResult<ConversationDetail> {
    let peer_id = resolve_peer(ctx, conversation_id, user_id).await?;
    let other_user = match users::fetch_one(ctx, peer_id).await {
        Ok(user) => UserInfo::from(user),
        Err(sqlx::Error::RowNotFound) => {
            error!(conversation_id, peer_id, "Conversation peer is missing from the user directory");
            return Err(AppError::ConversationsMissingCounterpart);
        }
        Err(e) => return unexpected(e),
    };
    let messages = match messages::fetch_for_conversation(ctx, conversation_id).await {
        Ok(messages) => messages.into_iter().map(Message::from).collect(),
        Err(e) => return unexpected(e),
    };
    Ok(ConversationDetail {
        id: conversation_id,
        other_user,
        messages,
    })
}

/// Participant rows of an existing conversation, after checking the caller
/// belongs to it.
pub async fn fetch_participants_checked<C: Context>(
    ctx: &C,
    conversation_id: i64,
    user_id: i64,
) -> ServiceResult<Vec<Participant>> {
    match conversations::fetch_one(ctx, conversation_id).await {
        Ok(_) => {}
        Err(sqlx::Error::RowNotFound) => return Err(AppError::ConversationsNotFound),
        Err(e) => return unexpected(e),
    }
    let participants = match conversations::fetch_participants(ctx, conversation_id).await {
        Ok(participants) => participants,
        Err(e) => return unexpected(e),
    };
    if !participants.iter().any(|p| p.user_id == user_id) {
        return Err(AppError::ConversationsNotParticipant);
    }
    Ok(participants)
}

/// Resolves the other member of a two-party conversation. A conversation
/// without a second participant is a data-integrity fault.
pub async fn resolve_peer<C: Context>(
    ctx: &C,
    conversation_id: i64,
    user_id: i64,
) -> ServiceResult<i64> {
    let participants = fetch_participants_checked(ctx, conversation_id, user_id).await?;
    match participants.iter().find(|p| p.user_id != user_id) {
        Some(peer) => Ok(peer.user_id),
        None => {
            error!(conversation_id, "Conversation has no second participant");
            Err(AppError::ConversationsMissingCounterpart)
        }
    }
}
