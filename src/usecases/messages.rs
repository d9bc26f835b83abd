use crate::common::context::Context;
use crate::common::error::{AppError, ServiceResult, unexpected};
use crate::common::website;
use crate::entities::notifications::{NOTIFICATION_TYPE_MESSAGE, NewNotification};
use crate::entities::sessions::Session;
use crate::models::messages::Message;
use crate::repositories::{conversations, messages, notifications};
use crate::usecases::conversations as conversations_uc;
use tracing::error;

pub const MAX_MESSAGE_LENGTH: usize = 2000;
const NOTIFICATION_PREVIEW_LENGTH: usize = 100;

pub fn validate_content(content: &str) -> ServiceResult<&str> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(AppError::MessagesEmptyContent);
    }
    if trimmed.chars().count() > MAX_MESSAGE_LENGTH {
        return Err(AppError::MessagesTooLong);
    }
    Ok(trimmed)
}

fn notification_preview(content: &str) -> String {
    content.chars().take(NOTIFICATION_PREVIEW_LENGTH).collect()
}

/// Appends a message to the conversation, addressed to the other participant.
/// The append and the `last_message_at` bump are one unit of work; the
/// notification row is written after the message is durable, so a failure
/// there never unsends the message.
pub async fn send<C: Context>(
    ctx: &C,
    session: &Session,
    conversation_id: i64,
    content: &str,
) -> ServiceResult<Message> {
    let content = validate_content(content)?;
    let receiver_id =
        conversations_uc::resolve_peer(ctx, conversation_id, session.user_id).await?;

    let message = match messages::create(
        ctx,
        conversation_id,
        session.user_id,
        receiver_id,
        content,
    )
    .await
    {
        Ok(message) => message,
        Err(e) => return unexpected(e),
    };

    let notification = NewNotification {
        user_id: receiver_id,
        notification_type: NOTIFICATION_TYPE_MESSAGE,
        title: format!("New message from {}", session.name),
        body: notification_preview(content),
        link: website::get_conversation_link(conversation_id),
    };
    if let Err(e) = notifications::create(ctx, notification).await {
        error!(conversation_id, "Failed to create message notification: {e}");
    }
    Ok(Message::from(message))
}

/// Clears the caller's unread flags in one conversation and stamps their
/// participant row. Unread counts would only ever grow without this.
pub async fn mark_read<C: Context>(
    ctx: &C,
    session: &Session,
    conversation_id: i64,
) -> ServiceResult<()> {
    conversations_uc::fetch_participants_checked(ctx, conversation_id, session.user_id).await?;
    if let Err(e) = messages::mark_read(ctx, conversation_id, session.user_id).await {
        return unexpected(e);
    }
    match conversations::mark_participant_read(ctx, conversation_id, session.user_id).await {
        Ok(()) => Ok(()),
        Err(e) => unexpected(e),
    }
}

/// Global unread badge count for the user.
pub async fn unread_count<C: Context>(ctx: &C, user_id: i64) -> ServiceResult<i64> {
    match messages::unread_count_total(ctx, user_id).await {
        Ok(count) => Ok(count),
        Err(e) => unexpected(e),
    }
}
