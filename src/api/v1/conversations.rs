use crate::api::{AuthSession, RequestContext};
use crate::common::error::{ServiceResponse, ServiceResult};
use crate::models::conversations::{
    ConversationDetail, ConversationSummary, ResolveConversationArgs,
};
use crate::models::messages::{Message, SendMessageArgs, UnreadCountResponse};
use crate::usecases::{conversations, messages};
use axum::Json;
use axum::extract::Path;
use axum::http::StatusCode;

pub async fn list(
    ctx: RequestContext,
    AuthSession(session): AuthSession,
) -> ServiceResponse<Vec<ConversationSummary>> {
    let summaries = conversations::fetch_all(&ctx, session.user_id).await?;
    Ok(Json(summaries))
}

/// 201 when the conversation was created by this request, 200 when the
/// existing one was returned.
pub async fn resolve(
    ctx: RequestContext,
    AuthSession(session): AuthSession,
    Json(args): Json<ResolveConversationArgs>,
) -> ServiceResult<(StatusCode, Json<ConversationDetail>)> {
    let resolution = conversations::resolve_or_create(&ctx, session.user_id, args.user_id).await?;
    let status = match resolution.created {
        true => StatusCode::CREATED,
        false => StatusCode::OK,
    };
    Ok((status, Json(resolution.detail)))
}

pub async fn detail(
    ctx: RequestContext,
    AuthSession(session): AuthSession,
    Path(conversation_id): Path<i64>,
) -> ServiceResponse<ConversationDetail> {
    let detail = conversations::fetch_one(&ctx, session.user_id, conversation_id).await?;
    Ok(Json(detail))
}

pub async fn send_message(
    ctx: RequestContext,
    AuthSession(session): AuthSession,
    Path(conversation_id): Path<i64>,
    Json(args): Json<SendMessageArgs>,
) -> ServiceResult<(StatusCode, Json<Message>)> {
    let message = messages::send(&ctx, &session, conversation_id, &args.content).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

pub async fn mark_read(
    ctx: RequestContext,
    AuthSession(session): AuthSession,
    Path(conversation_id): Path<i64>,
) -> ServiceResult<StatusCode> {
    messages::mark_read(&ctx, &session, conversation_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn unread_count(
    ctx: RequestContext,
    AuthSession(session): AuthSession,
) -> ServiceResponse<UnreadCountResponse> {
    let count = messages::unread_count(&ctx, session.user_id).await?;
    Ok(Json(UnreadCountResponse { count }))
}
