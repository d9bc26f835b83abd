use crate::common::context::Context;
use crate::common::error::{AppError, ServiceResult, unexpected};
use crate::entities::sessions::Session;
use crate::repositories::sessions;
use uuid::Uuid;

/// Resolves a bearer token to a session and bumps its activity timestamp.
pub async fn authenticate<C: Context>(ctx: &C, token: Uuid) -> ServiceResult<Session> {
    let session = match sessions::fetch_one(ctx, token).await {
        Ok(Some(session)) => session,
        Ok(None) => return Err(AppError::Unauthorized),
        Err(e) => return unexpected(e),
    };
    match sessions::extend(ctx, session).await {
        Ok(session) => Ok(session),
        Err(e) => unexpected(e),
    }
}
