use crate::common::context::Context;
use crate::common::redis_json::Json;
use crate::entities::sessions::Session;
use redis::AsyncCommands;
use uuid::Uuid;

const SESSIONS_KEY: &str = "messaging:sessions";

pub async fn fetch_one<C: Context>(ctx: &C, session_id: Uuid) -> anyhow::Result<Option<Session>> {
    let mut redis = ctx.redis().await?;
    let session: Option<Json<Session>> = redis.hget(SESSIONS_KEY, session_id).await?;
    Ok(session.map(Json::into_inner))
}

pub async fn extend<C: Context>(ctx: &C, mut session: Session) -> anyhow::Result<Session> {
    session.updated_at = chrono::Utc::now();
    let mut redis = ctx.redis().await?;
    let _: () = redis
        .hset(SESSIONS_KEY, session.session_id, Json(&session))
        .await?;
    Ok(session)
}
