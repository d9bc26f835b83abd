use crate::common::redis_pool::PoolResult;
use async_trait::async_trait;
use sqlx::{MySql, Pool};

/// Access to the shared stores. Repositories are generic over this so they can
/// run against the request-scoped context or a bare [`crate::common::state::AppState`].
#[async_trait]
pub trait Context: Sync + Send {
    fn db(&self) -> &Pool<MySql>;
    async fn redis(&self) -> PoolResult;
}
