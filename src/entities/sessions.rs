use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity record stored in redis, keyed by the bearer token. Login and
/// registration live in the identity service; messaging only resolves tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub session_id: Uuid,
    pub user_id: i64,
    pub name: String,
    pub updated_at: DateTime<Utc>,
}
