pub mod conversations;

use crate::common::state::AppState;
use axum::Router;
use axum::routing::{get, post};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/conversations",
            get(conversations::list).post(conversations::resolve),
        )
        .route(
            "/conversations/unread-count",
            get(conversations::unread_count),
        )
        .route("/conversations/{conversation_id}", get(conversations::detail))
        .route(
            "/conversations/{conversation_id}/messages",
            post(conversations::send_message),
        )
        .route(
            "/conversations/{conversation_id}/read",
            post(conversations::mark_read),
        )
}
