//! Store-backed tests for the conversation directory, message store and
//! summarizer. They run against the MySQL named by `DATABASE_URL` and are
//! skipped when it is not set.

use async_trait::async_trait;
use chrono::Utc;
use deadpool::managed::PoolError;
use messaging_service::common::context::Context;
use messaging_service::common::error::AppError;
use messaging_service::common::redis_pool::PoolResult;
use messaging_service::entities::sessions::Session;
use messaging_service::repositories::conversations as conversations_repo;
use messaging_service::repositories::messages as messages_repo;
use messaging_service::usecases::{conversations, messages};
use sqlx::mysql::MySqlPoolOptions;
use sqlx::{MySql, Pool};
use std::sync::Once;
use uuid::Uuid;

struct TestContext {
    db: Pool<MySql>,
}

#[async_trait]
impl Context for TestContext {
    fn db(&self) -> &Pool<MySql> {
        &self.db
    }

    async fn redis(&self) -> PoolResult {
        Err(PoolError::Closed)
    }
}

/// Settings the send path reads for the notification deep link. Only applied
/// when the environment does not provide them already.
fn ensure_settings() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let defaults = [
            ("LOG_LEVEL", "info"),
            ("APP_HOST", "127.0.0.1"),
            ("APP_PORT", "0"),
            ("DB_MAX_CONNECTIONS", "5"),
            ("DB_WAIT_TIMEOUT_SECS", "5"),
            ("REDIS_URL", "redis://127.0.0.1"),
            ("REDIS_MAX_CONNECTIONS", "1"),
            ("REDIS_CONNECTION_TIMEOUT_SECS", "1"),
            ("REDIS_RESPONSE_TIMEOUT_SECS", "1"),
            ("REDIS_WAIT_TIMEOUT_SECS", "1"),
            ("FRONTEND_BASE_URL", "http://localhost:3000"),
        ];
        for (key, value) in defaults {
            if std::env::var(key).is_err() {
                std::env::set_var(key, value);
            }
        }
    });
}

async fn test_context() -> Option<TestContext> {
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("skipping: DATABASE_URL not set");
            return None;
        }
    };
    ensure_settings();
    let db = MySqlPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .expect("failed to connect to DATABASE_URL");
    for statement in include_str!("../schema.sql").split(';') {
        let statement = statement.trim();
        if !statement.is_empty() {
            sqlx::raw_sql(statement).execute(&db).await.unwrap();
        }
    }
    Some(TestContext { db })
}

async fn create_user(ctx: &TestContext, name: &str) -> i64 {
    let result = sqlx::query("INSERT INTO users (name) VALUES (?)")
        .bind(name)
        .execute(ctx.db())
        .await
        .unwrap();
    result.last_insert_id() as i64
}

fn session_for(user_id: i64, name: &str) -> Session {
    Session {
        session_id: Uuid::new_v4(),
        user_id,
        name: name.to_string(),
        updated_at: Utc::now(),
    }
}

#[tokio::test]
async fn resolve_is_idempotent_across_argument_order() {
    let Some(ctx) = test_context().await else { return };
    let alice = create_user(&ctx, "Alice").await;
    let bob = create_user(&ctx, "Bob").await;

    let first = conversations::resolve_or_create(&ctx, alice, bob)
        .await
        .unwrap();
    assert!(first.created);
    assert!(first.detail.messages.is_empty());

    let second = conversations::resolve_or_create(&ctx, bob, alice)
        .await
        .unwrap();
    assert!(!second.created, "existing empty conversation is not new");
    assert_eq!(second.detail.id, first.detail.id);

    let participants = conversations_repo::fetch_participants(&ctx, first.detail.id)
        .await
        .unwrap();
    assert_eq!(participants.len(), 2);
    let mut ids: Vec<i64> = participants.iter().map(|p| p.user_id).collect();
    ids.sort();
    assert_eq!(ids, {
        let mut expected = vec![alice, bob];
        expected.sort();
        expected
    });
}

#[tokio::test]
async fn concurrent_resolution_yields_one_conversation() {
    let Some(ctx) = test_context().await else { return };
    let alice = create_user(&ctx, "Alice").await;
    let bob = create_user(&ctx, "Bob").await;

    let (left, right) = tokio::join!(
        conversations::resolve_or_create(&ctx, alice, bob),
        conversations::resolve_or_create(&ctx, bob, alice),
    );
    let left = left.unwrap();
    let right = right.unwrap();
    assert_eq!(left.detail.id, right.detail.id);
}

#[tokio::test]
async fn duplicate_pair_insert_hits_the_unique_index() {
    let Some(ctx) = test_context().await else { return };
    let alice = create_user(&ctx, "Alice").await;
    let bob = create_user(&ctx, "Bob").await;

    conversations_repo::create(&ctx, alice, bob).await.unwrap();
    // the recovery branch of resolve_or_create depends on this failure mode
    let err = conversations_repo::create(&ctx, bob, alice)
        .await
        .unwrap_err();
    match err {
        sqlx::Error::Database(e) => assert!(e.is_unique_violation()),
        other => panic!("expected a unique violation, got {other:?}"),
    }

    let resolved = conversations::resolve_or_create(&ctx, alice, bob)
        .await
        .unwrap();
    assert!(!resolved.created);
}

#[tokio::test]
async fn resolve_validates_its_inputs() {
    let Some(ctx) = test_context().await else { return };
    let alice = create_user(&ctx, "Alice").await;

    assert_eq!(
        conversations::resolve_or_create(&ctx, alice, alice)
            .await
            .unwrap_err(),
        AppError::ConversationsWithSelf
    );
    assert_eq!(
        conversations::resolve_or_create(&ctx, alice, i64::MAX)
            .await
            .unwrap_err(),
        AppError::UsersNotFound
    );
}

#[tokio::test]
async fn send_bumps_only_the_parent_conversation() {
    let Some(ctx) = test_context().await else { return };
    let alice = create_user(&ctx, "Alice").await;
    let bob = create_user(&ctx, "Bob").await;
    let carol = create_user(&ctx, "Carol").await;

    let ab = conversations::resolve_or_create(&ctx, alice, bob)
        .await
        .unwrap()
        .detail
        .id;
    let ac = conversations::resolve_or_create(&ctx, alice, carol)
        .await
        .unwrap()
        .detail
        .id;
    let ac_before = conversations_repo::fetch_one(&ctx, ac).await.unwrap();

    messages::send(&ctx, &session_for(alice, "Alice"), ab, "hi")
        .await
        .unwrap();

    let ab_after = conversations_repo::fetch_one(&ctx, ab).await.unwrap();
    let stored = messages_repo::fetch_for_conversation(&ctx, ab).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(ab_after.last_message_at, stored[0].created_at);

    let ac_after = conversations_repo::fetch_one(&ctx, ac).await.unwrap();
    assert_eq!(ac_after.last_message_at, ac_before.last_message_at);
}

#[tokio::test]
async fn unread_counts_follow_the_exchange() {
    let Some(ctx) = test_context().await else { return };
    let alice = create_user(&ctx, "Alice").await;
    let bob = create_user(&ctx, "Bob").await;

    let conversation_id = conversations::resolve_or_create(&ctx, alice, bob)
        .await
        .unwrap()
        .detail
        .id;

    messages::send(&ctx, &session_for(alice, "Alice"), conversation_id, "hi")
        .await
        .unwrap();
    assert_eq!(messages::unread_count(&ctx, bob).await.unwrap(), 1);
    // the sender's own message never counts against them
    assert_eq!(messages::unread_count(&ctx, alice).await.unwrap(), 0);

    let bob_session = session_for(bob, "Bob");
    messages::mark_read(&ctx, &bob_session, conversation_id)
        .await
        .unwrap();
    assert_eq!(messages::unread_count(&ctx, bob).await.unwrap(), 0);

    messages::send(&ctx, &bob_session, conversation_id, "hello")
        .await
        .unwrap();
    assert_eq!(messages::unread_count(&ctx, alice).await.unwrap(), 1);
    assert_eq!(messages::unread_count(&ctx, bob).await.unwrap(), 0);

    let detail = conversations::fetch_one(&ctx, alice, conversation_id)
        .await
        .unwrap();
    let contents: Vec<&str> = detail.messages.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, ["hi", "hello"]);

    let summaries = conversations::fetch_all(&ctx, alice).await.unwrap();
    let summary = summaries
        .iter()
        .find(|s| s.id == conversation_id)
        .expect("conversation missing from the list");
    assert_eq!(summary.unread_count, 1);
    assert_eq!(summary.other_user.id, bob);
    assert_eq!(
        summary.last_message.as_ref().map(|m| m.content.as_str()),
        Some("hello")
    );
}

#[tokio::test]
async fn mark_read_leaves_other_conversations_alone() {
    let Some(ctx) = test_context().await else { return };
    let alice = create_user(&ctx, "Alice").await;
    let bob = create_user(&ctx, "Bob").await;
    let carol = create_user(&ctx, "Carol").await;

    let ab = conversations::resolve_or_create(&ctx, alice, bob)
        .await
        .unwrap()
        .detail
        .id;
    let ac = conversations::resolve_or_create(&ctx, alice, carol)
        .await
        .unwrap()
        .detail
        .id;
    messages::send(&ctx, &session_for(bob, "Bob"), ab, "one")
        .await
        .unwrap();
    messages::send(&ctx, &session_for(bob, "Bob"), ab, "two")
        .await
        .unwrap();
    messages::send(&ctx, &session_for(carol, "Carol"), ac, "three")
        .await
        .unwrap();
    assert_eq!(messages::unread_count(&ctx, alice).await.unwrap(), 3);

    let alice_session = session_for(alice, "Alice");
    messages::mark_read(&ctx, &alice_session, ab).await.unwrap();
    assert_eq!(messages::unread_count(&ctx, alice).await.unwrap(), 1);
    assert_eq!(messages::unread_count(&ctx, bob).await.unwrap(), 0);
    assert_eq!(messages::unread_count(&ctx, carol).await.unwrap(), 0);

    let participants = conversations_repo::fetch_participants(&ctx, ab).await.unwrap();
    let alice_row = participants.iter().find(|p| p.user_id == alice).unwrap();
    assert!(alice_row.last_read_at.is_some());
}

#[tokio::test]
async fn history_order_survives_a_backwards_clock_step() {
    let Some(ctx) = test_context().await else { return };
    let alice = create_user(&ctx, "Alice").await;
    let bob = create_user(&ctx, "Bob").await;

    let conversation_id = conversations::resolve_or_create(&ctx, alice, bob)
        .await
        .unwrap()
        .detail
        .id;
    let first = messages::send(&ctx, &session_for(alice, "Alice"), conversation_id, "first")
        .await
        .unwrap();
    let second = messages::send(&ctx, &session_for(alice, "Alice"), conversation_id, "second")
        .await
        .unwrap();

    // simulate the second send landing with an earlier wall-clock timestamp
    sqlx::query("UPDATE messages SET created_at = created_at - INTERVAL 10 SECOND WHERE id = ?")
        .bind(second.id)
        .execute(ctx.db())
        .await
        .unwrap();

    let stored = messages_repo::fetch_for_conversation(&ctx, conversation_id)
        .await
        .unwrap();
    let ids: Vec<i64> = stored.iter().map(|m| m.id).collect();
    assert_eq!(ids, [first.id, second.id]);
    let contents: Vec<&str> = stored.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, ["first", "second"]);
}

#[tokio::test]
async fn outsiders_and_bad_content_are_rejected() {
    let Some(ctx) = test_context().await else { return };
    let alice = create_user(&ctx, "Alice").await;
    let bob = create_user(&ctx, "Bob").await;
    let mallory = create_user(&ctx, "Mallory").await;

    let conversation_id = conversations::resolve_or_create(&ctx, alice, bob)
        .await
        .unwrap()
        .detail
        .id;

    assert_eq!(
        conversations::fetch_one(&ctx, mallory, conversation_id)
            .await
            .unwrap_err(),
        AppError::ConversationsNotParticipant
    );
    assert_eq!(
        messages::send(&ctx, &session_for(mallory, "Mallory"), conversation_id, "hi")
            .await
            .unwrap_err(),
        AppError::ConversationsNotParticipant
    );
    assert_eq!(
        conversations::fetch_one(&ctx, alice, i64::MAX)
            .await
            .unwrap_err(),
        AppError::ConversationsNotFound
    );

    assert_eq!(
        messages::send(&ctx, &session_for(alice, "Alice"), conversation_id, "   \n")
            .await
            .unwrap_err(),
        AppError::MessagesEmptyContent
    );
    let stored = messages_repo::fetch_for_conversation(&ctx, conversation_id)
        .await
        .unwrap();
    assert!(stored.is_empty(), "rejected sends must not leave rows behind");
}

#[tokio::test]
async fn missing_peer_directory_entry_is_an_integrity_fault() {
    let Some(ctx) = test_context().await else { return };
    let alice = create_user(&ctx, "Alice").await;
    // participant row exists, user directory entry does not
    let ghost = i64::MAX - alice;
    let conversation = conversations_repo::create(&ctx, alice, ghost).await.unwrap();

    assert_eq!(
        conversations::fetch_all(&ctx, alice).await.unwrap_err(),
        AppError::ConversationsMissingCounterpart
    );
    assert_eq!(
        conversations::fetch_one(&ctx, alice, conversation.id)
            .await
            .unwrap_err(),
        AppError::ConversationsMissingCounterpart
    );
}
