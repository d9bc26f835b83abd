use crate::client::api::MessagingApi;
use crate::models::conversations::ConversationDetail;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::warn;

/// Fetch seam for the synchronizer, so the poll loop can be driven without a
/// live server.
#[async_trait]
pub trait DetailSource: Send + Sync + 'static {
    async fn fetch_detail(&self, conversation_id: i64) -> anyhow::Result<ConversationDetail>;
}

#[async_trait]
impl DetailSource for MessagingApi {
    async fn fetch_detail(&self, conversation_id: i64) -> anyhow::Result<ConversationDetail> {
        MessagingApi::fetch_detail(self, conversation_id).await
    }
}

#[derive(Debug)]
pub struct SyncUpdate {
    pub conversation_id: i64,
    pub detail: ConversationDetail,
}

#[derive(Default)]
struct Selection {
    conversation_id: Option<i64>,
    /// Bumped on every select/close. A poll response tagged with an older
    /// generation is stale and must be discarded, not merged.
    generation: u64,
    known_messages: usize,
}

/// Periodic re-fetch of the currently open conversation, approximating live
/// delivery without a push channel. The local view is replaced only when the
/// message count differs from the last known count.
pub struct Synchronizer {
    selection: Arc<Mutex<Selection>>,
    updates: mpsc::UnboundedReceiver<SyncUpdate>,
    task: JoinHandle<()>,
}

impl Synchronizer {
    pub fn spawn<S: DetailSource>(source: S, poll_interval: Duration) -> Self {
        let selection = Arc::new(Mutex::new(Selection::default()));
        let (updates_tx, updates_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(poll_loop(
            source,
            Arc::clone(&selection),
            poll_interval,
            updates_tx,
        ));
        Self {
            selection,
            updates: updates_rx,
            task,
        }
    }

    /// Opens a conversation. `known_messages` is the message count the caller
    /// already displays; polls deliver an update only when it changes.
    pub fn select(&self, conversation_id: i64, known_messages: usize) {
        let mut selection = self.selection.lock().unwrap();
        selection.generation += 1;
        selection.conversation_id = Some(conversation_id);
        selection.known_messages = known_messages;
    }

    /// Closes the open conversation; in-flight polls for it are discarded.
    pub fn close(&self) {
        let mut selection = self.selection.lock().unwrap();
        selection.generation += 1;
        selection.conversation_id = None;
        selection.known_messages = 0;
    }

    pub async fn next_update(&mut self) -> Option<SyncUpdate> {
        self.updates.recv().await
    }
}

impl Drop for Synchronizer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn poll_loop<S: DetailSource>(
    source: S,
    selection: Arc<Mutex<Selection>>,
    poll_interval: Duration,
    updates: mpsc::UnboundedSender<SyncUpdate>,
) {
    let mut ticker = tokio::time::interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        ticker.tick().await;
        let (conversation_id, generation) = {
            let selection = selection.lock().unwrap();
            match selection.conversation_id {
                Some(conversation_id) => (conversation_id, selection.generation),
                None => continue,
            }
        };
        let detail = match source.fetch_detail(conversation_id).await {
            Ok(detail) => detail,
            Err(e) => {
                warn!(conversation_id, "Poll failed: {e}");
                continue;
            }
        };
        let mut selection = selection.lock().unwrap();
        if selection.generation != generation {
            // selection changed while the fetch was in flight
            continue;
        }
        if detail.messages.len() == selection.known_messages {
            continue;
        }
        selection.known_messages = detail.messages.len();
        if updates
            .send(SyncUpdate {
                conversation_id,
                detail,
            })
            .is_err()
        {
            return;
        }
    }
}
