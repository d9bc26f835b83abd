use crate::models::conversations::{
    ConversationDetail, ConversationSummary, ResolveConversationArgs,
};
use crate::models::messages::{Message, SendMessageArgs, UnreadCountResponse};
use uuid::Uuid;

/// Typed client for the messaging routes, used by the polling synchronizer
/// and by frontends driving the service over HTTP.
pub struct MessagingApi {
    http: reqwest::Client,
    base_url: String,
    token: Uuid,
}

impl MessagingApi {
    pub fn new(base_url: impl Into<String>, token: Uuid) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            token,
        }
    }

    fn make_url(&self, endpoint: &str) -> String {
        format!("{}/api/v1{endpoint}", self.base_url)
    }

    pub async fn list_conversations(&self) -> anyhow::Result<Vec<ConversationSummary>> {
        let url = self.make_url("/conversations");
        let response = self
            .http
            .get(url)
            .bearer_auth(self.token)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    pub async fn resolve_conversation(&self, user_id: i64) -> anyhow::Result<ConversationDetail> {
        let url = self.make_url("/conversations");
        let response = self
            .http
            .post(url)
            .bearer_auth(self.token)
            .json(&ResolveConversationArgs { user_id })
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    pub async fn fetch_detail(&self, conversation_id: i64) -> anyhow::Result<ConversationDetail> {
        let url = self.make_url(&format!("/conversations/{conversation_id}"));
        let response = self
            .http
            .get(url)
            .bearer_auth(self.token)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    pub async fn send_message(
        &self,
        conversation_id: i64,
        content: &str,
    ) -> anyhow::Result<Message> {
        let url = self.make_url(&format!("/conversations/{conversation_id}/messages"));
        let response = self
            .http
            .post(url)
            .bearer_auth(self.token)
            .json(&SendMessageArgs {
                content: content.to_string(),
            })
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    pub async fn mark_read(&self, conversation_id: i64) -> anyhow::Result<()> {
        let url = self.make_url(&format!("/conversations/{conversation_id}/read"));
        self.http
            .post(url)
            .bearer_auth(self.token)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    pub async fn unread_count(&self) -> anyhow::Result<i64> {
        let url = self.make_url("/conversations/unread-count");
        let response = self
            .http
            .get(url)
            .bearer_auth(self.token)
            .send()
            .await?
            .error_for_status()?;
        let body: UnreadCountResponse = response.json().await?;
        Ok(body.count)
    }
}
