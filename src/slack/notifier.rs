use crate::slack::api::{ResponseMessage, SlackApi, SlackError};
use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
#[error("failed to deliver response: {0}")]
pub struct NotifyError(#[from] pub SlackError);

/// Delivers the outcome of a share back to the requester.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, destination: &str, message: &str) -> Result<(), NotifyError>;
}

/// Posts ephemeral replies to slash command response URLs.
#[derive(Debug, Clone)]
pub struct EphemeralResponder {
    api: SlackApi,
}

impl EphemeralResponder {
    pub fn new(api: SlackApi) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Notifier for EphemeralResponder {
    async fn notify(&self, destination: &str, message: &str) -> Result<(), NotifyError> {
        self.api
            .post_response(destination, &ResponseMessage::ephemeral(message))
            .await?;
        Ok(())
    }
}
