use crate::share::{
    describe_ttl, RetrievalDescriptor, SecretShareRequest, ShareError, ShareService,
};
use crate::slack::events::SlashCommand;
use crate::slack::notifier::Notifier;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Handles the share slash command.
pub struct CommandHandler {
    command: String,
    share: Arc<ShareService>,
    notifier: Arc<dyn Notifier>,
}

impl std::fmt::Debug for CommandHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandHandler")
            .field("command", &self.command)
            .finish_non_exhaustive()
    }
}

impl CommandHandler {
    pub fn new(command: &str, share: Arc<ShareService>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            command: command.to_string(),
            share,
            notifier,
        }
    }

    /// Run the command on its own task so a slow Vault never stalls the
    /// event loop. Returns `None` for commands this bot does not handle.
    pub fn dispatch(self: &Arc<Self>, cmd: SlashCommand) -> Option<JoinHandle<()>> {
        if cmd.command != self.command {
            warn!(command = %cmd.command, "Unsupported command");
            return None;
        }
        let handler = Arc::clone(self);
        Some(tokio::spawn(async move { handler.handle_share(cmd).await }))
    }

    /// Share the command text and answer the requester exactly once.
    pub async fn handle_share(&self, mut cmd: SlashCommand) {
        let request = SecretShareRequest {
            secret: std::mem::take(&mut cmd.text),
            destination: std::mem::take(&mut cmd.response_url),
            requester: Some(cmd.user_id.clone()).filter(|u| !u.is_empty()),
        };

        let message = match self.share.share(&request.secret).await {
            Ok(descriptor) => success_message(&descriptor),
            Err(ShareError::EmptyInput) => {
                info!(requester = ?request.requester, "Share command without a secret");
                ShareError::EmptyInput.user_message(&self.command)
            }
            // Already logged with detail by the share service
            Err(e) => e.user_message(&self.command),
        };

        if let Err(e) = self.notifier.notify(&request.destination, &message).await {
            error!(requester = ?request.requester, error = %e, "Failed to send response to Slack");
        }
    }
}

/// Reply text for a successful share.
pub fn success_message(descriptor: &RetrievalDescriptor) -> String {
    format!(
        "Your secret has been securely shared and is valid for {}:\n\n```{}```",
        describe_ttl(descriptor.ttl),
        descriptor.curl_command()
    )
}
