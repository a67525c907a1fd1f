//! Socket Mode event loop.

use crate::config::SlackConfig;
use crate::error::{AppError, AppResult};
use crate::slack::api::{SlackApi, SlackError};
use crate::slack::events::{Ack, SocketEnvelope};
use crate::slack::handler::CommandHandler;
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

/// Reconnection settings.
#[derive(Debug, Clone)]
pub struct SocketOptions {
    pub reconnect_delay: Duration,
    pub max_reconnect_attempts: u32,
}

impl Default for SocketOptions {
    fn default() -> Self {
        Self {
            reconnect_delay: Duration::from_secs(2),
            max_reconnect_attempts: 10,
        }
    }
}

impl From<&SlackConfig> for SocketOptions {
    fn from(config: &SlackConfig) -> Self {
        Self {
            reconnect_delay: Duration::from_secs(config.reconnect_delay_secs),
            max_reconnect_attempts: config.max_reconnect_attempts,
        }
    }
}

/// Receives Slack events over Socket Mode and hands commands to the handler.
#[derive(Debug)]
pub struct SocketModeClient {
    api: SlackApi,
    options: SocketOptions,
}

impl SocketModeClient {
    pub fn new(api: SlackApi, options: SocketOptions) -> Self {
        Self { api, options }
    }

    /// Consume events until reconnection attempts are exhausted.
    ///
    /// A session that reached `hello` resets the attempt counter, so routine
    /// `refresh_requested` disconnects reconnect after a single delay.
    pub async fn run(&self, handler: Arc<CommandHandler>) -> AppResult<()> {
        let mut reconnect_attempts = 0;

        loop {
            let mut greeted = false;
            match self.session(&handler, &mut greeted).await {
                Ok(()) => info!("Socket Mode session ended"),
                Err(e) => error!(error = %e, "Socket Mode session failed"),
            }

            if greeted {
                reconnect_attempts = 0;
            }

            reconnect_attempts += 1;
            if !greeted && reconnect_attempts >= self.options.max_reconnect_attempts {
                error!(
                    attempts = reconnect_attempts,
                    "Max reconnection attempts reached, giving up"
                );
                return Err(AppError::ReconnectExhausted(reconnect_attempts));
            }

            let delay = self.options.reconnect_delay * reconnect_attempts;
            warn!(
                attempts = reconnect_attempts,
                delay_secs = delay.as_secs(),
                "Reconnecting to Slack"
            );
            tokio::time::sleep(delay).await;
        }
    }

    /// One WebSocket connection, from `apps.connections.open` to close.
    async fn session(
        &self,
        handler: &Arc<CommandHandler>,
        greeted: &mut bool,
    ) -> Result<(), SlackError> {
        let url = self.api.open_connection().await?;
        let (ws_stream, _response) = connect_async(url.as_str()).await?;
        info!("Connected to Slack Socket Mode");

        let (mut write, mut read) = ws_stream.split();

        while let Some(msg) = read.next().await {
            let text = match msg? {
                Message::Text(text) => text,
                Message::Close(frame) => {
                    info!(?frame, "Slack closed the connection");
                    break;
                }
                // Pings are answered by tungstenite
                _ => continue,
            };

            let envelope = match serde_json::from_str::<SocketEnvelope>(&text) {
                Ok(envelope) => envelope,
                Err(e) => {
                    warn!(error = %e, "Failed to parse Socket Mode frame");
                    continue;
                }
            };

            if let Some(envelope_id) = envelope.envelope_id() {
                let ack = serde_json::to_string(&Ack { envelope_id })?;
                write.send(Message::Text(ack)).await?;
            }

            match envelope {
                SocketEnvelope::Hello { num_connections } => {
                    *greeted = true;
                    info!(?num_connections, "Slack Socket Mode session ready");
                }
                SocketEnvelope::Disconnect { reason } => {
                    info!(?reason, "Slack requested disconnect");
                    break;
                }
                SocketEnvelope::SlashCommands { payload, .. } => {
                    info!(
                        command = %payload.command,
                        user_id = %payload.user_id,
                        channel_id = %payload.channel_id,
                        "Slash command received"
                    );
                    handler.dispatch(payload);
                }
                SocketEnvelope::Interactive { .. } => {
                    info!("Interactive event received");
                }
                SocketEnvelope::EventsApi { .. } => {
                    debug!("Ignored Events API envelope");
                }
                SocketEnvelope::Unsupported => {
                    debug!("Ignored unsupported envelope type");
                }
            }
        }

        Ok(())
    }
}
