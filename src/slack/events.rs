//! Socket Mode envelopes.
//!
//! Every frame Slack pushes over the socket is one of these. Envelopes that
//! carry an `envelope_id` must be acknowledged within a few seconds or Slack
//! retries them.

use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SocketEnvelope {
    /// Sent once per connection when the session is ready
    Hello {
        #[serde(default)]
        num_connections: Option<u32>,
    },
    /// Slack is about to close the connection (`refresh_requested`, `warning`, ...)
    Disconnect {
        #[serde(default)]
        reason: Option<String>,
    },
    SlashCommands {
        envelope_id: String,
        payload: SlashCommand,
    },
    Interactive {
        envelope_id: String,
        #[serde(default)]
        payload: serde_json::Value,
    },
    EventsApi {
        envelope_id: String,
        #[serde(default)]
        payload: serde_json::Value,
    },
    #[serde(other)]
    Unsupported,
}

impl SocketEnvelope {
    pub fn envelope_id(&self) -> Option<&str> {
        match self {
            Self::SlashCommands { envelope_id, .. }
            | Self::Interactive { envelope_id, .. }
            | Self::EventsApi { envelope_id, .. } => Some(envelope_id),
            Self::Hello { .. } | Self::Disconnect { .. } | Self::Unsupported => None,
        }
    }
}

/// Slash command invocation. `text` may hold a secret and is zeroized on drop.
#[derive(Deserialize)]
pub struct SlashCommand {
    pub command: String,
    #[serde(default)]
    pub text: String,
    pub response_url: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub channel_id: String,
    #[serde(default)]
    pub team_id: String,
}

impl Drop for SlashCommand {
    fn drop(&mut self) {
        self.text.zeroize();
    }
}

impl std::fmt::Debug for SlashCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlashCommand")
            .field("command", &self.command)
            .field("user_id", &self.user_id)
            .field("channel_id", &self.channel_id)
            .field("team_id", &self.team_id)
            .finish_non_exhaustive()
    }
}

/// Acknowledgement frame for an envelope
#[derive(Debug, Serialize)]
pub struct Ack<'a> {
    pub envelope_id: &'a str,
}
