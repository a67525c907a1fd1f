//! Slack front end.
//!
//! ```text
//!  Slack ──(Socket Mode WS)──► SocketModeClient ──ack──► Slack
//!                                   │
//!                                   ▼ slash_commands
//!                             CommandHandler  (one task per command)
//!                                   │
//!                                   ├──► ShareService
//!                                   ▼
//!                          EphemeralResponder ──(response_url)──► requester
//! ```

pub mod api;
pub mod events;
pub mod handler;
pub mod notifier;
pub mod socket;

pub use api::{AuthIdentity, ResponseMessage, SlackApi, SlackError};
pub use events::{SlashCommand, SocketEnvelope};
pub use handler::{success_message, CommandHandler};
pub use notifier::{EphemeralResponder, NotifyError, Notifier};
pub use socket::{SocketModeClient, SocketOptions};
