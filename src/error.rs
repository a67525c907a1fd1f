use thiserror::Error;

use crate::slack::SlackError;
use crate::vault::VaultError;

/// Application-wide error types
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Vault error: {0}")]
    Vault(#[from] VaultError),

    #[error("Slack error: {0}")]
    Slack(#[from] SlackError),

    #[error("Socket Mode gave up after {0} reconnection attempts")]
    ReconnectExhausted(u32),
}

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;
