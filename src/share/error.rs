use crate::vault::VaultError;
use thiserror::Error;

/// The secret write was rejected or never reached the store.
#[derive(Debug, Error)]
#[error("failed to store secret {secret_id}: {source}")]
pub struct StoreError {
    pub secret_id: String,
    #[source]
    pub source: VaultError,
}

/// The credential authority did not hand back a token.
#[derive(Debug, Error)]
#[error("failed to create access token for {secret_id}: {source}")]
pub struct IssuerError {
    pub secret_id: String,
    #[source]
    pub source: VaultError,
}

/// Outcome of a failed share.
#[derive(Debug, Error)]
pub enum ShareError {
    #[error("secret text is empty")]
    EmptyInput,

    #[error(transparent)]
    StoreFailed(#[from] StoreError),

    /// The secret was written but no token exists for it.
    #[error(transparent)]
    IssuerFailed(#[from] IssuerError),
}

impl ShareError {
    /// Text shown to the requester. Internal detail stays in the logs.
    pub fn user_message(&self, command: &str) -> String {
        match self {
            Self::EmptyInput => format!(
                "Please provide a secret to share. Usage: `{} <secret>`",
                command
            ),
            Self::StoreFailed(_) => "Failed to store the secret. Please try again.".to_string(),
            Self::IssuerFailed(_) => {
                "Failed to create a secure access token. Please try again.".to_string()
            }
        }
    }
}
