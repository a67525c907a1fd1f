pub mod client;
pub mod types;

pub use client::{VaultClient, VaultError};
pub use types::{KvWriteRequest, TokenAuth, TokenCreateRequest};
