use crate::share::error::StoreError;
use crate::share::types::SecretIdentifier;
use crate::vault::{KvWriteRequest, VaultClient};
use async_trait::async_trait;
use tracing::debug;

/// Write side of the secret store.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Persist `plaintext` under `id`. One write, no retry, no existence check.
    async fn store(&self, id: &SecretIdentifier, plaintext: &str) -> Result<(), StoreError>;
}

/// Writes shared secrets to a Vault KV v2 mount.
#[derive(Debug, Clone)]
pub struct VaultKvStore {
    client: VaultClient,
    secrets_path: String,
}

impl VaultKvStore {
    /// `secrets_path` is the KV v2 data path, e.g. `secrets/data/shared`.
    pub fn new(client: VaultClient, secrets_path: &str) -> Self {
        Self {
            client,
            secrets_path: secrets_path.trim_matches('/').to_string(),
        }
    }

    pub fn secret_path(&self, id: &SecretIdentifier) -> String {
        format!("{}/{}", self.secrets_path, id)
    }
}

#[async_trait]
impl SecretStore for VaultKvStore {
    async fn store(&self, id: &SecretIdentifier, plaintext: &str) -> Result<(), StoreError> {
        let path = self.secret_path(id);
        self.client
            .write(&path, &KvWriteRequest::shared_secret(plaintext))
            .await
            .map_err(|source| StoreError {
                secret_id: id.to_string(),
                source,
            })?;
        debug!(secret_id = %id, "Secret written to Vault");
        Ok(())
    }
}
