use crate::share::error::ShareError;
use crate::share::id::SecretIdGenerator;
use crate::share::issuer::CredentialIssuer;
use crate::share::store::SecretStore;
use crate::share::types::RetrievalDescriptor;
use std::sync::Arc;
use tracing::{error, info};

/// Runs the share protocol: validate, generate, persist, authorize, compose.
///
/// Holds no per-request state, so one instance serves concurrent requests.
pub struct ShareService {
    ids: SecretIdGenerator,
    store: Arc<dyn SecretStore>,
    issuer: Arc<dyn CredentialIssuer>,
    /// `<vault addr>/v1/<secrets path>`
    retrieval_base: String,
}

impl std::fmt::Debug for ShareService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShareService")
            .field("retrieval_base", &self.retrieval_base)
            .finish_non_exhaustive()
    }
}

impl ShareService {
    pub fn new(
        store: Arc<dyn SecretStore>,
        issuer: Arc<dyn CredentialIssuer>,
        vault_addr: &str,
        secrets_path: &str,
    ) -> Self {
        Self::with_generator(store, issuer, vault_addr, secrets_path, SecretIdGenerator::new())
    }

    pub fn with_generator(
        store: Arc<dyn SecretStore>,
        issuer: Arc<dyn CredentialIssuer>,
        vault_addr: &str,
        secrets_path: &str,
        ids: SecretIdGenerator,
    ) -> Self {
        let retrieval_base = format!(
            "{}/v1/{}",
            vault_addr.trim_end_matches('/'),
            secrets_path.trim_matches('/')
        );
        Self {
            ids,
            store,
            issuer,
            retrieval_base,
        }
    }

    /// Share `raw` once. No step is retried; the first failure ends the request.
    pub async fn share(&self, raw: &str) -> Result<RetrievalDescriptor, ShareError> {
        if raw.trim().is_empty() {
            return Err(ShareError::EmptyInput);
        }

        let id = self.ids.generate();

        self.store.store(&id, raw).await.map_err(|e| {
            error!(secret_id = %id, error = %e, "Failed to store secret in Vault");
            e
        })?;

        // TODO: delete the secret written above when issuing fails. Until then
        // it stays in Vault with no token able to read it.
        let credential = self.issuer.issue(&id).await.map_err(|e| {
            error!(
                secret_id = %id,
                error = %e,
                "Failed to create short-lived token; stored secret is orphaned"
            );
            e
        })?;

        let retrieval_url = format!("{}/{}?token={}", self.retrieval_base, id, credential.token);
        info!(
            secret_id = %id,
            expires_at = %credential.expires_at(),
            "Secret shared"
        );

        Ok(RetrievalDescriptor {
            identifier: id,
            token: credential.token,
            retrieval_url,
            ttl: credential.ttl,
        })
    }
}
