use crate::config::VaultConfig;
use crate::share::error::IssuerError;
use crate::share::types::{AccessCredential, SecretIdentifier};
use crate::vault::types::vault_duration;
use crate::vault::{TokenCreateRequest, VaultClient};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{info, warn};

/// Token use count for a one-time secret.
///
/// Each read of the secret spends one use, so the default of 2 permits a
/// second retrieval ("1 to create, 2 to get"). Set `vault.token_num_uses = 1`
/// for strictly single retrieval.
pub const DEFAULT_TOKEN_NUM_USES: u32 = 2;

pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(3600);

/// Metadata key binding a token to its secret
pub const SECRET_ID_METADATA_KEY: &str = "secret_id";

/// Mints access credentials for stored secrets.
#[async_trait]
pub trait CredentialIssuer: Send + Sync {
    async fn issue(&self, id: &SecretIdentifier) -> Result<AccessCredential, IssuerError>;
}

/// Fixed parameters of every issued token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPolicy {
    pub policy: String,
    pub display_name: String,
    pub ttl: Duration,
    pub num_uses: u32,
}

impl Default for TokenPolicy {
    fn default() -> Self {
        Self {
            policy: "shared-secrets".to_string(),
            display_name: "Secret Share".to_string(),
            ttl: DEFAULT_TOKEN_TTL,
            num_uses: DEFAULT_TOKEN_NUM_USES,
        }
    }
}

impl TokenPolicy {
    pub fn from_config(config: &VaultConfig) -> Self {
        Self {
            policy: config.policy.clone(),
            display_name: config.display_name.clone(),
            ttl: config.token_ttl(),
            num_uses: config.token_num_uses,
        }
    }

    /// Orphan, non-renewable token capped at `ttl`, tagged with the secret id.
    pub fn request_for(&self, id: &SecretIdentifier) -> TokenCreateRequest {
        let ttl = vault_duration(self.ttl);
        let mut metadata = BTreeMap::new();
        metadata.insert(SECRET_ID_METADATA_KEY.to_string(), id.to_string());

        TokenCreateRequest {
            display_name: self.display_name.clone(),
            policies: vec![self.policy.clone()],
            metadata,
            explicit_max_ttl: ttl.clone(),
            ttl,
            num_uses: self.num_uses,
            renewable: false,
            no_parent: true,
        }
    }
}

/// Issues tokens through Vault's token auth method.
#[derive(Debug, Clone)]
pub struct VaultTokenIssuer {
    client: VaultClient,
    policy: TokenPolicy,
}

impl VaultTokenIssuer {
    pub fn new(client: VaultClient, policy: TokenPolicy) -> Self {
        Self { client, policy }
    }
}

#[async_trait]
impl CredentialIssuer for VaultTokenIssuer {
    async fn issue(&self, id: &SecretIdentifier) -> Result<AccessCredential, IssuerError> {
        let request = self.policy.request_for(id);
        let auth = self
            .client
            .create_token(&request)
            .await
            .map_err(|source| IssuerError {
                secret_id: id.to_string(),
                source,
            })?;

        if auth.renewable {
            warn!(
                secret_id = %id,
                accessor = %auth.accessor,
                "Vault issued a renewable token despite renewable=false"
            );
        }
        info!(
            secret_id = %id,
            accessor = %auth.accessor,
            lease_secs = auth.lease_duration,
            num_uses = self.policy.num_uses,
            "Issued access token"
        );

        Ok(AccessCredential {
            token: auth.client_token,
            accessor: auth.accessor,
            ttl: self.policy.ttl,
            max_uses: self.policy.num_uses,
            bound_identifier: id.clone(),
            renewable: false,
            issued_at: Utc::now(),
        })
    }
}
