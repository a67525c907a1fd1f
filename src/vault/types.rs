//! Wire shapes of the Vault HTTP API endpoints this service calls.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// KV v2 write body. The outer `data` wrapper is required by the
/// versioned engine; readers find the payload under `data.data`.
#[derive(Debug, Serialize)]
pub struct KvWriteRequest<'a> {
    pub data: SharedSecretData<'a>,
}

#[derive(Debug, Serialize)]
pub struct SharedSecretData<'a> {
    pub secret: &'a str,
}

impl<'a> KvWriteRequest<'a> {
    pub fn shared_secret(secret: &'a str) -> Self {
        Self {
            data: SharedSecretData { secret },
        }
    }
}

/// Body of `POST /v1/auth/token/create`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenCreateRequest {
    pub display_name: String,
    pub policies: Vec<String>,
    pub metadata: BTreeMap<String, String>,
    pub ttl: String,
    pub explicit_max_ttl: String,
    pub num_uses: u32,
    pub renewable: bool,
    pub no_parent: bool,
}

#[derive(Debug, Deserialize)]
pub struct TokenCreateResponse {
    #[serde(default)]
    pub auth: Option<TokenAuth>,
}

/// `auth` block of a token-create response
#[derive(Debug, Clone, Deserialize)]
pub struct TokenAuth {
    pub client_token: String,
    #[serde(default)]
    pub accessor: String,
    /// Seconds
    #[serde(default)]
    pub lease_duration: u64,
    #[serde(default)]
    pub renewable: bool,
}

/// Error body returned with non-2xx statuses
#[derive(Debug, Default, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub errors: Vec<String>,
}

/// `GET /v1/sys/policy`. Newer servers also fill `data.keys`.
#[derive(Debug, Deserialize)]
pub struct PolicyListResponse {
    #[serde(default)]
    pub policies: Vec<String>,
    #[serde(default)]
    pub data: Option<PolicyListData>,
}

#[derive(Debug, Deserialize)]
pub struct PolicyListData {
    #[serde(default)]
    pub keys: Vec<String>,
}

impl PolicyListResponse {
    pub fn into_names(self) -> Vec<String> {
        if !self.policies.is_empty() {
            return self.policies;
        }
        self.data.map(|d| d.keys).unwrap_or_default()
    }
}

/// Format a duration the way Vault parses TTL strings (`1h`, `30m`, `45s`).
pub fn vault_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs > 0 && secs % 3600 == 0 {
        format!("{}h", secs / 3600)
    } else if secs > 0 && secs % 60 == 0 {
        format!("{}m", secs / 60)
    } else {
        format!("{}s", secs)
    }
}
