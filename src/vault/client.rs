use crate::config::VaultConfig;
use crate::vault::types::{
    ErrorResponse, PolicyListResponse, TokenAuth, TokenCreateRequest, TokenCreateResponse,
};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Serialize;
use tracing::{debug, error};

/// Vault client errors.
#[derive(Debug, thiserror::Error)]
pub enum VaultError {
    #[error("Vault request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Vault returned {status}: {}", .errors.join("; "))]
    Status { status: u16, errors: Vec<String> },

    #[error("Unexpected Vault response: {0}")]
    InvalidResponse(String),
}

/// Shared HTTP handle to Vault.
///
/// Cheap to clone; clones share the underlying connection pool, so one
/// instance serves every in-flight share request.
#[derive(Clone)]
pub struct VaultClient {
    http: Client,
    addr: String,
    token: String,
    namespace: Option<String>,
}

impl std::fmt::Debug for VaultClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultClient")
            .field("addr", &self.addr)
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

impl VaultClient {
    /// Create a new Vault client from config
    pub fn new(config: &VaultConfig) -> Result<Self, VaultError> {
        let http = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self {
            http,
            addr: config.addr.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            namespace: config.namespace.clone().filter(|ns| !ns.is_empty()),
        })
    }

    /// Base address without a trailing slash
    pub fn address(&self) -> &str {
        &self.addr
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/v1/{}", self.addr, path.trim_start_matches('/'));
        let mut builder = self
            .http
            .request(method, url)
            .header("X-Vault-Token", &self.token);
        if let Some(namespace) = &self.namespace {
            builder = builder.header("X-Vault-Namespace", namespace);
        }
        builder
    }

    /// Logical write of `body` to `path` (relative to `/v1/`).
    pub async fn write<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<(), VaultError> {
        debug!(path, "Writing to Vault");
        let response = self.request(Method::POST, path).json(body).send().await?;
        check_status(response).await?;
        Ok(())
    }

    /// Mint a token through `auth/token/create`.
    pub async fn create_token(
        &self,
        request: &TokenCreateRequest,
    ) -> Result<TokenAuth, VaultError> {
        let response = self
            .request(Method::POST, "auth/token/create")
            .json(request)
            .send()
            .await?;
        let response = check_status(response).await?;

        let parsed: TokenCreateResponse = response.json().await.map_err(|e| {
            error!("Failed to parse token response: {}", e);
            VaultError::InvalidResponse(e.to_string())
        })?;
        parsed
            .auth
            .ok_or_else(|| VaultError::InvalidResponse("token response has no auth block".into()))
    }

    /// Names of the ACL policies defined on the server.
    pub async fn list_policies(&self) -> Result<Vec<String>, VaultError> {
        let response = self.request(Method::GET, "sys/policy").send().await?;
        let response = check_status(response).await?;

        let parsed: PolicyListResponse = response
            .json()
            .await
            .map_err(|e| VaultError::InvalidResponse(e.to_string()))?;
        Ok(parsed.into_names())
    }
}

async fn check_status(response: Response) -> Result<Response, VaultError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let errors = serde_json::from_str::<ErrorResponse>(&body)
        .map(|parsed| parsed.errors)
        .unwrap_or_else(|_| if body.is_empty() { Vec::new() } else { vec![body] });
    Err(VaultError::Status {
        status: status.as_u16(),
        errors,
    })
}
