//! One-time secret sharing.
//!
//! ```text
//! raw text ──► ShareService ──► SecretIdGenerator   (secret-<nanos>)
//!                   │
//!                   ├─────────► SecretStore         (KV v2 write)
//!                   │
//!                   ├─────────► CredentialIssuer    (orphan token, ttl, num_uses)
//!                   ▼
//!          RetrievalDescriptor  (<addr>/v1/<path>/<id>?token=<token>)
//! ```
//!
//! The store write always happens before the token is minted, and both use
//! the same identifier. Vault enforces expiry and the use count.

pub mod error;
pub mod id;
pub mod issuer;
pub mod service;
pub mod store;
pub mod types;

pub use error::{IssuerError, ShareError, StoreError};
pub use id::{SecretIdGenerator, SECRET_ID_PREFIX};
pub use issuer::{CredentialIssuer, TokenPolicy, VaultTokenIssuer, DEFAULT_TOKEN_NUM_USES};
pub use service::ShareService;
pub use store::{SecretStore, VaultKvStore};
pub use types::{
    describe_ttl, AccessCredential, RetrievalDescriptor, SecretIdentifier, SecretShareRequest,
};
