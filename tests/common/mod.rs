//! Recording test doubles for the share protocol collaborators.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use secretshare::share::{
    AccessCredential, CredentialIssuer, IssuerError, SecretIdentifier, SecretStore, StoreError,
};
use secretshare::slack::{NotifyError, Notifier, SlackError};
use secretshare::vault::VaultError;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One collaborator call, in the order it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Store { id: String, plaintext: String },
    Issue { id: String },
}

/// Shared call log for a store/issuer pair.
#[derive(Debug, Default)]
pub struct CallLog {
    calls: Mutex<Vec<Call>>,
}

impl CallLog {
    pub fn push(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn store_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Store { .. }))
            .count()
    }

    pub fn issue_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Issue { .. }))
            .count()
    }
}

pub struct FakeStore {
    log: Arc<CallLog>,
    fail: bool,
    /// id -> plaintext of every accepted write
    pub written: Mutex<HashMap<String, String>>,
}

impl FakeStore {
    pub fn new(log: Arc<CallLog>) -> Self {
        Self {
            log,
            fail: false,
            written: Mutex::new(HashMap::new()),
        }
    }

    pub fn failing(log: Arc<CallLog>) -> Self {
        Self {
            fail: true,
            ..Self::new(log)
        }
    }

    pub fn secret_for(&self, id: &str) -> Option<String> {
        self.written.lock().unwrap().get(id).cloned()
    }
}

#[async_trait]
impl SecretStore for FakeStore {
    async fn store(&self, id: &SecretIdentifier, plaintext: &str) -> Result<(), StoreError> {
        self.log.push(Call::Store {
            id: id.to_string(),
            plaintext: plaintext.to_string(),
        });
        // Let concurrent shares interleave
        tokio::task::yield_now().await;
        if self.fail {
            return Err(StoreError {
                secret_id: id.to_string(),
                source: VaultError::Status {
                    status: 503,
                    errors: vec!["Vault is sealed".to_string()],
                },
            });
        }
        self.written
            .lock()
            .unwrap()
            .insert(id.to_string(), plaintext.to_string());
        Ok(())
    }
}

pub struct FakeIssuer {
    log: Arc<CallLog>,
    fail: bool,
    minted: AtomicUsize,
    /// token -> bound secret id
    pub bindings: Mutex<HashMap<String, String>>,
}

impl FakeIssuer {
    pub fn new(log: Arc<CallLog>) -> Self {
        Self {
            log,
            fail: false,
            minted: AtomicUsize::new(0),
            bindings: Mutex::new(HashMap::new()),
        }
    }

    pub fn failing(log: Arc<CallLog>) -> Self {
        Self {
            fail: true,
            ..Self::new(log)
        }
    }

    pub fn bound_id(&self, token: &str) -> Option<String> {
        self.bindings.lock().unwrap().get(token).cloned()
    }
}

#[async_trait]
impl CredentialIssuer for FakeIssuer {
    async fn issue(&self, id: &SecretIdentifier) -> Result<AccessCredential, IssuerError> {
        self.log.push(Call::Issue { id: id.to_string() });
        tokio::task::yield_now().await;
        if self.fail {
            return Err(IssuerError {
                secret_id: id.to_string(),
                source: VaultError::Status {
                    status: 400,
                    errors: vec!["policy \"shared-secrets\" does not exist".to_string()],
                },
            });
        }
        let n = self.minted.fetch_add(1, Ordering::SeqCst) + 1;
        let token = format!("tok-{}", n);
        self.bindings
            .lock()
            .unwrap()
            .insert(token.clone(), id.to_string());
        Ok(AccessCredential {
            token,
            accessor: format!("acc-{}", n),
            ttl: Duration::from_secs(3600),
            max_uses: 2,
            bound_identifier: id.clone(),
            renewable: false,
            issued_at: Utc::now(),
        })
    }
}

/// Records every notification instead of sending it.
#[derive(Default)]
pub struct FakeNotifier {
    pub sent: Mutex<Vec<(String, String)>>,
    pub fail: bool,
}

impl FakeNotifier {
    pub fn messages(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for FakeNotifier {
    async fn notify(&self, destination: &str, message: &str) -> Result<(), NotifyError> {
        self.sent
            .lock()
            .unwrap()
            .push((destination.to_string(), message.to_string()));
        if self.fail {
            return Err(NotifyError(SlackError::Rejected {
                status: 404,
                body: "expired_url".to_string(),
            }));
        }
        Ok(())
    }
}

pub const VAULT_ADDR: &str = "http://127.0.0.1:8200";
pub const SECRETS_PATH: &str = "secrets/data/shared";
