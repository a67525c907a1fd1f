use chrono::{DateTime, Utc};
use std::fmt;
use std::time::Duration;
use zeroize::Zeroize;

/// Name of one shared secret: the last segment of its store path and the
/// `secret_id` metadata of its access token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SecretIdentifier(String);

impl SecretIdentifier {
    pub(crate) fn new(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SecretIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SecretIdentifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// One `/share` invocation. Lives only as long as the handler task.
pub struct SecretShareRequest {
    /// Raw secret text as typed by the requester
    pub secret: String,
    /// Where the outcome is delivered (a Slack response URL)
    pub destination: String,
    /// Requesting user, for logs only
    pub requester: Option<String>,
}

impl Drop for SecretShareRequest {
    fn drop(&mut self) {
        self.secret.zeroize();
    }
}

impl fmt::Debug for SecretShareRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretShareRequest")
            .field("secret", &"<redacted>")
            .field("requester", &self.requester)
            .finish_non_exhaustive()
    }
}

/// Scoped, expiring, use-limited token bound to one secret.
///
/// Expiry and use counting are enforced by Vault; nothing here mutates it.
#[derive(Clone)]
pub struct AccessCredential {
    pub token: String,
    /// Token accessor, safe to log
    pub accessor: String,
    pub ttl: Duration,
    pub max_uses: u32,
    pub bound_identifier: SecretIdentifier,
    pub renewable: bool,
    pub issued_at: DateTime<Utc>,
}

impl AccessCredential {
    pub fn expires_at(&self) -> DateTime<Utc> {
        let ttl = chrono::Duration::from_std(self.ttl).unwrap_or(chrono::Duration::zero());
        self.issued_at + ttl
    }
}

impl fmt::Debug for AccessCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessCredential")
            .field("accessor", &self.accessor)
            .field("ttl", &self.ttl)
            .field("max_uses", &self.max_uses)
            .field("bound_identifier", &self.bound_identifier)
            .field("renewable", &self.renewable)
            .field("issued_at", &self.issued_at)
            .finish_non_exhaustive()
    }
}

/// Everything the requester needs to fetch the secret once.
#[derive(Clone)]
pub struct RetrievalDescriptor {
    pub identifier: SecretIdentifier,
    pub token: String,
    pub retrieval_url: String,
    pub ttl: Duration,
}

impl RetrievalDescriptor {
    /// Ready-to-run command that reads the secret.
    pub fn curl_command(&self) -> String {
        format!(
            "curl --header \"X-Vault-Token: {}\" --request GET {}",
            self.token, self.retrieval_url
        )
    }
}

impl fmt::Debug for RetrievalDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetrievalDescriptor")
            .field("identifier", &self.identifier)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

/// Human wording of a validity window: "1 hour", "2 hours", "30 minutes".
pub fn describe_ttl(ttl: Duration) -> String {
    let secs = ttl.as_secs();
    let (amount, unit) = if secs >= 3600 && secs % 3600 == 0 {
        (secs / 3600, "hour")
    } else if secs >= 60 && secs % 60 == 0 {
        (secs / 60, "minute")
    } else {
        (secs, "second")
    };
    if amount == 1 {
        format!("1 {}", unit)
    } else {
        format!("{} {}s", amount, unit)
    }
}
