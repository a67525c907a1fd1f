use crate::config::SlackConfig;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

/// Slack client errors.
#[derive(Debug, thiserror::Error)]
pub enum SlackError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Slack API error: {0}")]
    Api(String),

    #[error("Slack returned {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct ConnectionsOpenResponse {
    ok: bool,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Identity reported by `auth.test`
#[derive(Debug, Clone, Deserialize)]
pub struct AuthIdentity {
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub team: String,
}

#[derive(Debug, Deserialize)]
struct AuthTestResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(flatten)]
    identity: AuthIdentity,
}

/// Body posted to a slash command's `response_url`
#[derive(Debug, Serialize)]
pub struct ResponseMessage<'a> {
    pub response_type: &'static str,
    pub text: &'a str,
    pub replace_original: bool,
}

impl<'a> ResponseMessage<'a> {
    /// Visible only to the user who ran the command
    pub fn ephemeral(text: &'a str) -> Self {
        Self {
            response_type: "ephemeral",
            text,
            replace_original: false,
        }
    }
}

/// Slack Web API client
#[derive(Clone)]
pub struct SlackApi {
    http: Client,
    config: SlackConfig,
}

impl std::fmt::Debug for SlackApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackApi")
            .field("api_base", &self.config.api_base)
            .finish_non_exhaustive()
    }
}

impl SlackApi {
    pub fn new(config: &SlackConfig) -> Result<Self, SlackError> {
        let http = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            http,
            config: config.clone(),
        })
    }

    /// Request a fresh Socket Mode WebSocket URL (app-level token).
    pub async fn open_connection(&self) -> Result<String, SlackError> {
        let response: ConnectionsOpenResponse = self
            .http
            .post(self.config.method_url("apps.connections.open"))
            .bearer_auth(&self.config.app_token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if !response.ok {
            return Err(SlackError::Api(
                response.error.unwrap_or_else(|| "unknown_error".to_string()),
            ));
        }
        response
            .url
            .ok_or_else(|| SlackError::Api("apps.connections.open returned no url".to_string()))
    }

    /// Verify the bot token and return who it belongs to.
    pub async fn auth_test(&self) -> Result<AuthIdentity, SlackError> {
        let response: AuthTestResponse = self
            .http
            .post(self.config.method_url("auth.test"))
            .bearer_auth(&self.config.bot_token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if !response.ok {
            return Err(SlackError::Api(
                response.error.unwrap_or_else(|| "unknown_error".to_string()),
            ));
        }
        Ok(response.identity)
    }

    /// Post a message to a slash command response URL.
    pub async fn post_response(
        &self,
        response_url: &str,
        message: &ResponseMessage<'_>,
    ) -> Result<(), SlackError> {
        let response = self
            .http
            .post(response_url)
            .bearer_auth(&self.config.bot_token)
            .json(message)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Response URL rejected message with status {}: {}", status, body);
            return Err(SlackError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        debug!("Response delivered");
        Ok(())
    }
}
