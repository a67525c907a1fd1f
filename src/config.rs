use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use config::builder::DefaultState;
use serde::Deserialize;
use std::sync::OnceLock;
use std::time::Duration;

static CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// Canonical environment variables, applied after every other source.
const REQUIRED_ENV: [(&str, &str); 4] = [
    ("slack.app_token", "SLACK_APP_TOKEN"),
    ("slack.bot_token", "SLACK_BOT_TOKEN"),
    ("vault.addr", "VAULT_ADDR"),
    ("vault.token", "VAULT_TOKEN"),
];

/// Slack connection configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SlackConfig {
    /// App-level token (`xapp-...`) used to open Socket Mode connections
    #[serde(default)]
    pub app_token: String,
    /// Bot token (`xoxb-...`) used for Web API calls and responses
    #[serde(default)]
    pub bot_token: String,
    #[serde(default = "default_slack_api_base")]
    pub api_base: String,
    /// Slash command handled by the bot
    #[serde(default = "default_command")]
    pub command: String,
    #[serde(default = "default_reconnect_delay_secs")]
    pub reconnect_delay_secs: u64,
    #[serde(default = "default_max_reconnect_attempts")]
    pub max_reconnect_attempts: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_slack_api_base() -> String {
    "https://slack.com/api".to_string()
}

fn default_command() -> String {
    "/share".to_string()
}

fn default_reconnect_delay_secs() -> u64 {
    2
}

fn default_max_reconnect_attempts() -> u32 {
    10
}

fn default_timeout_secs() -> u64 {
    30
}

/// Vault configuration
#[derive(Debug, Deserialize, Clone)]
pub struct VaultConfig {
    /// Base address, e.g. `https://vault.example.com:8200`
    #[serde(default)]
    pub addr: String,
    /// Token used to write secrets and mint access tokens.
    /// Must be allowed to create orphan tokens.
    #[serde(default)]
    pub token: String,
    /// Enterprise namespace, sent as `X-Vault-Namespace`
    #[serde(default)]
    pub namespace: Option<String>,
    /// KV v2 data path shared secrets are written under
    #[serde(default = "default_secrets_path")]
    pub secrets_path: String,
    /// Policy attached to issued access tokens
    #[serde(default = "default_policy")]
    pub policy: String,
    #[serde(default = "default_display_name")]
    pub display_name: String,
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: u64,
    /// Use count of issued tokens. Each read of the secret spends one use,
    /// so the default of 2 allows a second retrieval.
    #[serde(default = "default_token_num_uses")]
    pub token_num_uses: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_secrets_path() -> String {
    "secrets/data/shared".to_string()
}

fn default_policy() -> String {
    "shared-secrets".to_string()
}

fn default_display_name() -> String {
    "Secret Share".to_string()
}

fn default_token_ttl_secs() -> u64 {
    3600
}

fn default_token_num_uses() -> u32 {
    crate::share::issuer::DEFAULT_TOKEN_NUM_USES
}

/// Root application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub slack: SlackConfig,
    #[serde(default)]
    pub vault: VaultConfig,
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            app_token: String::new(),
            bot_token: String::new(),
            api_base: default_slack_api_base(),
            command: default_command(),
            reconnect_delay_secs: default_reconnect_delay_secs(),
            max_reconnect_attempts: default_max_reconnect_attempts(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            addr: String::new(),
            token: String::new(),
            namespace: None,
            secrets_path: default_secrets_path(),
            policy: default_policy(),
            display_name: default_display_name(),
            token_ttl_secs: default_token_ttl_secs(),
            token_num_uses: default_token_num_uses(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let builder = Config::builder()
            // Start with default config file
            .add_source(File::with_name("config/default").required(false))
            // Override with local config if present
            .add_source(File::with_name("config/local").required(false))
            // Override with environment variables (prefix: SECRETSHARE_)
            // e.g., SECRETSHARE_VAULT__SECRETS_PATH, SECRETSHARE_SLACK__COMMAND
            .add_source(environment());

        Self::from_builder(with_canonical_env(builder)?)
    }

    /// Deserialize and validate a prepared builder.
    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Initialize the process-wide config
    pub fn init() -> Result<&'static Self, ConfigError> {
        let config = Self::load()?;
        Ok(CONFIG.get_or_init(|| config))
    }

    /// Reject configs missing any of the four required credentials.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let values = [
            &self.slack.app_token,
            &self.slack.bot_token,
            &self.vault.addr,
            &self.vault.token,
        ];
        if values.iter().any(|value| value.trim().is_empty()) {
            let names: Vec<&str> = REQUIRED_ENV.iter().map(|(_, env)| *env).collect();
            return Err(ConfigError::Message(format!(
                "Missing required environment variables: {}",
                names.join(", ")
            )));
        }
        if self.vault.token_num_uses == 0 {
            return Err(ConfigError::Message(
                "vault.token_num_uses must be at least 1".to_string(),
            ));
        }
        // Vault reads a zero ttl as "use the mount default"
        if self.vault.token_ttl_secs == 0 {
            return Err(ConfigError::Message(
                "vault.token_ttl_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// `SECRETSHARE_<SECTION>__<KEY>` overrides
fn environment() -> Environment {
    Environment::with_prefix("SECRETSHARE")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

fn with_canonical_env(
    mut builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    for (key, env) in REQUIRED_ENV {
        let value = std::env::var(env).ok().filter(|v| !v.is_empty());
        builder = builder.set_override_option(key, value)?;
    }
    Ok(builder)
}

impl SlackConfig {
    /// Web API method URL, e.g. `apps.connections.open`
    pub fn method_url(&self, method: &str) -> String {
        let base = self.api_base.trim_end_matches('/');
        let method = method.trim_start_matches('/');
        format!("{}/{}", base, method)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl VaultConfig {
    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
