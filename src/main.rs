use secretshare::{
    config::AppConfig,
    error::AppResult,
    share::{ShareService, TokenPolicy, VaultKvStore, VaultTokenIssuer},
    slack::{CommandHandler, EphemeralResponder, SlackApi, SocketModeClient, SocketOptions},
    vault::VaultClient,
};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Pick up a local .env before reading configuration
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "secretshare=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting secretshare v{}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::init().map_err(|e| {
        error!("{}", e);
        e
    })?;
    info!("Configuration loaded");

    tokio::select! {
        result = run(config) => {
            if let Err(e) = result {
                error!("Service stopped: {}", e);
                return Err(e.into());
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    Ok(())
}

/// Build the clients and serve Slack commands until the socket loop gives up.
async fn run(config: &'static AppConfig) -> AppResult<()> {
    let vault = VaultClient::new(&config.vault)?;
    info!(addr = %vault.address(), "Vault client initialized");

    // The share flow still works without a listable policy set; only warn
    match vault.list_policies().await {
        Ok(policies) if policies.iter().any(|p| p == &config.vault.policy) => {
            info!(policy = %config.vault.policy, "Access token policy present");
        }
        Ok(policies) => {
            warn!(
                policy = %config.vault.policy,
                ?policies,
                "Access token policy not found in Vault; issued tokens will not be able to read secrets"
            );
        }
        Err(e) => {
            warn!("Could not list Vault policies: {}", e);
        }
    }

    let store = Arc::new(VaultKvStore::new(vault.clone(), &config.vault.secrets_path));
    let issuer = Arc::new(VaultTokenIssuer::new(
        vault.clone(),
        TokenPolicy::from_config(&config.vault),
    ));
    let share = Arc::new(ShareService::new(
        store,
        issuer,
        vault.address(),
        &config.vault.secrets_path,
    ));

    let slack = SlackApi::new(&config.slack)?;
    match slack.auth_test().await {
        Ok(identity) => info!(
            "Bot token valid: logged in as {} ({}) in {}",
            identity.user, identity.user_id, identity.team
        ),
        Err(e) => warn!("Bot token check failed: {}. Responses may not be delivered.", e),
    }

    let notifier = Arc::new(EphemeralResponder::new(slack.clone()));
    let handler = Arc::new(CommandHandler::new(&config.slack.command, share, notifier));
    let socket = SocketModeClient::new(slack, SocketOptions::from(&config.slack));

    info!(command = %config.slack.command, "Slack bot and Vault integration is running...");

    socket.run(handler).await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(?err, "failed to install ctrl-c handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!(?err, "failed to install sigterm handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
