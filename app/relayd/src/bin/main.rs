//! Relay daemon entry point.
//!
//! Loads TOML configuration, builds the provider failover manager, runs an
//! initial health check, starts the status server, and polls Telegram until
//! ctrl-c.

use anyhow::Result;
use failover::FailoverManager;
use relayd::{AppState, RelayConfig, bot, config::DEFAULT_CONFIG_PATH, status};
use telegram::TelegramClient;
use tokio::signal;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing from RUST_LOG (default: info).
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Load configuration.
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = RelayConfig::load(std::path::Path::new(&config_path))?;
    config.validate()?;
    tracing::info!("loaded configuration from {config_path}");

    // Build the failover manager.
    let manager = FailoverManager::from_config(&config.backends);
    tracing::info!("{} chat backend(s) configured", manager.len());

    // Initial probe; rotate away from an unhealthy primary right away.
    if manager.health_check(None).await {
        if let Some(provider) = manager.current_provider() {
            tracing::info!("primary backend {} is healthy", provider.name);
        }
    } else if manager.len() > 1 {
        tracing::warn!("primary backend unhealthy at startup, rotating");
        manager.rotate();
    }

    let state = AppState::new(manager);

    // Start the status server.
    let handle = status::serve(state.clone(), &config.bind_address()).await?;

    // Poll Telegram until ctrl-c.
    let tg = TelegramClient::new(config.telegram.bot_token.clone());
    let allowed = config.telegram.allowed_ids.clone();
    tracing::info!("starting Telegram polling");

    tokio::select! {
        result = bot::run_polling(state, tg, allowed) => result?,
        _ = shutdown_signal() => {}
    }

    handle.shutdown().await?;
    tracing::info!("relayd stopped");
    Ok(())
}

/// Wait for ctrl-c signal for graceful shutdown.
async fn shutdown_signal() {
    signal::ctrl_c()
        .await
        .expect("failed to install ctrl-c handler");
    tracing::info!("received shutdown signal");
}
