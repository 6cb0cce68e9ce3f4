use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use xp_leaderboard::config::{ProxyConfig, load_dotenv};
use xp_leaderboard::proxy::{ProxyState, router};

#[tokio::main]
async fn main() -> Result<()> {
    load_dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ProxyConfig::from_env()?;
    tracing::info!(?config, "starting leaderboard proxy");
    if config.inject_api_key.is_none() {
        tracing::warn!("PROXY_API_KEY unset; forwarding whatever key the client sends");
    }

    let state = ProxyState::new(&config)?;
    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("bind {}", config.bind))?;
    tracing::info!(addr = %config.bind, upstream = %config.upstream_base, "listening");
    axum::serve(listener, router(state))
        .await
        .context("proxy server failed")?;
    Ok(())
}
