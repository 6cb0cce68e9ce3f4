use std::env;
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};

pub const DEFAULT_PROXY_BASE: &str = "http://127.0.0.1:3000";
pub const DEFAULT_ACTION_ID: &str = "c312d1072c8249b389b2c31e9cb6dc04";
pub const DEFAULT_PRODUCT: &str = "Bandit";
pub const DEFAULT_SHARE_URL: &str = "https://app.bandit.network";
pub const DEFAULT_PROXY_BIND: &str = "127.0.0.1:3000";
pub const DEFAULT_UPSTREAM: &str = "https://app.bandit.network/apps/leaderboard";

/// Loads `.env.local` then `.env` into the process environment. Missing files are fine.
pub fn load_dotenv() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
}

/// Client-side settings, resolved once at start-up and handed to the controller and worker.
#[derive(Clone)]
pub struct LeaderboardConfig {
    pub proxy_base: String,
    pub action_id: String,
    pub api_key: Option<String>,
    pub product_name: String,
    pub share_url: String,
    pub request_timeout: Option<Duration>,
    pub demo: bool,
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self {
            proxy_base: DEFAULT_PROXY_BASE.to_string(),
            action_id: DEFAULT_ACTION_ID.to_string(),
            api_key: None,
            product_name: DEFAULT_PRODUCT.to_string(),
            share_url: DEFAULT_SHARE_URL.to_string(),
            request_timeout: None,
            demo: false,
        }
    }
}

impl LeaderboardConfig {
    pub fn from_env() -> Self {
        let request_timeout = env_non_empty("LEADERBOARD_TIMEOUT_SECS")
            .and_then(|val| val.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);
        let demo = env_non_empty("LEADERBOARD_DEMO")
            .map(|val| matches!(val.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Self {
            proxy_base: env_or("LEADERBOARD_PROXY_BASE", DEFAULT_PROXY_BASE),
            action_id: env_or("LEADERBOARD_ACTION_ID", DEFAULT_ACTION_ID),
            api_key: env_non_empty("LEADERBOARD_API_KEY"),
            product_name: env_or("LEADERBOARD_PRODUCT", DEFAULT_PRODUCT),
            share_url: env_or("LEADERBOARD_SHARE_URL", DEFAULT_SHARE_URL),
            request_timeout,
            demo,
        }
    }

    /// `{proxy_base}/api/leaderboard`, tolerant of a trailing slash on the base.
    pub fn leaderboard_url(&self) -> String {
        format!("{}/api/leaderboard", self.proxy_base.trim_end_matches('/'))
    }
}

impl fmt::Debug for LeaderboardConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LeaderboardConfig")
            .field("proxy_base", &self.proxy_base)
            .field("action_id", &self.action_id)
            .field("api_key", &redacted(self.api_key.as_deref()))
            .field("product_name", &self.product_name)
            .field("share_url", &self.share_url)
            .field("request_timeout", &self.request_timeout)
            .field("demo", &self.demo)
            .finish()
    }
}

#[derive(Clone)]
pub struct ProxyConfig {
    pub bind: SocketAddr,
    pub upstream_base: String,
    pub inject_api_key: Option<String>,
}

impl ProxyConfig {
    pub fn from_env() -> Result<Self> {
        let bind_raw = env_or("PROXY_BIND", DEFAULT_PROXY_BIND);
        let bind = bind_raw
            .parse::<SocketAddr>()
            .with_context(|| format!("invalid PROXY_BIND {bind_raw:?}"))?;
        Ok(Self {
            bind,
            upstream_base: env_or("PROXY_UPSTREAM", DEFAULT_UPSTREAM),
            inject_api_key: env_non_empty("PROXY_API_KEY"),
        })
    }
}

impl fmt::Debug for ProxyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyConfig")
            .field("bind", &self.bind)
            .field("upstream_base", &self.upstream_base)
            .field("inject_api_key", &redacted(self.inject_api_key.as_deref()))
            .finish()
    }
}

fn redacted(value: Option<&str>) -> &'static str {
    match value {
        Some(_) => "<redacted>",
        None => "<unset>",
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    env_non_empty(key).unwrap_or_else(|| default.to_string())
}
