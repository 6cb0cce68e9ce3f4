use reqwest::Url;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Deserialize;

use crate::config::LeaderboardConfig;
use crate::error::FetchError;
use crate::http_client::http_client;
use crate::state::{LeaderboardEntry, LeaderboardSnapshot};

pub const API_KEY_HEADER: &str = "X-API-KEY";
pub const ACTION_ID_PARAM: &str = "action-id";

#[derive(Debug, Deserialize)]
struct LeaderboardResponse {
    leaderboard: Vec<LeaderboardEntry>,
    #[serde(rename = "totalUser")]
    total_user: u64,
    #[serde(rename = "totalXp")]
    total_xp: u64,
}

/// `GET {proxy}/api/leaderboard?action-id=..&offset=..&limit=..`
pub fn page_url(config: &LeaderboardConfig, offset: u64, limit: u32) -> Result<Url, FetchError> {
    let offset = offset.to_string();
    let limit = limit.to_string();
    Url::parse_with_params(
        &config.leaderboard_url(),
        &[
            (ACTION_ID_PARAM, config.action_id.as_str()),
            ("offset", offset.as_str()),
            ("limit", limit.as_str()),
        ],
    )
    .map_err(|err| FetchError::Network(format!("invalid proxy url {:?}: {err}", config.proxy_base)))
}

pub fn fetch_page(
    config: &LeaderboardConfig,
    offset: u64,
    limit: u32,
) -> Result<LeaderboardSnapshot, FetchError> {
    let client =
        http_client(config.request_timeout).map_err(|err| FetchError::Network(format!("{err:#}")))?;
    let url = page_url(config, offset, limit)?;

    let mut req = client
        .get(url)
        .header(ACCEPT, "application/json")
        .header(CONTENT_TYPE, "application/json");
    if let Some(key) = config.api_key.as_deref() {
        req = req.header(API_KEY_HEADER, key);
    }

    let resp = req.send()?;
    let status = resp.status();
    let body = resp.text()?;
    if !status.is_success() {
        return Err(FetchError::Http {
            status: status.as_u16(),
            body,
        });
    }
    parse_leaderboard_json(&body)
}

pub fn parse_leaderboard_json(raw: &str) -> Result<LeaderboardSnapshot, FetchError> {
    let data: LeaderboardResponse = serde_json::from_str(raw.trim())
        .map_err(|err| FetchError::Contract(err.to_string()))?;
    if let Some(entry) = data.leaderboard.iter().find(|e| e.rank == 0) {
        return Err(FetchError::Contract(format!(
            "rank must be at least 1 (wallet {})",
            entry.wallet_address
        )));
    }
    Ok(LeaderboardSnapshot {
        entries: data.leaderboard,
        total_users: data.total_user,
        total_xp: data.total_xp,
    })
}
