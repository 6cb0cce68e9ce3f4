use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::extract::{Request, State};
use axum::http::header::{HeaderMap, HeaderName, HeaderValue};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::any;

use crate::config::ProxyConfig;

pub const PROXY_PREFIX: &str = "/api/leaderboard";
const MAX_BODY_BYTES: usize = 1024 * 1024;
const API_KEY: HeaderName = HeaderName::from_static("x-api-key");

const HOP_BY_HOP: [&str; 9] = [
    "host",
    "connection",
    "content-length",
    "transfer-encoding",
    "keep-alive",
    "upgrade",
    "proxy-connection",
    "te",
    "trailer",
];

/// Maps `/api/leaderboard[/rest]` onto the upstream base, keeping the suffix and
/// query string byte for byte. Any other path is not ours.
pub fn rewrite_target(upstream_base: &str, path: &str, query: Option<&str>) -> Option<String> {
    let rest = path.strip_prefix(PROXY_PREFIX)?;
    if !rest.is_empty() && !rest.starts_with('/') {
        return None;
    }
    let mut target = format!("{}{rest}", upstream_base.trim_end_matches('/'));
    if let Some(query) = query.filter(|q| !q.is_empty()) {
        target.push('?');
        target.push_str(query);
    }
    Some(target)
}

#[derive(Clone)]
pub struct ProxyState {
    client: reqwest::Client,
    upstream_base: Arc<str>,
    inject_api_key: Option<HeaderValue>,
}

impl ProxyState {
    pub fn new(config: &ProxyConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .context("failed to build upstream client")?;
        Self::with_client(client, config)
    }

    pub fn with_client(client: reqwest::Client, config: &ProxyConfig) -> Result<Self> {
        let inject_api_key = config
            .inject_api_key
            .as_deref()
            .map(HeaderValue::from_str)
            .transpose()
            .context("PROXY_API_KEY is not a valid header value")?
            .map(|mut value| {
                value.set_sensitive(true);
                value
            });
        Ok(Self {
            client,
            upstream_base: Arc::from(config.upstream_base.as_str()),
            inject_api_key,
        })
    }
}

pub fn router(state: ProxyState) -> Router {
    Router::new()
        .route(PROXY_PREFIX, any(forward))
        .route("/api/leaderboard/", any(forward))
        .route("/api/leaderboard/*rest", any(forward))
        .with_state(state)
}

async fn forward(State(state): State<ProxyState>, req: Request) -> Response {
    let (parts, body) = req.into_parts();
    let path = parts.uri.path().to_string();
    let Some(target) = rewrite_target(&state.upstream_base, &path, parts.uri.query()) else {
        return (StatusCode::NOT_FOUND, "not found").into_response();
    };

    let body = match to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::warn!(%path, error = %err, "rejecting unreadable request body");
            return (StatusCode::BAD_REQUEST, "unreadable request body").into_response();
        }
    };

    let mut headers = strip_hop_by_hop(&parts.headers);
    if let Some(key) = state.inject_api_key.as_ref()
        && !headers.contains_key(&API_KEY)
    {
        headers.insert(API_KEY, key.clone());
    }

    let upstream = state
        .client
        .request(parts.method.clone(), &target)
        .headers(headers)
        .body(body)
        .send()
        .await;
    let resp = match upstream {
        Ok(resp) => resp,
        Err(err) => {
            tracing::warn!(method = %parts.method, %path, error = %err, "upstream request failed");
            return (StatusCode::BAD_GATEWAY, "upstream unavailable").into_response();
        }
    };

    let status = resp.status();
    let resp_headers = strip_hop_by_hop(resp.headers());
    let bytes = match resp.bytes().await {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::warn!(method = %parts.method, %path, error = %err, "upstream body read failed");
            return (StatusCode::BAD_GATEWAY, "upstream unavailable").into_response();
        }
    };
    tracing::info!(method = %parts.method, %path, status = status.as_u16(), "forwarded");

    let mut out = Response::new(Body::from(bytes));
    *out.status_mut() = status;
    *out.headers_mut() = resp_headers;
    out
}

fn strip_hop_by_hop(headers: &HeaderMap) -> HeaderMap {
    let mut out = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        if !is_hop_by_hop(name) {
            out.append(name.clone(), value.clone());
        }
    }
    out
}

fn is_hop_by_hop(name: &HeaderName) -> bool {
    HOP_BY_HOP.contains(&name.as_str())
}
