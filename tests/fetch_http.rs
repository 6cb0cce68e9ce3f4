use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use axum::Router;
use axum::extract::Query;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use serde_json::json;

use xp_leaderboard::config::{LeaderboardConfig, ProxyConfig};
use xp_leaderboard::controller::Controller;
use xp_leaderboard::error::FetchError;
use xp_leaderboard::fake_feed::{demo_page, demo_roster};
use xp_leaderboard::feed::spawn_provider;
use xp_leaderboard::leaderboard_fetch::fetch_page;
use xp_leaderboard::proxy::{ProxyState, router};
use xp_leaderboard::state::FetchState;

const ACTION_ID: &str = "competition-1";
const API_KEY: &str = "test-key";
const ROSTER_SIZE: usize = 23;

/// Serves `app` from a background runtime so blocking clients can call it.
fn spawn_server(app: Router) -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind test listener");
    listener.set_nonblocking(true).expect("nonblocking listener");
    let addr = listener.local_addr().expect("local addr");
    thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .expect("test runtime");
        rt.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(listener).expect("tokio listener");
            let _ = axum::serve(listener, app).await;
        });
    });
    addr
}

async fn scoring_service(headers: HeaderMap, Query(params): Query<HashMap<String, String>>) -> Response {
    if headers.get("x-api-key").and_then(|v| v.to_str().ok()) != Some(API_KEY) {
        return (StatusCode::UNAUTHORIZED, "missing api key").into_response();
    }
    if params.get("action-id").map(String::as_str) != Some(ACTION_ID) {
        return (StatusCode::BAD_REQUEST, "unknown action").into_response();
    }
    let offset = params
        .get("offset")
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(0);
    let limit = params
        .get("limit")
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(10);
    let roster = demo_roster(7, ROSTER_SIZE);
    let page = demo_page(&roster, offset, limit);
    axum::Json(json!({
        "leaderboard": page.entries,
        "totalUser": page.total_users,
        "totalXp": page.total_xp,
    }))
    .into_response()
}

fn spawn_stack(upstream: Router, inject_api_key: Option<&str>) -> LeaderboardConfig {
    let upstream_addr = spawn_server(upstream);
    let proxy_config = ProxyConfig {
        bind: "127.0.0.1:0".parse().expect("socket addr"),
        upstream_base: format!("http://{upstream_addr}/apps/leaderboard"),
        inject_api_key: inject_api_key.map(str::to_string),
    };
    let state = ProxyState::new(&proxy_config).expect("proxy state");
    let proxy_addr = spawn_server(router(state));
    LeaderboardConfig {
        proxy_base: format!("http://{proxy_addr}"),
        action_id: ACTION_ID.to_string(),
        ..LeaderboardConfig::default()
    }
}

fn scoring_router() -> Router {
    Router::new().route("/apps/leaderboard", get(scoring_service))
}

#[test]
fn client_key_reaches_upstream_through_proxy() {
    let config = LeaderboardConfig {
        api_key: Some(API_KEY.to_string()),
        ..spawn_stack(scoring_router(), None)
    };
    let snapshot = fetch_page(&config, 20, 10).expect("page should load");
    assert_eq!(snapshot.total_users, ROSTER_SIZE as u64);
    assert_eq!(snapshot.entries.len(), 3);
    assert_eq!(snapshot.entries[0].rank, 21);
}

#[test]
fn proxy_injected_key_lets_client_stay_keyless() {
    let config = spawn_stack(scoring_router(), Some(API_KEY));
    assert!(config.api_key.is_none());
    let snapshot = fetch_page(&config, 0, 10).expect("page should load");
    assert_eq!(snapshot.entries.len(), 10);
    assert_eq!(snapshot.entries[0].rank, 1);
}

#[test]
fn missing_key_surfaces_http_error() {
    let config = spawn_stack(scoring_router(), None);
    let err = fetch_page(&config, 0, 10).expect_err("upstream should refuse");
    assert_eq!(
        err,
        FetchError::Http {
            status: 401,
            body: "missing api key".to_string()
        }
    );
}

#[test]
fn upstream_500_message_carries_status_and_body() {
    let upstream = Router::new().route(
        "/apps/leaderboard",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "upstream down") }),
    );
    let config = spawn_stack(upstream, None);
    let err = fetch_page(&config, 0, 10).expect_err("should fail");
    let message = err.to_string();
    assert!(message.contains("500"), "{message}");
    assert!(message.contains("upstream down"), "{message}");
}

#[test]
fn malformed_body_is_contract_error() {
    let upstream = Router::new().route(
        "/apps/leaderboard",
        get(|| async { axum::Json(json!({ "rows": [] })) }),
    );
    let config = spawn_stack(upstream, None);
    let err = fetch_page(&config, 0, 10).expect_err("should fail");
    assert_eq!(err.kind(), "contract");
}

#[test]
fn unreachable_proxy_is_network_error() {
    let closed = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        listener.local_addr().expect("addr")
    };
    let config = LeaderboardConfig {
        proxy_base: format!("http://{closed}"),
        ..LeaderboardConfig::default()
    };
    let err = fetch_page(&config, 0, 10).expect_err("nothing is listening");
    assert_eq!(err.kind(), "network");
}

#[test]
fn worker_drives_controller_to_ready() {
    let config = LeaderboardConfig {
        api_key: Some(API_KEY.to_string()),
        ..spawn_stack(scoring_router(), None)
    };
    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    spawn_provider(config.clone(), tx, cmd_rx);

    let mut ctl = Controller::new(config, Some(cmd_tx));
    assert!(ctl.start());
    let delta = rx
        .recv_timeout(Duration::from_secs(10))
        .expect("worker should answer");
    ctl.apply(delta);
    assert_eq!(ctl.state.fetch, FetchState::Ready);
    assert_eq!(ctl.state.total_pages(), 3);
    assert_eq!(ctl.state.top_three.len(), 3);

    assert!(ctl.change_page(3));
    let delta = rx
        .recv_timeout(Duration::from_secs(10))
        .expect("worker should answer");
    ctl.apply(delta);
    assert_eq!(ctl.state.current_page, 3);
    assert_eq!(ctl.state.page_entries().len(), 3);
    assert_eq!(ctl.state.top_three[0].rank, 1);
}
