pub mod clipboard;
pub mod config;
pub mod controller;
pub mod error;
pub mod fake_feed;
pub mod feed;
pub mod http_client;
pub mod leaderboard_fetch;
pub mod proxy;
pub mod state;
pub mod views;
