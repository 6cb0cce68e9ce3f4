use std::env;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender};
use std::thread;

use crate::config::LeaderboardConfig;
use crate::leaderboard_fetch;
use crate::state::{Delta, ProviderCommand};

/// Runs page fetches off the UI thread. Each request is its own job, so a slow
/// response can land after a newer one; the controller sorts that out by `seq`.
pub fn spawn_provider(
    config: LeaderboardConfig,
    tx: Sender<Delta>,
    cmd_rx: Receiver<ProviderCommand>,
) {
    thread::spawn(move || {
        let config = Arc::new(config);
        let pool = build_fetch_pool();

        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                ProviderCommand::FetchPage {
                    seq,
                    page,
                    offset,
                    limit,
                } => {
                    let tx = tx.clone();
                    let config = config.clone();
                    let job = move || {
                        let delta = match leaderboard_fetch::fetch_page(&config, offset, limit) {
                            Ok(snapshot) => Delta::PageLoaded {
                                seq,
                                page,
                                snapshot,
                            },
                            Err(error) => Delta::PageFailed { seq, page, error },
                        };
                        let _ = tx.send(delta);
                    };

                    if let Some(pool) = pool.as_ref() {
                        pool.spawn(job);
                    } else {
                        thread::spawn(job);
                    }
                }
            }
        }
    });
}

fn build_fetch_pool() -> Option<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(fetch_parallelism())
        .thread_name(|idx| format!("leaderboard-fetch-{idx}"))
        .build()
        .ok()
}

fn fetch_parallelism() -> usize {
    env::var("FETCH_PARALLELISM")
        .ok()
        .and_then(|val| val.parse::<usize>().ok())
        .unwrap_or(2)
        .clamp(1, 8)
}
