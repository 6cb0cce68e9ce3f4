use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender};
use std::thread;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::FetchError;
use crate::state::{Delta, LeaderboardEntry, LeaderboardSnapshot, ProviderCommand};

pub const DEMO_SEED: u64 = 26;
pub const DEMO_USERS: usize = 137;
const FAIL_RATE: f64 = 0.05;

/// Offline stand-in for the proxy: same command/delta protocol, synthetic data.
pub fn spawn_fake_provider(tx: Sender<Delta>, cmd_rx: Receiver<ProviderCommand>) {
    thread::spawn(move || {
        let roster = Arc::new(demo_roster(DEMO_SEED, DEMO_USERS));
        let mut rng = StdRng::seed_from_u64(DEMO_SEED ^ 0x5eed);
        let _ = tx.send(Delta::Log(format!(
            "[INFO] Demo feed: {} synthetic wallets",
            roster.len()
        )));

        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                ProviderCommand::FetchPage {
                    seq,
                    page,
                    offset,
                    limit,
                } => {
                    let latency = Duration::from_millis(rng.gen_range(50..=400));
                    let fail = rng.gen_bool(FAIL_RATE);
                    let roster = roster.clone();
                    let tx = tx.clone();
                    thread::spawn(move || {
                        thread::sleep(latency);
                        let delta = if fail {
                            Delta::PageFailed {
                                seq,
                                page,
                                error: FetchError::Http {
                                    status: 500,
                                    body: "upstream down".to_string(),
                                },
                            }
                        } else {
                            Delta::PageLoaded {
                                seq,
                                page,
                                snapshot: demo_page(&roster, offset, limit),
                            }
                        };
                        let _ = tx.send(delta);
                    });
                }
            }
        }
    });
}

/// Deterministic roster, ranked by descending XP.
pub fn demo_roster(seed: u64, count: usize) -> Vec<LeaderboardEntry> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut xp_values: Vec<u64> = (0..count).map(|_| rng.gen_range(0..250_000)).collect();
    xp_values.sort_unstable_by(|a, b| b.cmp(a));

    xp_values
        .into_iter()
        .enumerate()
        .map(|(idx, xp)| LeaderboardEntry {
            rank: idx as u32 + 1,
            wallet_address: random_wallet(&mut rng),
            xp,
        })
        .collect()
}

pub fn demo_page(roster: &[LeaderboardEntry], offset: u64, limit: u32) -> LeaderboardSnapshot {
    let start = usize::try_from(offset).unwrap_or(usize::MAX).min(roster.len());
    let end = start.saturating_add(limit as usize).min(roster.len());
    LeaderboardSnapshot {
        entries: roster[start..end].to_vec(),
        total_users: roster.len() as u64,
        total_xp: roster.iter().map(|e| e.xp).sum(),
    }
}

fn random_wallet(rng: &mut StdRng) -> String {
    const HEX: &[u8] = b"0123456789abcdef";
    let mut out = String::with_capacity(42);
    out.push_str("0x");
    for _ in 0..40 {
        out.push(HEX[rng.gen_range(0..HEX.len())] as char);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roster_is_ranked_by_xp() {
        let roster = demo_roster(DEMO_SEED, 40);
        assert_eq!(roster.len(), 40);
        assert!(roster.windows(2).all(|w| w[0].xp >= w[1].xp));
        assert!(roster.iter().enumerate().all(|(i, e)| e.rank == i as u32 + 1));
    }

    #[test]
    fn last_page_is_partial() {
        let roster = demo_roster(DEMO_SEED, DEMO_USERS);
        let page = demo_page(&roster, 130, 10);
        assert_eq!(page.entries.len(), 7);
        assert_eq!(page.entries[0].rank, 131);
        assert_eq!(page.total_users, DEMO_USERS as u64);
    }
}
