//! Pure projections over already-fetched leaderboard data. Nothing here does I/O.

use crate::state::LeaderboardEntry;

pub const ITEMS_PER_PAGE: u32 = 10;
pub const PODIUM_SIZE: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: u32,
}

impl PageWindow {
    pub fn new(page: u32) -> Self {
        Self { page: page.max(1) }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(ITEMS_PER_PAGE)
    }

    pub fn limit(&self) -> u32 {
        ITEMS_PER_PAGE
    }
}

pub fn total_pages(total_users: u64) -> u32 {
    let pages = total_users.div_ceil(u64::from(ITEMS_PER_PAGE));
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// Mean XP per user, rounded half up. Zero users yields zero.
pub fn average_xp(total_xp: u64, total_users: u64) -> u64 {
    if total_users == 0 {
        return 0;
    }
    let total_xp = u128::from(total_xp);
    let total_users = u128::from(total_users);
    ((total_xp + total_users / 2) / total_users) as u64
}

pub fn highest_xp_on_page(entries: &[LeaderboardEntry]) -> u64 {
    entries.iter().map(|e| e.xp).max().unwrap_or(0)
}

pub fn filter_entries<'a>(entries: &'a [LeaderboardEntry], term: &str) -> Vec<&'a LeaderboardEntry> {
    if term.is_empty() {
        return entries.iter().collect();
    }
    let query = term.to_lowercase();
    entries
        .iter()
        .filter(|e| e.wallet_address.to_lowercase().contains(&query))
        .collect()
}

pub fn top_three(entries: &[LeaderboardEntry]) -> &[LeaderboardEntry] {
    &entries[..entries.len().min(PODIUM_SIZE)]
}

pub fn share_text(product: &str, rank: u32, xp: u64, url: &str) -> String {
    format!("Hey! I am at Rank {rank} with {xp} XP on {product}'s quest here: {url}")
}

pub fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn short_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 12 {
        return address.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}…{tail}")
}
