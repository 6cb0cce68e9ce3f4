use std::collections::VecDeque;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::clipboard::CopiedIndicator;
use crate::error::FetchError;
use crate::views;

const MAX_LOGS: usize = 200;

/// One ranked participant as delivered by the upstream service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub wallet_address: String,
    pub xp: u64,
}

/// The current page plus the global aggregates. Always replaced as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LeaderboardSnapshot {
    pub entries: Vec<LeaderboardEntry>,
    pub total_users: u64,
    pub total_xp: u64,
}

impl LeaderboardSnapshot {
    pub fn total_pages(&self) -> u32 {
        views::total_pages(self.total_users)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchState {
    Idle,
    Loading,
    Ready,
    Failed(String),
}

impl FetchState {
    pub fn is_failed(&self) -> bool {
        matches!(self, FetchState::Failed(_))
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            FetchState::Failed(msg) => Some(msg.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub fetch: FetchState,
    pub current_page: u32,
    pub snapshot: Option<LeaderboardSnapshot>,
    // First three rows of page 1; kept while browsing later pages.
    pub top_three: Vec<LeaderboardEntry>,
    pub search_term: String,
    pub search_active: bool,
    pub selected: usize,
    pub copied: Option<CopiedIndicator>,
    pub latest_seq: u64,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            fetch: FetchState::Idle,
            current_page: 1,
            snapshot: None,
            top_three: Vec::new(),
            search_term: String::new(),
            search_active: false,
            selected: 0,
            copied: None,
            latest_seq: 0,
            logs: VecDeque::new(),
            help_overlay: false,
        }
    }

    pub fn total_users(&self) -> u64 {
        self.snapshot.as_ref().map(|s| s.total_users).unwrap_or(0)
    }

    pub fn total_xp(&self) -> u64 {
        self.snapshot.as_ref().map(|s| s.total_xp).unwrap_or(0)
    }

    pub fn total_pages(&self) -> u32 {
        self.snapshot
            .as_ref()
            .map(LeaderboardSnapshot::total_pages)
            .unwrap_or(0)
    }

    pub fn page_entries(&self) -> &[LeaderboardEntry] {
        self.snapshot
            .as_ref()
            .map(|s| s.entries.as_slice())
            .unwrap_or(&[])
    }

    /// Current page narrowed by the search term. Never reaches beyond the page.
    pub fn visible_entries(&self) -> Vec<&LeaderboardEntry> {
        views::filter_entries(self.page_entries(), &self.search_term)
    }

    pub fn selected_entry(&self) -> Option<&LeaderboardEntry> {
        self.visible_entries().get(self.selected).copied()
    }

    pub fn select_next(&mut self) {
        let len = self.visible_entries().len();
        if len == 0 {
            self.selected = 0;
            return;
        }
        if self.selected + 1 < len {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn clamp_selection(&mut self) {
        let len = self.visible_entries().len();
        if len == 0 {
            self.selected = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }

    pub fn is_copied(&self, address: &str, now: Instant) -> bool {
        self.copied
            .as_ref()
            .is_some_and(|mark| mark.matches(address, now))
    }

    pub fn expire_copied(&mut self, now: Instant) {
        if self
            .copied
            .as_ref()
            .is_some_and(|mark| !mark.is_active(now))
        {
            self.copied = None;
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }
}

#[derive(Debug, Clone)]
pub enum Delta {
    PageLoaded {
        seq: u64,
        page: u32,
        snapshot: LeaderboardSnapshot,
    },
    PageFailed {
        seq: u64,
        page: u32,
        error: FetchError,
    },
    Log(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCommand {
    FetchPage {
        seq: u64,
        page: u32,
        offset: u64,
        limit: u32,
    },
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::PageLoaded {
            seq,
            page,
            snapshot,
        } => {
            if seq != state.latest_seq {
                state.push_log(format!(
                    "[INFO] Discarded stale response for page {page} (request #{seq})"
                ));
                return;
            }
            if page == 1 {
                state.top_three = views::top_three(&snapshot.entries).to_vec();
            }
            state.push_log(format!(
                "[INFO] Page {page} loaded: {} rows, {} users",
                snapshot.entries.len(),
                snapshot.total_users
            ));
            state.snapshot = Some(snapshot);
            state.fetch = FetchState::Ready;
            state.clamp_selection();
        }
        Delta::PageFailed { seq, page, error } => {
            if seq != state.latest_seq {
                state.push_log(format!(
                    "[INFO] Discarded stale failure for page {page} (request #{seq})"
                ));
                return;
            }
            state.push_log(format!(
                "[WARN] Leaderboard fetch failed ({}): {error}",
                error.kind()
            ));
            state.fetch = FetchState::Failed(error.to_string());
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}
