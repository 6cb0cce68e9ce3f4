use std::sync::mpsc::Sender;
use std::time::Instant;

use crate::clipboard::{ClipboardSink, CopiedIndicator};
use crate::config::LeaderboardConfig;
use crate::state::{AppState, Delta, FetchState, LeaderboardEntry, ProviderCommand, apply_delta};
use crate::views::{self, PageWindow};

/// Owns the leaderboard state and is the only thing that asks the worker for pages.
///
/// Every request carries a sequence number; only the response to the most
/// recently issued request is allowed to replace the snapshot.
pub struct Controller {
    pub state: AppState,
    config: LeaderboardConfig,
    cmd_tx: Option<Sender<ProviderCommand>>,
    next_seq: u64,
}

impl Controller {
    pub fn new(config: LeaderboardConfig, cmd_tx: Option<Sender<ProviderCommand>>) -> Self {
        Self {
            state: AppState::new(),
            config,
            cmd_tx,
            next_seq: 0,
        }
    }

    pub fn config(&self) -> &LeaderboardConfig {
        &self.config
    }

    /// First load. The page count is unknown here, so no bounds check applies.
    pub fn start(&mut self) -> bool {
        let page = self.state.current_page;
        self.load_page(page)
    }

    pub fn load_page(&mut self, page: u32) -> bool {
        if page == 0 {
            return false;
        }
        self.next_seq += 1;
        let seq = self.next_seq;
        self.state.latest_seq = seq;
        self.state.fetch = FetchState::Loading;

        let window = PageWindow::new(page);
        let cmd = ProviderCommand::FetchPage {
            seq,
            page,
            offset: window.offset(),
            limit: window.limit(),
        };
        let sent = self
            .cmd_tx
            .as_ref()
            .is_some_and(|tx| tx.send(cmd).is_ok());
        if !sent {
            self.state.push_log("[WARN] Leaderboard fetch worker unavailable");
            self.state.fetch = FetchState::Failed("fetch worker unavailable".to_string());
            return false;
        }
        self.state.push_log(format!(
            "[INFO] Fetching page {page} (offset {}, request #{seq})",
            window.offset()
        ));
        true
    }

    /// Ignored unless `1 <= page <= total_pages`.
    pub fn change_page(&mut self, page: u32) -> bool {
        if page < 1 || page > self.state.total_pages() {
            return false;
        }
        self.state.current_page = page;
        self.state.selected = 0;
        self.load_page(page)
    }

    pub fn next_page(&mut self) -> bool {
        self.change_page(self.state.current_page.saturating_add(1))
    }

    pub fn prev_page(&mut self) -> bool {
        self.change_page(self.state.current_page.saturating_sub(1))
    }

    pub fn retry(&mut self) -> bool {
        if !self.state.fetch.is_failed() {
            return false;
        }
        self.state.push_log("[INFO] Retrying");
        let page = self.state.current_page;
        self.load_page(page)
    }

    pub fn search(&mut self, term: impl Into<String>) {
        self.state.search_term = term.into();
        self.state.clamp_selection();
    }

    pub fn visible_entries(&self) -> Vec<&LeaderboardEntry> {
        self.state.visible_entries()
    }

    pub fn apply(&mut self, delta: Delta) {
        apply_delta(&mut self.state, delta);
    }

    /// Copies `address` and marks it for `COPY_FEEDBACK`. Failures only reach the log.
    pub fn copy_address<C: ClipboardSink>(
        &mut self,
        clipboard: &mut C,
        address: &str,
        now: Instant,
    ) -> bool {
        match clipboard.set_text(address) {
            Ok(()) => {
                self.state.copied = Some(CopiedIndicator::new(address, now));
                true
            }
            Err(err) => {
                self.state.push_log(format!("[WARN] Copy failed: {err}"));
                false
            }
        }
    }

    pub fn copy_selected<C: ClipboardSink>(&mut self, clipboard: &mut C, now: Instant) -> bool {
        let Some(address) = self
            .state
            .selected_entry()
            .map(|e| e.wallet_address.clone())
        else {
            return false;
        };
        self.copy_address(clipboard, &address, now)
    }

    pub fn share_text_for(&self, entry: &LeaderboardEntry) -> String {
        views::share_text(
            &self.config.product_name,
            entry.rank,
            entry.xp,
            &self.config.share_url,
        )
    }

    pub fn share_selected<C: ClipboardSink>(&mut self, clipboard: &mut C) -> Option<String> {
        let text = self.state.selected_entry().map(|e| self.share_text_for(e))?;
        match clipboard.set_text(&text) {
            Ok(()) => self.state.push_log(format!("[INFO] Share text copied: {text}")),
            Err(err) => self.state.push_log(format!("[WARN] Share failed: {err}")),
        }
        Some(text)
    }

    pub fn tick(&mut self, now: Instant) {
        self.state.expire_copied(now);
    }
}
