use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Row, Table};

use xp_leaderboard::clipboard::Osc52Clipboard;
use xp_leaderboard::config::{LeaderboardConfig, load_dotenv};
use xp_leaderboard::controller::Controller;
use xp_leaderboard::state::{AppState, Delta, FetchState, ProviderCommand};
use xp_leaderboard::views::{
    average_xp, format_thousands, highest_xp_on_page, short_address,
};
use xp_leaderboard::{fake_feed, feed};

struct App {
    controller: Controller,
    clipboard: Osc52Clipboard<io::Stdout>,
    should_quit: bool,
}

impl App {
    fn new(config: LeaderboardConfig, cmd_tx: mpsc::Sender<ProviderCommand>) -> Self {
        Self {
            controller: Controller::new(config, Some(cmd_tx)),
            clipboard: Osc52Clipboard::stdout(),
            should_quit: false,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.controller.state.search_active {
            self.on_search_key(key);
            return;
        }
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => {
                self.controller.state.help_overlay = !self.controller.state.help_overlay
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.controller.retry();
            }
            KeyCode::Char('/') => self.controller.state.search_active = true,
            KeyCode::Esc if !self.controller.state.search_term.is_empty() => {
                self.controller.search("");
            }
            _ if self.controller.state.fetch.is_failed() => {}
            KeyCode::Char('l') | KeyCode::Right => {
                self.controller.next_page();
            }
            KeyCode::Char('h') | KeyCode::Left => {
                self.controller.prev_page();
            }
            KeyCode::Char('j') | KeyCode::Down => self.controller.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.controller.state.select_prev(),
            KeyCode::Char('c') | KeyCode::Enter => {
                self.controller
                    .copy_selected(&mut self.clipboard, Instant::now());
            }
            KeyCode::Char('s') => {
                self.controller.share_selected(&mut self.clipboard);
            }
            _ => {}
        }
    }

    fn on_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter | KeyCode::Esc => self.controller.state.search_active = false,
            KeyCode::Backspace => {
                let mut term = self.controller.state.search_term.clone();
                term.pop();
                self.controller.search(term);
            }
            KeyCode::Char(ch) => {
                let mut term = self.controller.state.search_term.clone();
                term.push(ch);
                self.controller.search(term);
            }
            _ => {}
        }
    }
}

fn main() -> io::Result<()> {
    load_dotenv();
    let config = LeaderboardConfig::from_env();

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    if config.demo {
        fake_feed::spawn_fake_provider(tx, cmd_rx);
    } else {
        if config.api_key.is_none() {
            let _ = tx.send(Delta::Log(
                "[INFO] LEADERBOARD_API_KEY unset; relying on the proxy to authorize".to_string(),
            ));
        }
        feed::spawn_provider(config.clone(), tx, cmd_rx);
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let mut app = App::new(config, cmd_tx);
    app.controller.start();
    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            app.controller.apply(delta);
        }
        app.controller.tick(Instant::now());

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.on_key(key);
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let state = &app.controller.state;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Min(5),
            Constraint::Length(1),
            Constraint::Length(5),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(state))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    render_podium(frame, chunks[1], state);

    match &state.fetch {
        FetchState::Failed(message) => render_error(frame, chunks[2], message),
        FetchState::Idle | FetchState::Loading => {
            let loading = Paragraph::new("Loading leaderboard...")
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::DarkGray))
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(loading, chunks[2]);
        }
        FetchState::Ready => render_table(frame, chunks[2], state),
    }

    let footer = Paragraph::new(footer_text(state));
    frame.render_widget(footer, chunks[3]);

    let console = Paragraph::new(console_text(state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[4]);

    if state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let search = if state.search_active {
        format!("Search: {}_", state.search_term)
    } else if state.search_term.is_empty() {
        "Search: (press /)".to_string()
    } else {
        format!("Search: {}", state.search_term)
    };
    let line1 = format!("  LEADERBOARD | {search}");
    let line2 = format!(
        "  Total Users: {} | Total XP: {} | Avg XP: {} | Top XP on page: {}",
        format_thousands(state.total_users()),
        format_thousands(state.total_xp()),
        format_thousands(average_xp(state.total_xp(), state.total_users())),
        format_thousands(highest_xp_on_page(state.page_entries())),
    );
    format!("{line1}\n{line2}")
}

fn render_podium(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default().title("Top 3").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if state.top_three.is_empty() {
        let empty = Paragraph::new("No podium yet").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, inner);
        return;
    }

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(inner);
    let medals = [Color::Yellow, Color::Gray, Color::LightRed];
    for (idx, entry) in state.top_three.iter().enumerate() {
        let text = format!(
            "#{} {}\n{} XP",
            entry.rank,
            short_address(&entry.wallet_address),
            format_thousands(entry.xp)
        );
        let cell = Paragraph::new(text)
            .alignment(Alignment::Center)
            .style(Style::default().fg(medals[idx % medals.len()]));
        frame.render_widget(cell, cols[idx]);
    }
}

fn render_table(frame: &mut Frame, area: Rect, state: &AppState) {
    let now = Instant::now();
    let visible = state.visible_entries();
    let block = Block::default().title("Rankings").borders(Borders::ALL);
    if visible.is_empty() {
        let msg = if state.search_term.is_empty() {
            "No entries on this page"
        } else {
            "No wallets on this page match the search"
        };
        let empty = Paragraph::new(msg)
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let rows = visible.iter().enumerate().map(|(idx, entry)| {
        let marker = if state.is_copied(&entry.wallet_address, now) {
            "copied"
        } else {
            ""
        };
        let style = if idx == state.selected {
            Style::default().fg(Color::White).bg(Color::DarkGray)
        } else {
            Style::default()
        };
        Row::new(vec![
            entry.rank.to_string(),
            entry.wallet_address.clone(),
            format!("{:>12}", format_thousands(entry.xp)),
            marker.to_string(),
        ])
        .style(style)
    });
    let widths = [
        Constraint::Length(6),
        Constraint::Min(20),
        Constraint::Length(12),
        Constraint::Length(7),
    ];
    let table = Table::new(rows, widths)
        .header(
            Row::new(vec!["Rank", "Wallet Address", "          XP", ""])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(block);
    frame.render_widget(table, area);
}

fn render_error(frame: &mut Frame, area: Rect, message: &str) {
    let text = format!("Error Loading Leaderboard\n\n{message}\n\nPress r to try again");
    let panel = Paragraph::new(text)
        .style(Style::default().fg(Color::Red))
        .block(Block::default().title("Error").borders(Borders::ALL));
    frame.render_widget(panel, area);
}

fn footer_text(state: &AppState) -> String {
    let pages = format!("Page {} of {}", state.current_page, state.total_pages());
    if state.search_active {
        return format!("  {pages} | typing search, Enter/Esc to finish");
    }
    format!(
        "  {pages} | ←/h Prev | →/l Next | j/k Move | / Search | c Copy | s Share | r Retry | ? Help | q Quit"
    )
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No messages yet".to_string();
    }
    let start = state.logs.len().saturating_sub(3);
    state
        .logs
        .iter()
        .skip(start)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Leaderboard - Help",
        "",
        "  ← / h        Previous page",
        "  → / l        Next page",
        "  j/k or ↑/↓   Move selection",
        "  /            Search wallets on this page",
        "  Esc          Clear search",
        "  c / Enter    Copy wallet address",
        "  s            Copy share text",
        "  r            Retry after an error",
        "  ?            Toggle help",
        "  q            Quit",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
