use std::collections::VecDeque;
use std::io::{self, Stdout};
use std::time::Duration;

use anyhow::Context;
use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{ListState, Paragraph, TableState};
use ratatui::{Frame, Terminal};
use tokio::sync::{mpsc, watch};

use crate::application::services::{CycleReport, PortfolioSummary};
use crate::domain::entities::Notification;
use crate::presentation::tui::event::{ActivePanel, SortColumn, SortOrder};
use crate::presentation::tui::widgets::feed::render_feed;
use crate::presentation::tui::widgets::holdings::render_holdings;

const MAX_FEED_ITEMS: usize = 100;
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Data feeds the dashboard reads from; the writers live on the async runtime.
pub struct DashboardFeeds {
    pub portfolio: watch::Receiver<Option<PortfolioSummary>>,
    pub cycles: watch::Receiver<Option<CycleReport>>,
    pub notifications: mpsc::UnboundedReceiver<Notification>,
}

struct App {
    feeds: DashboardFeeds,

    summary: Option<PortfolioSummary>,
    last_cycle: Option<CycleReport>,
    feed: VecDeque<Notification>,

    active_panel: ActivePanel,
    sort_column: SortColumn,
    sort_order: SortOrder,
    table_state: TableState,
    feed_state: ListState,

    should_quit: bool,
}

impl App {
    #[must_use]
    fn new(feeds: DashboardFeeds) -> Self {
        Self {
            feeds,
            summary: None,
            last_cycle: None,
            feed: VecDeque::new(),
            active_panel: ActivePanel::default(),
            sort_column: SortColumn::default(),
            sort_order: SortOrder::default(),
            table_state: TableState::default(),
            feed_state: ListState::default(),
            should_quit: false,
        }
    }

    fn refresh_data(&mut self) {
        if self.feeds.portfolio.has_changed().unwrap_or(false) {
            self.summary = self.feeds.portfolio.borrow_and_update().clone();
        }
        if self.feeds.cycles.has_changed().unwrap_or(false) {
            self.last_cycle = *self.feeds.cycles.borrow_and_update();
        }
        while let Ok(notification) = self.feeds.notifications.try_recv() {
            self.feed.push_front(notification);
        }
        self.feed.truncate(MAX_FEED_ITEMS);
        self.clamp_selections();
    }

    fn holding_count(&self) -> usize {
        self.summary.as_ref().map_or(0, |s| s.holdings.len())
    }

    fn clamp_selections(&mut self) {
        let holding_count = self.holding_count();
        clamp(&mut self.table_state, holding_count);
        let feed_count = self.feed.len();
        if let Some(sel) = self.feed_state.selected() {
            if feed_count == 0 {
                self.feed_state.select(None);
            } else if sel >= feed_count {
                self.feed_state.select(Some(feed_count - 1));
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab | KeyCode::BackTab => self.active_panel = self.active_panel.next(),
            KeyCode::Char('j') | KeyCode::Down => self.scroll(true),
            KeyCode::Char('k') | KeyCode::Up => self.scroll(false),
            KeyCode::Char('s') => {
                if self.active_panel == ActivePanel::Holdings {
                    self.sort_column = self.sort_column.next();
                }
            }
            KeyCode::Char('o') => {
                if self.active_panel == ActivePanel::Holdings {
                    self.sort_order = self.sort_order.toggle();
                }
            }
            _ => {}
        }
    }

    fn scroll(&mut self, down: bool) {
        match self.active_panel {
            ActivePanel::Holdings => {
                let count = self.holding_count();
                let next = step(self.table_state.selected(), count, down);
                self.table_state.select(next);
            }
            ActivePanel::Feed => {
                let next = step(self.feed_state.selected(), self.feed.len(), down);
                self.feed_state.select(next);
            }
        }
    }

    fn draw(&mut self, frame: &mut Frame) {
        let [header_area, holdings_area, feed_area, status_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Fill(3),
            Constraint::Fill(2),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        self.render_header(frame, header_area);
        render_holdings(
            frame,
            self.summary.as_ref(),
            self.sort_column,
            self.sort_order,
            &mut self.table_state,
            self.active_panel == ActivePanel::Holdings,
            holdings_area,
        );
        render_feed(
            frame,
            self.feed.make_contiguous(),
            &mut self.feed_state,
            self.active_panel == ActivePanel::Feed,
            feed_area,
        );
        self.render_status_bar(frame, status_area);
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let refreshed = self.summary.as_ref().map_or_else(
            || "loading prices...".to_string(),
            |s| {
                s.refreshed_at
                    .with_timezone(&chrono::Local)
                    .format("prices %H:%M:%S")
                    .to_string()
            },
        );
        let cycle = self.last_cycle.map_or_else(
            || "no cycle yet".to_string(),
            |r| format!("last cycle: {} evaluated, {} triggered", r.evaluated, r.triggered),
        );

        let header = Line::from(vec![
            Span::styled(
                " STOCKWATCH ",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("│ "),
            Span::styled(
                format!("[{}]", self.active_panel),
                Style::default().fg(Color::Yellow),
            ),
            Span::raw(" │ "),
            Span::styled(refreshed, Style::default().fg(Color::DarkGray)),
            Span::raw(" │ "),
            Span::styled(cycle, Style::default().fg(Color::DarkGray)),
        ]);

        frame.render_widget(Paragraph::new(header), area);
    }

    #[allow(clippy::unused_self)]
    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let key_style = Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD);

        let bar = Line::from(vec![
            Span::styled(" q", key_style),
            Span::raw(":quit "),
            Span::styled("Tab", key_style),
            Span::raw(":panel "),
            Span::styled("j/k", key_style),
            Span::raw(":nav "),
            Span::styled("s", key_style),
            Span::raw(":sort "),
            Span::styled("o", key_style),
            Span::raw(":order"),
        ]);

        frame.render_widget(
            Paragraph::new(bar).style(Style::default().bg(Color::DarkGray)),
            area,
        );
    }
}

fn clamp(state: &mut TableState, count: usize) {
    if let Some(sel) = state.selected() {
        if count == 0 {
            state.select(None);
        } else if sel >= count {
            state.select(Some(count - 1));
        }
    }
}

/// Next selection in a wrapping list of `count` items.
fn step(current: Option<usize>, count: usize, down: bool) -> Option<usize> {
    if count == 0 {
        return None;
    }
    Some(match (current, down) {
        (None, true) => 0,
        (None, false) => count - 1,
        (Some(i), true) if i + 1 >= count => 0,
        (Some(i), true) => i + 1,
        (Some(0), false) => count - 1,
        (Some(i), false) => i - 1,
    })
}

/// Restore the terminal to its normal state.
fn restore_terminal() {
    if let Err(e) = disable_raw_mode() {
        eprintln!("Failed to disable raw mode: {e}");
    }
    if let Err(e) = execute!(io::stdout(), LeaveAlternateScreen) {
        eprintln!("Failed to leave alternate screen: {e}");
    }
}

/// Launch the interactive dashboard. Blocks until the user quits.
///
/// # Errors
///
/// Returns an error if terminal setup, rendering, or event handling fails.
pub fn run_tui(feeds: DashboardFeeds) -> anyhow::Result<()> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    if let Err(e) = execute!(stdout, EnterAlternateScreen) {
        let _ = disable_raw_mode();
        return Err(e).context("Failed to enter alternate screen");
    }

    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        restore_terminal();
        default_hook(info);
    }));

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    let mut app = App::new(feeds);
    let result = run_app_loop(&mut terminal, &mut app);

    restore_terminal();
    let _ = terminal.show_cursor();
    let _ = std::panic::take_hook();

    result
}

fn run_app_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
) -> anyhow::Result<()> {
    loop {
        app.refresh_data();
        terminal.draw(|frame| app.draw(frame))?;

        if event::poll(POLL_INTERVAL)? {
            if let CrosstermEvent::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
