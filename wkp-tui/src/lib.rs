pub mod console_view;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info};
use wkp_client::{ApiClient, QueryRequest, SearchBackend};
use wkp_core::render::card_lines;
use wkp_core::{ConsoleConfig, ConsoleEvent, ConsoleState, StatsPoller};

const MAX_HISTORY: usize = 100;
const PAGE_SIZE: usize = 10;

/// Terminal-side state wrapped around the console state: line editing,
/// query history and result scrolling.
pub struct App {
    console: ConsoleState,
    cursor_position: usize,
    history: Vec<String>,
    history_index: Option<usize>,
    temp_input: String,
    scroll_offset: usize,
    /// Result rows visible in the last drawn frame.
    results_height: usize,
    should_quit: bool,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    pub fn new() -> Self {
        Self {
            console: ConsoleState::new(),
            cursor_position: 0,
            history: Vec::new(),
            history_index: None,
            temp_input: String::new(),
            scroll_offset: 0,
            results_height: 0,
            should_quit: false,
        }
    }

    pub fn console(&self) -> &ConsoleState {
        &self.console
    }

    /// Cursor position in characters.
    pub fn cursor_position(&self) -> usize {
        self.cursor_position
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    /// Records how many result rows fit on screen and pulls the scroll
    /// offset back inside the new range.
    pub fn set_results_height(&mut self, height: usize) {
        self.results_height = height;
        self.scroll_offset = self.scroll_offset.min(self.max_scroll());
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn apply(&mut self, event: ConsoleEvent) {
        if matches!(event, ConsoleEvent::SearchFinished(_)) {
            self.scroll_offset = 0;
        }
        self.console.apply(event);
    }

    /// Handles one key press. Returns a request when the key submitted a
    /// search that should now be sent.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<QueryRequest> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Char('c') if ctrl => self.should_quit = true,
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('d') if ctrl => self.console.dismiss_message(),
            KeyCode::Home if ctrl => self.scroll_offset = 0,
            KeyCode::End if ctrl => self.scroll_offset = self.max_scroll(),
            KeyCode::PageUp => {
                self.scroll_offset = self.scroll_offset.saturating_sub(PAGE_SIZE);
            }
            KeyCode::PageDown => {
                self.scroll_offset = (self.scroll_offset + PAGE_SIZE).min(self.max_scroll());
            }
            // Everything below edits or submits the query, which is
            // disabled while a search is running
            _ if self.console.is_loading() => {}
            KeyCode::Enter => return self.submit(),
            KeyCode::F(n @ 1..=3) => {
                if self.console.use_example(usize::from(n) - 1) {
                    self.cursor_position = self.input_len();
                    self.reset_history_navigation();
                }
            }
            KeyCode::Char(c) if !ctrl => {
                let at = self.byte_index();
                self.console.query_mut().insert(at, c);
                self.cursor_position += 1;
                self.reset_history_navigation();
            }
            KeyCode::Backspace => {
                if self.cursor_position > 0 {
                    self.cursor_position -= 1;
                    let at = self.byte_index();
                    self.console.query_mut().remove(at);
                    self.reset_history_navigation();
                }
            }
            KeyCode::Delete => {
                if self.cursor_position < self.input_len() {
                    let at = self.byte_index();
                    self.console.query_mut().remove(at);
                    self.reset_history_navigation();
                }
            }
            KeyCode::Left => {
                self.cursor_position = self.cursor_position.saturating_sub(1);
            }
            KeyCode::Right => {
                if self.cursor_position < self.input_len() {
                    self.cursor_position += 1;
                }
            }
            KeyCode::Home => self.cursor_position = 0,
            KeyCode::End => self.cursor_position = self.input_len(),
            KeyCode::Up => self.navigate_history_backward(),
            KeyCode::Down => self.navigate_history_forward(),
            _ => {}
        }

        None
    }

    fn submit(&mut self) -> Option<QueryRequest> {
        let request = self.console.begin_search()?;

        if self.history.last() != Some(&request.query) {
            self.history.push(request.query.clone());
            if self.history.len() > MAX_HISTORY {
                self.history.remove(0);
            }
        }
        self.reset_history_navigation();
        self.scroll_offset = 0;

        Some(request)
    }

    fn input_len(&self) -> usize {
        self.console.query().chars().count()
    }

    fn byte_index(&self) -> usize {
        self.console
            .query()
            .char_indices()
            .nth(self.cursor_position)
            .map(|(idx, _)| idx)
            .unwrap_or_else(|| self.console.query().len())
    }

    /// Largest offset that still fills the results viewport.
    fn max_scroll(&self) -> usize {
        let results = self.console.results();
        let card_rows: usize = results.iter().map(|r| card_lines(r).len()).sum();
        let total_lines = card_rows + results.len().saturating_sub(1);
        total_lines.saturating_sub(self.results_height)
    }

    fn reset_history_navigation(&mut self) {
        self.history_index = None;
        self.temp_input.clear();
    }

    fn set_input(&mut self, input: String) {
        self.console.set_query(input);
        self.cursor_position = self.input_len();
    }

    pub fn navigate_history_backward(&mut self) {
        if self.history.is_empty() {
            return;
        }

        // Starting navigation, keep what was being typed
        if self.history_index.is_none() {
            self.temp_input = self.console.query().to_string();
        }

        let idx = match self.history_index {
            None => self.history.len() - 1,
            Some(idx) => idx.saturating_sub(1),
        };
        self.history_index = Some(idx);
        self.set_input(self.history[idx].clone());
    }

    pub fn navigate_history_forward(&mut self) {
        let Some(idx) = self.history_index else {
            return;
        };

        if idx + 1 >= self.history.len() {
            let typed = std::mem::take(&mut self.temp_input);
            self.history_index = None;
            self.set_input(typed);
        } else {
            self.history_index = Some(idx + 1);
            self.set_input(self.history[idx + 1].clone());
        }
    }
}

/// Runs the console until the user quits. Owns the terminal for its whole
/// lifetime and restores it on the way out.
pub async fn run(config: ConsoleConfig) -> Result<()> {
    let client = ApiClient::new(config.api_url.as_str()).context("Failed to build HTTP client")?;
    info!("Console started against {}", client.base_url());

    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let poller = StatsPoller::spawn(Arc::new(client.clone()), config.poll_interval, tx.clone());

    let mut app = App::new();
    let result = run_app(&mut terminal, &mut app, &client, &tx, &mut rx);

    poller.shutdown().await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    info!("Console closed");
    result
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    client: &ApiClient,
    tx: &UnboundedSender<ConsoleEvent>,
    rx: &mut UnboundedReceiver<ConsoleEvent>,
) -> Result<()> {
    loop {
        // Apply whatever background work finished since the last frame
        while let Ok(event) = rx.try_recv() {
            app.apply(event);
        }

        let frame = terminal.draw(|f| console_view::draw(f, app))?;
        let results_height = console_view::results_height(frame.area);
        app.set_results_height(results_height);

        if app.should_quit() {
            break;
        }

        if event::poll(Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
            && let Some(request) = app.handle_key(key)
        {
            spawn_search(client.clone(), tx.clone(), request);
        }
    }

    Ok(())
}

fn spawn_search(client: ApiClient, tx: UnboundedSender<ConsoleEvent>, request: QueryRequest) {
    tokio::spawn(async move {
        let response = client.search(&request).await;
        if tx.send(ConsoleEvent::SearchFinished(response)).is_err() {
            debug!("Console closed before the search finished");
        }
    });
}
