//! Main TUI application state and logic

use crate::explain::explain;
use crate::playback::Playback;
use crate::trace::Stats;
use crate::ui::panes::{self, SourceScrollState, StatusRenderData};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use std::io;
use std::time::{Duration, Instant};

/// Delay between steps while auto-playing
pub const AUTOPLAY_INTERVAL: Duration = Duration::from_millis(120);

/// The main application state
pub struct App {
    /// Playback over the trace of the loaded source
    pub playback: Playback,

    /// The source code that produced the trace
    pub source_code: String,

    /// Title of the chart pane (template or file name)
    pub title: String,

    pub source_scroll: SourceScrollState,

    /// Whether the app should quit
    pub should_quit: bool,

    /// Status message to display
    pub status_message: String,

    /// Execution failed; the message is the error
    pub is_error: bool,

    /// Last time a step was taken in play mode
    pub last_play_time: Instant,

    /// Last time space was pressed (for debouncing)
    pub last_space_press: Instant,
}

impl App {
    pub fn new(playback: Playback, source_code: String, title: String) -> Self {
        let status_message = if playback.trace().is_empty() {
            "Nothing to play".to_string()
        } else {
            "Ready!".to_string()
        };
        App {
            playback,
            source_code,
            title,
            source_scroll: SourceScrollState::default(),
            should_quit: false,
            status_message,
            is_error: false,
            last_play_time: Instant::now(),
            last_space_press: Instant::now()
                .checked_sub(Duration::from_secs(1))
                .unwrap_or_else(Instant::now),
        }
    }

    /// App showing an execution error instead of a trace
    pub fn with_error(mut self, message: String) -> Self {
        self.status_message = message;
        self.is_error = true;
        self
    }

    /// Run the TUI application
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            if self.playback.is_playing() && self.last_play_time.elapsed() >= AUTOPLAY_INTERVAL {
                self.playback.step_forward();
                if !self.playback.is_playing() {
                    self.status_message = "Playback complete".to_string();
                }
                self.last_play_time = Instant::now();
            }

            // Poll with a timeout so auto-play keeps running without input
            if event::poll(Duration::from_millis(20))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }
        }

        Ok(())
    }

    fn render(&mut self, frame: &mut Frame) {
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(frame.area());

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(main_chunks[0]);

        // Left column: Bars (top) | Explanation (bottom)
        let left_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(7)])
            .split(columns[0]);

        // Right column: Source (top) | Call stack (bottom)
        let right_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
            .split(columns[1]);

        let event = self.playback.current_event();

        panes::render_bars_pane(
            frame,
            left_rows[0],
            &self.title,
            self.playback.snapshot(),
            event,
            self.playback.is_fully_processed(),
        );

        let explanation = explain(event, self.playback.snapshot());
        panes::render_explain_pane(frame, left_rows[1], &explanation);

        panes::render_source_pane(
            frame,
            right_rows[0],
            "Source",
            &self.source_code,
            self.playback.active_line(),
            &mut self.source_scroll,
        );

        let call_stack = event.map(|e| e.call_stack.as_slice()).unwrap_or_default();
        panes::render_stack_pane(frame, right_rows[1], call_stack);

        panes::render_status_bar(
            frame,
            main_chunks[1],
            StatusRenderData {
                message: &self.status_message,
                cursor: self.playback.cursor(),
                total: self.playback.trace().len(),
                kind: event.map(|e| e.kind),
                stats: event.map(|e| e.stats).unwrap_or(Stats::default()),
                is_playing: self.playback.is_playing(),
                is_error: self.is_error,
            },
        );
    }

    fn handle_key_event(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Left => {
                self.playback.set_playing(false);
                if self.playback.step_backward() {
                    self.status_message = "Stepped backward".to_string();
                } else {
                    self.status_message = "At start".to_string();
                }
            }
            KeyCode::Right => {
                self.playback.set_playing(false);
                if self.playback.step_forward() {
                    self.status_message = "Stepped forward".to_string();
                } else {
                    self.status_message = "At end".to_string();
                }
            }
            KeyCode::Up => {
                if let Some(row) = self.source_scroll.target_line_row {
                    self.source_scroll.target_line_row = Some(row.saturating_add(1));
                }
            }
            KeyCode::Down => {
                if let Some(row) = self.source_scroll.target_line_row {
                    self.source_scroll.target_line_row = Some(row.saturating_sub(1));
                }
            }
            KeyCode::Char(' ') => {
                // Toggle auto-play (with 200ms debounce to prevent key repeat spam)
                if self.last_space_press.elapsed() >= Duration::from_millis(200) {
                    self.last_space_press = Instant::now();
                    let playing = !self.playback.is_playing();
                    if playing && self.playback.is_fully_processed() {
                        self.playback.reset();
                    }
                    self.playback.set_playing(playing);
                    self.status_message = if playing { "Playing..." } else { "Paused" }.to_string();
                }
            }
            KeyCode::Enter => {
                self.playback.set_playing(false);
                while self.playback.step_forward() {}
                self.status_message = "Jumped to end".to_string();
            }
            KeyCode::Char('r') | KeyCode::Backspace => {
                self.playback.reset();
                self.status_message = "Reset".to_string();
            }
            _ => {}
        }
    }
}
