//! # Search Overlay
//!
//! Full-screen overlay opened with Ctrl+F. Typing restarts a debounce
//! timer; once the user pauses, the event loop sends the search. Results
//! reuse `PostListState`, whose `request` handle cancels a stale search
//! when a newer one starts or the overlay closes.

use std::time::{Duration, Instant};

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Position, Rect};
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::tui::component::{EventHandler, text_end_x};
use crate::tui::components::post_list::{PostList, PostListEvent, PostListState};
use crate::tui::event::TuiEvent;

#[derive(Debug, PartialEq, Eq)]
pub enum SearchEvent {
    Close,
    Open(String),
}

#[derive(Debug)]
pub struct SearchState {
    pub term: String,
    /// Last keystroke; `None` once the pending term has been sent.
    pub edited_at: Option<Instant>,
    /// Term whose results are (or will be) in `results`.
    pub searched_term: Option<String>,
    pub results: PostListState,
}

impl Default for SearchState {
    fn default() -> Self {
        Self::new()
    }
}

fn idle_results() -> PostListState {
    let mut results = PostListState::loading();
    results.is_loading = false;
    results
}

impl SearchState {
    pub fn new() -> Self {
        Self {
            term: String::new(),
            edited_at: None,
            searched_term: None,
            results: idle_results(),
        }
    }

    fn edited(&mut self, now: Instant) {
        self.edited_at = Some(now);
    }

    /// Returns the term to search for once `debounce` has passed since the
    /// last edit, and marks it as sent. Blank terms are never sent.
    pub fn take_due(&mut self, now: Instant, debounce: Duration) -> Option<String> {
        let edited_at = self.edited_at?;
        if now.saturating_duration_since(edited_at) < debounce {
            return None;
        }
        self.edited_at = None;
        let term = self.term.trim().to_string();
        if term.is_empty() {
            self.results = idle_results();
            self.searched_term = None;
            return None;
        }
        self.searched_term = Some(term.clone());
        self.results.is_loading = true;
        Some(term)
    }

    /// True while a keystroke is waiting out the debounce.
    pub fn is_debouncing(&self) -> bool {
        self.edited_at.is_some()
    }
}

impl EventHandler for SearchState {
    type Event = SearchEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<SearchEvent> {
        match event {
            TuiEvent::Escape => Some(SearchEvent::Close),
            TuiEvent::InputChar(c) => {
                self.term.push(*c);
                self.edited(Instant::now());
                None
            }
            TuiEvent::Paste(text) => {
                self.term
                    .push_str(&text.chars().filter(|c| !c.is_control()).collect::<String>());
                self.edited(Instant::now());
                None
            }
            TuiEvent::Backspace => {
                if self.term.pop().is_some() {
                    self.edited(Instant::now());
                }
                None
            }
            TuiEvent::CursorUp | TuiEvent::CursorDown | TuiEvent::Submit => self
                .results
                .handle_event(event)
                .map(|PostListEvent::Open(id)| SearchEvent::Open(id)),
            _ => None,
        }
    }
}

/// Transient render wrapper for the overlay.
pub struct SearchOverlay<'a> {
    state: &'a mut SearchState,
}

impl<'a> SearchOverlay<'a> {
    pub fn new(state: &'a mut SearchState) -> Self {
        Self { state }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        frame.render_widget(Clear, area);
        let [input_area, results_area] =
            Layout::vertical([Constraint::Length(3), Constraint::Min(0)]).areas(area);

        let input = Paragraph::new(self.state.term.as_str()).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Search ")
                .title_bottom(" Esc close · ↑↓ select · Enter open "),
        );
        frame.render_widget(input, input_area);

        let cursor_x = text_end_x(input_area.x.saturating_add(1), &self.state.term);
        if cursor_x < input_area.right().saturating_sub(1) {
            frame.set_cursor_position(Position::new(cursor_x, input_area.y.saturating_add(1)));
        }

        let title = match &self.state.searched_term {
            Some(term) => format!("Results for \"{term}\""),
            None => "Results".to_string(),
        };
        let empty = if self.state.searched_term.is_some() {
            "No results found."
        } else {
            "Type to search posts."
        };
        PostList::new(&mut self.state.results, title)
            .empty_text(empty)
            .render(frame, results_area);
    }
}
