//! # Flash Messages
//!
//! `SessionState::flash_messages` only ever grows. The tracker remembers
//! when each message first appeared and the component shows the ones still
//! inside their display window, newest last.

use std::time::{Duration, Instant};

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::{Clear, Paragraph};

use crate::tui::component::Component;

/// Remembers when each flash message was first seen.
#[derive(Debug, Default)]
pub struct FlashTracker {
    shown_at: Vec<Instant>,
}

impl FlashTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamps every message added since the last call with `now`.
    pub fn sync(&mut self, messages: &[String], now: Instant) {
        while self.shown_at.len() < messages.len() {
            self.shown_at.push(now);
        }
    }

    /// Messages still inside their `duration` window at `now`.
    pub fn visible<'a>(&self, messages: &'a [String], now: Instant, duration: Duration) -> Vec<&'a str> {
        messages
            .iter()
            .zip(&self.shown_at)
            .filter(|(_, at)| now.saturating_duration_since(**at) < duration)
            .map(|(m, _)| m.as_str())
            .collect()
    }

    /// True while any message is on screen, so the loop keeps redrawing.
    pub fn any_visible(&self, now: Instant, duration: Duration) -> bool {
        self.shown_at
            .iter()
            .any(|at| now.saturating_duration_since(*at) < duration)
    }
}

/// Stateless render of the currently visible messages.
pub struct FlashMessages<'a> {
    pub messages: Vec<&'a str>,
}

impl FlashMessages<'_> {
    /// Rows needed to show every message.
    pub fn height(&self) -> u16 {
        self.messages.len() as u16
    }
}

impl Component for FlashMessages<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        if self.messages.is_empty() {
            return;
        }
        let style = Style::default().fg(Color::Black).bg(Color::Green);
        let lines: Vec<Line> = self
            .messages
            .iter()
            .map(|m| Line::styled(format!(" {m} "), style))
            .collect();
        frame.render_widget(Clear, area);
        frame.render_widget(Paragraph::new(lines), area);
    }
}
