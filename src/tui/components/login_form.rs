//! # Login Form
//!
//! Username/password form shown on the guest home screen. Tab switches
//! fields, Enter submits. While a login request is in flight the form is
//! locked and ignores input.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Position, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::api::CancelHandle;
use crate::tui::component::{Component, EventHandler, text_end_x};
use crate::tui::event::TuiEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Username,
    Password,
}

#[derive(Debug, PartialEq, Eq)]
pub enum LoginEvent {
    Submit { username: String, password: String },
}

#[derive(Debug)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub focus: Field,
    /// In-flight login request; dropping it cancels the request.
    pub pending: Option<CancelHandle>,
}

impl Default for LoginForm {
    fn default() -> Self {
        Self::new()
    }
}

impl LoginForm {
    pub fn new() -> Self {
        Self {
            username: String::new(),
            password: String::new(),
            focus: Field::Username,
            pending: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            Field::Username => &mut self.username,
            Field::Password => &mut self.password,
        }
    }
}

impl EventHandler for LoginForm {
    type Event = LoginEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<LoginEvent> {
        if self.is_pending() {
            return None;
        }
        match event {
            TuiEvent::Tab => {
                self.focus = match self.focus {
                    Field::Username => Field::Password,
                    Field::Password => Field::Username,
                };
                None
            }
            TuiEvent::InputChar(c) => {
                self.focused_mut().push(*c);
                None
            }
            TuiEvent::Paste(text) => {
                let single_line: String = text.chars().filter(|c| !c.is_control()).collect();
                self.focused_mut().push_str(&single_line);
                None
            }
            TuiEvent::Backspace => {
                self.focused_mut().pop();
                None
            }
            TuiEvent::Submit => {
                if self.focus == Field::Username {
                    self.focus = Field::Password;
                    return None;
                }
                if self.username.trim().is_empty() || self.password.is_empty() {
                    return None;
                }
                Some(LoginEvent::Submit {
                    username: self.username.trim().to_string(),
                    password: self.password.clone(),
                })
            }
            _ => None,
        }
    }
}

impl Component for LoginForm {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let [username_area, password_area, status_area] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .areas(area);

        let field_block = |title: &'static str, focused: bool| {
            let color = if focused { Color::Cyan } else { Color::DarkGray };
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color))
                .title(title)
        };

        let masked = "*".repeat(self.password.chars().count());
        frame.render_widget(
            Paragraph::new(self.username.as_str())
                .block(field_block(" Username ", self.focus == Field::Username)),
            username_area,
        );
        frame.render_widget(
            Paragraph::new(masked.as_str())
                .block(field_block(" Password ", self.focus == Field::Password)),
            password_area,
        );

        let status = if self.is_pending() {
            Line::styled("Signing in...", Style::default().fg(Color::Yellow))
        } else {
            Line::styled("Tab switch field · Enter sign in", Style::default().fg(Color::DarkGray))
        };
        frame.render_widget(status, status_area);

        if !self.is_pending() {
            let (text, field_area) = match self.focus {
                Field::Username => (self.username.as_str(), username_area),
                Field::Password => (masked.as_str(), password_area),
            };
            let x = text_end_x(field_area.x.saturating_add(1), text);
            if x < field_area.right().saturating_sub(1) {
                frame.set_cursor_position(Position::new(x, field_area.y.saturating_add(1)));
            }
        }
    }
}
