//! # Header Component
//!
//! Top bar of every screen. Shows the app name and, depending on whether
//! the user is signed in, either the signed-in actions (search, chat with
//! unread badge, profile, sign out) or a prompt to sign in.
//!
//! Stateless: all data arrives as props.
//!
//! ```text
//! Signed in:  PostsApp | brad | ^F Search  ^T Chat (3)  ^N New post  ^P Profile  ^L Sign out
//! Signed out: PostsApp | Sign in below, or ^F to search
//! ```

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::tui::component::Component;

pub struct Header {
    /// Signed-in username; `None` renders the signed-out header.
    pub username: Option<String>,
    pub unread_chat_count: u32,
}

impl Header {
    pub fn new(username: Option<String>, unread_chat_count: u32) -> Self {
        Self {
            username,
            unread_chat_count,
        }
    }
}

/// Badge text for the chat shortcut: nothing at zero, `9+` past nine.
pub fn chat_badge(count: u32) -> Option<String> {
    match count {
        0 => None,
        1..=9 => Some(count.to_string()),
        _ => Some("9+".to_string()),
    }
}

impl Component for Header {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let brand = Style::default()
            .fg(Color::White)
            .bg(Color::Blue)
            .add_modifier(Modifier::BOLD);
        let hint = Style::default().fg(Color::Gray);
        let key = Style::default().fg(Color::Yellow);

        let mut spans = vec![Span::styled(" PostsApp ", brand), Span::raw(" ")];

        match &self.username {
            Some(username) => {
                spans.push(Span::styled(
                    username.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                ));
                spans.push(Span::styled(" | ", hint));
                spans.push(Span::styled("^F", key));
                spans.push(Span::styled(" Search  ", hint));
                spans.push(Span::styled("^T", key));
                spans.push(Span::styled(" Chat", hint));
                if let Some(badge) = chat_badge(self.unread_chat_count) {
                    spans.push(Span::styled(
                        format!(" ({badge})"),
                        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                    ));
                }
                spans.push(Span::styled("  ^N", key));
                spans.push(Span::styled(" New post  ", hint));
                spans.push(Span::styled("^P", key));
                spans.push(Span::styled(" Profile  ", hint));
                spans.push(Span::styled("^L", key));
                spans.push(Span::styled(" Sign out", hint));
            }
            None => {
                spans.push(Span::styled("Sign in below, or ", hint));
                spans.push(Span::styled("^F", key));
                spans.push(Span::styled(" to search", hint));
            }
        }

        frame.render_widget(Line::from(spans), area);
    }
}
