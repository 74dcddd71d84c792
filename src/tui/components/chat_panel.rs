//! # Chat Panel
//!
//! Side panel toggled with Ctrl+T. Holds the messages composed this
//! session; there is no chat transport, so the log is local.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::tui::component::{EventHandler, text_end_x};
use crate::tui::event::TuiEvent;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatLine {
    pub username: String,
    pub text: String,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ChatEvent {
    Close,
    Send(String),
}

#[derive(Debug, Default)]
pub struct ChatPanelState {
    pub draft: String,
    pub log: Vec<ChatLine>,
}

impl ChatPanelState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, username: &str, text: String) {
        self.log.push(ChatLine {
            username: username.to_string(),
            text,
        });
    }
}

impl EventHandler for ChatPanelState {
    type Event = ChatEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<ChatEvent> {
        match event {
            TuiEvent::Escape => Some(ChatEvent::Close),
            TuiEvent::InputChar(c) => {
                self.draft.push(*c);
                None
            }
            TuiEvent::Paste(text) => {
                self.draft
                    .push_str(&text.chars().filter(|c| !c.is_control()).collect::<String>());
                None
            }
            TuiEvent::Backspace => {
                self.draft.pop();
                None
            }
            TuiEvent::Submit => {
                let text = self.draft.trim().to_string();
                self.draft.clear();
                (!text.is_empty()).then_some(ChatEvent::Send(text))
            }
            _ => None,
        }
    }
}

pub struct ChatPanel<'a> {
    state: &'a ChatPanelState,
}

impl<'a> ChatPanel<'a> {
    pub fn new(state: &'a ChatPanelState) -> Self {
        Self { state }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        frame.render_widget(Clear, area);
        let [log_area, input_area] =
            Layout::vertical([Constraint::Min(0), Constraint::Length(3)]).areas(area);

        let lines: Vec<Line> = self
            .state
            .log
            .iter()
            .map(|line| {
                Line::from(vec![
                    Span::styled(
                        format!("{}: ", line.username),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(line.text.clone()),
                ])
            })
            .collect();

        // Keep the newest messages in view
        let inner_height = log_area.height.saturating_sub(2) as usize;
        let skip = lines.len().saturating_sub(inner_height);
        let log = Paragraph::new(lines.into_iter().skip(skip).collect::<Vec<_>>())
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Magenta))
                    .title(" Chat ")
                    .title_bottom(" Esc close "),
            );
        frame.render_widget(log, log_area);

        let input = Paragraph::new(self.state.draft.as_str())
            .block(Block::default().borders(Borders::ALL).title(" Message "));
        frame.render_widget(input, input_area);

        let x = text_end_x(input_area.x.saturating_add(1), &self.state.draft);
        if x < input_area.right().saturating_sub(1) {
            frame.set_cursor_position(Position::new(x, input_area.y.saturating_add(1)));
        }
    }
}
