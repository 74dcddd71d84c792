//! # Single Post View
//!
//! Title, author line and markdown body of one post.

use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::api::{CancelHandle, Post};
use crate::tui::component::EventHandler;
use crate::tui::event::TuiEvent;
use crate::tui::markdown;

#[derive(Debug)]
pub struct PostViewState {
    pub id: String,
    /// `None` while loading, or after the fetch failed (`failed` set).
    pub post: Option<Post>,
    pub failed: bool,
    pub scroll: u16,
    pub request: Option<CancelHandle>,
}

impl PostViewState {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            post: None,
            failed: false,
            scroll: 0,
            request: None,
        }
    }

    pub fn set_post(&mut self, post: Post) {
        self.post = Some(post);
        self.request = None;
    }

    pub fn fail(&mut self) {
        self.failed = true;
        self.request = None;
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum PostViewEvent {
    OpenAuthor(String),
    /// Edit the loaded post; carries its author for the ownership check.
    Edit { author: String },
}

impl EventHandler for PostViewState {
    type Event = PostViewEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<PostViewEvent> {
        match event {
            TuiEvent::CursorUp => {
                self.scroll = self.scroll.saturating_sub(1);
                None
            }
            TuiEvent::CursorDown => {
                self.scroll = self.scroll.saturating_add(1);
                None
            }
            TuiEvent::Submit => self
                .post
                .as_ref()
                .filter(|p| !p.author.username.is_empty())
                .map(|p| PostViewEvent::OpenAuthor(p.author.username.clone())),
            TuiEvent::InputChar('e') => self.post.as_ref().map(|p| PostViewEvent::Edit {
                author: p.author.username.clone(),
            }),
            _ => None,
        }
    }
}

pub struct PostView<'a> {
    state: &'a PostViewState,
    editable: bool,
}

impl<'a> PostView<'a> {
    pub fn new(state: &'a PostViewState) -> Self {
        Self {
            state,
            editable: false,
        }
    }

    /// Advertise the edit key; set when the viewer wrote the post.
    pub fn editable(mut self, editable: bool) -> Self {
        self.editable = editable;
        self
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let hints = if self.editable {
            " ↑↓ scroll · Enter author profile · e edit · Esc back "
        } else {
            " ↑↓ scroll · Enter author profile · Esc back "
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title_bottom(hints);

        let Some(post) = &self.state.post else {
            let text = if self.state.failed {
                "This post could not be loaded."
            } else {
                "Loading..."
            };
            let paragraph = Paragraph::new(text)
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            frame.render_widget(paragraph, area);
            return;
        };

        let mut text = Text::from(vec![
            Line::styled(
                post.title.clone(),
                Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            ),
            Line::from(vec![
                Span::styled("Posted by ", Style::default().fg(Color::DarkGray)),
                Span::styled(post.author.username.clone(), Style::default().fg(Color::Cyan)),
                Span::styled(
                    format!(" on {}", post.formatted_date()),
                    Style::default().fg(Color::DarkGray),
                ),
            ]),
        ]);
        text.lines
            .extend(markdown::render(&post.body, Color::Reset).lines);

        let paragraph = Paragraph::new(text)
            .wrap(Wrap { trim: false })
            .scroll((self.state.scroll, 0))
            .block(block);
        frame.render_widget(paragraph, area);
    }
}
