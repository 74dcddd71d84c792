//! # Post List
//!
//! Selectable list of posts, used for the home feed, profile posts and
//! search results. Follows the persistent state + transient wrapper pattern:
//! `PostListState` lives in the owning view, `PostList` is built each frame.

use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use unicode_width::UnicodeWidthStr;

use crate::api::{CancelHandle, Post};
use crate::tui::component::EventHandler;
use crate::tui::event::TuiEvent;

#[derive(Debug)]
pub struct PostListState {
    pub posts: Vec<Post>,
    pub is_loading: bool,
    pub list_state: ListState,
    /// Fetch feeding this list; dropped (and so cancelled) with the view.
    pub request: Option<CancelHandle>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum PostListEvent {
    Open(String),
}

impl Default for PostListState {
    fn default() -> Self {
        Self::loading()
    }
}

impl PostListState {
    pub fn loading() -> Self {
        Self {
            posts: Vec::new(),
            is_loading: true,
            list_state: ListState::default(),
            request: None,
        }
    }

    pub fn set_posts(&mut self, posts: Vec<Post>) {
        self.is_loading = false;
        self.request = None;
        self.list_state.select(if posts.is_empty() { None } else { Some(0) });
        self.posts = posts;
    }

    /// Loading finished without results (request failed).
    pub fn fail(&mut self) {
        self.set_posts(Vec::new());
    }

    pub fn selected_post(&self) -> Option<&Post> {
        self.list_state.selected().and_then(|i| self.posts.get(i))
    }
}

impl EventHandler for PostListState {
    type Event = PostListEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<PostListEvent> {
        if self.posts.is_empty() {
            return None;
        }
        let last = self.posts.len() - 1;
        let current = self.list_state.selected().unwrap_or(0);
        match event {
            TuiEvent::CursorUp => {
                self.list_state.select(Some(current.saturating_sub(1)));
                None
            }
            TuiEvent::CursorDown => {
                self.list_state.select(Some((current + 1).min(last)));
                None
            }
            TuiEvent::Submit => self
                .selected_post()
                .map(|post| PostListEvent::Open(post.id.clone())),
            _ => None,
        }
    }
}

/// Transient render wrapper.
pub struct PostList<'a> {
    state: &'a mut PostListState,
    title: String,
    show_author: bool,
    empty_text: &'a str,
}

impl<'a> PostList<'a> {
    pub fn new(state: &'a mut PostListState, title: impl Into<String>) -> Self {
        Self {
            state,
            title: title.into(),
            show_author: true,
            empty_text: "No posts yet.",
        }
    }

    /// Profile lists omit the author since it is the profile owner.
    pub fn hide_author(mut self) -> Self {
        self.show_author = false;
        self
    }

    pub fn empty_text(mut self, text: &'a str) -> Self {
        self.empty_text = text;
        self
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(format!(" {} ", self.title));

        if self.state.is_loading || self.state.posts.is_empty() {
            let text = if self.state.is_loading {
                "Loading..."
            } else {
                self.empty_text
            };
            let paragraph = Paragraph::new(text)
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(paragraph, area);
            return;
        }

        let inner_width = area.width.saturating_sub(2) as usize;
        let items: Vec<ListItem> = self
            .state
            .posts
            .iter()
            .map(|post| ListItem::new(post_line(post, self.show_author, inner_width)))
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
        frame.render_stateful_widget(list, area, &mut self.state.list_state);
    }
}

/// `Title by author on 3/7/2024`, with the title truncated to fit.
fn post_line(post: &Post, show_author: bool, width: usize) -> Line<'static> {
    let mut meta = String::new();
    if show_author && !post.author.username.is_empty() {
        meta.push_str(&format!(" by {}", post.author.username));
    }
    let date = post.formatted_date();
    if !date.is_empty() {
        meta.push_str(&format!(" on {date}"));
    }
    let title_width = width.saturating_sub(meta.width());
    Line::from(vec![
        Span::styled(
            truncate_str(&post.title, title_width),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(meta, Style::default().fg(Color::DarkGray)),
    ])
}

/// Truncate to `max_width` display columns, adding "..." if needed.
fn truncate_str(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    if max_width <= 3 {
        return ".".repeat(max_width);
    }
    let mut out = String::new();
    for c in s.chars() {
        let next = format!("{out}{c}");
        if next.width() > max_width - 3 {
            break;
        }
        out = next;
    }
    format!("{out}...")
}
