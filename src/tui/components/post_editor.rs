//! # Post Editor
//!
//! Title and body form used both to write a new post and to edit one of
//! the user's own posts. Tab switches fields, Enter in the body inserts a
//! line break, Ctrl+S saves.
//!
//! Editing starts with `loading` set while the post is fetched to prefill
//! the fields. Both the prefill fetch and the save request are held in
//! `request`, so leaving the editor cancels either.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Position, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::api::{CancelHandle, Post};
use crate::tui::component::{EventHandler, text_end_x};
use crate::tui::event::TuiEvent;

pub const MISSING_TITLE_MESSAGE: &str = "You must provide a title.";
pub const MISSING_BODY_MESSAGE: &str = "You must provide post content.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorField {
    Title,
    Body,
}

#[derive(Debug, PartialEq, Eq)]
pub enum PostEditorEvent {
    Save { title: String, body: String },
}

#[derive(Debug)]
pub struct PostEditorState {
    pub title: String,
    pub body: String,
    pub focus: EditorField,
    /// Prefill in progress; input is ignored until it lands.
    pub loading: bool,
    /// Validation or backend error shown under the form.
    pub error: Option<String>,
    /// In-flight prefill or save; dropping it cancels the request.
    pub request: Option<CancelHandle>,
}

impl Default for PostEditorState {
    fn default() -> Self {
        Self::new()
    }
}

impl PostEditorState {
    pub fn new() -> Self {
        Self {
            title: String::new(),
            body: String::new(),
            focus: EditorField::Title,
            loading: false,
            error: None,
            request: None,
        }
    }

    /// An editor waiting for the post it will edit.
    pub fn loading() -> Self {
        Self {
            loading: true,
            ..Self::new()
        }
    }

    pub fn prefill(&mut self, post: Post) {
        self.title = post.title;
        self.body = post.body;
        self.loading = false;
        self.request = None;
    }

    pub fn is_saving(&self) -> bool {
        !self.loading && self.request.is_some()
    }

    /// A save request finished with `error`, or cleanly if `None`.
    pub fn save_finished(&mut self, error: Option<String>) {
        self.request = None;
        self.error = error;
    }

    fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            EditorField::Title => &mut self.title,
            EditorField::Body => &mut self.body,
        }
    }

    fn validate(&self) -> Result<(), &'static str> {
        if self.title.trim().is_empty() {
            Err(MISSING_TITLE_MESSAGE)
        } else if self.body.trim().is_empty() {
            Err(MISSING_BODY_MESSAGE)
        } else {
            Ok(())
        }
    }
}

impl EventHandler for PostEditorState {
    type Event = PostEditorEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<PostEditorEvent> {
        if self.loading || self.request.is_some() {
            return None;
        }
        match event {
            TuiEvent::Tab => {
                self.focus = match self.focus {
                    EditorField::Title => EditorField::Body,
                    EditorField::Body => EditorField::Title,
                };
                None
            }
            TuiEvent::Submit => {
                match self.focus {
                    EditorField::Title => self.focus = EditorField::Body,
                    EditorField::Body => self.body.push('\n'),
                }
                None
            }
            TuiEvent::InputChar(c) => {
                self.focused_mut().push(*c);
                None
            }
            TuiEvent::Paste(text) => {
                let pasted: String = match self.focus {
                    EditorField::Title => text.chars().filter(|c| !c.is_control()).collect(),
                    EditorField::Body => text
                        .replace("\r\n", "\n")
                        .chars()
                        .filter(|c| *c == '\n' || !c.is_control())
                        .collect(),
                };
                self.focused_mut().push_str(&pasted);
                None
            }
            TuiEvent::Backspace => {
                self.focused_mut().pop();
                None
            }
            TuiEvent::Save => match self.validate() {
                Ok(()) => {
                    self.error = None;
                    Some(PostEditorEvent::Save {
                        title: self.title.trim().to_string(),
                        body: self.body.clone(),
                    })
                }
                Err(message) => {
                    self.error = Some(message.to_string());
                    None
                }
            },
            _ => None,
        }
    }
}

fn wrap_options(width: u16) -> textwrap::Options<'static> {
    textwrap::Options::new(usize::from(width.max(1)))
        .break_words(true)
        .word_separator(textwrap::WordSeparator::AsciiSpace)
}

/// Body lines as drawn in a field `width` columns wide.
fn wrap_body(body: &str, width: u16) -> Vec<Line<'static>> {
    textwrap::wrap(body, wrap_options(width))
        .into_iter()
        .map(|line| Line::raw(line.into_owned()))
        .collect()
}

/// Row and column just past the end of `body`, relative to the field's
/// inner area.
fn body_cursor(body: &str, width: u16) -> (u16, u16) {
    let lines = textwrap::wrap(body, wrap_options(width));
    let mut row = lines.len().saturating_sub(1);
    // textwrap does not always emit the empty line after a trailing newline
    if body.ends_with('\n') && !lines.last().is_some_and(|l| l.is_empty()) {
        row += 1;
    }

    // Wrapping trims the spaces at the end of a line; the cursor sits after them
    let logical = body.rsplit('\n').next().unwrap_or("");
    let segments = textwrap::wrap(logical, wrap_options(width));
    let last = segments.last().map_or("", |s| s.trim_end());
    let trailing = logical.len() - logical.trim_end().len();
    let col = text_end_x(0, last).saturating_add(u16::try_from(trailing).unwrap_or(u16::MAX));

    (u16::try_from(row).unwrap_or(u16::MAX), col)
}

/// Transient render wrapper for the editor.
pub struct PostEditor<'a> {
    state: &'a PostEditorState,
    heading: String,
}

impl<'a> PostEditor<'a> {
    pub fn new(state: &'a PostEditorState, heading: impl Into<String>) -> Self {
        Self {
            state,
            heading: heading.into(),
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let [title_area, body_area, status_area] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .areas(area);

        let field_block = |title: String, focused: bool| {
            let color = if focused { Color::Cyan } else { Color::DarkGray };
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color))
                .title(title)
        };
        let title_focused = self.state.focus == EditorField::Title;

        frame.render_widget(
            Paragraph::new(self.state.title.as_str())
                .block(field_block(format!(" {} · Title ", self.heading), title_focused)),
            title_area,
        );
        // Scrolled so the end of the body, where typing happens, stays visible
        let body_width = body_area.width.saturating_sub(2);
        let body_height = body_area.height.saturating_sub(2);
        let (cursor_row, cursor_col) = body_cursor(&self.state.body, body_width);
        let scroll = cursor_row.saturating_sub(body_height.saturating_sub(1));
        frame.render_widget(
            Paragraph::new(wrap_body(&self.state.body, body_width))
                .scroll((scroll, 0))
                .block(field_block(" Body ".to_string(), !title_focused)),
            body_area,
        );

        let status = if self.state.loading {
            Line::styled("Loading...", Style::default().fg(Color::Yellow))
        } else if self.state.is_saving() {
            Line::styled("Saving...", Style::default().fg(Color::Yellow))
        } else if let Some(error) = &self.state.error {
            Line::styled(error.clone(), Style::default().fg(Color::Red))
        } else {
            Line::styled(
                "Tab switch field · ^S save · Esc cancel",
                Style::default().fg(Color::DarkGray),
            )
        };
        frame.render_widget(status, status_area);

        if self.state.loading || self.state.request.is_some() {
            return;
        }
        let (x, y, field_area) = if title_focused {
            let x = text_end_x(title_area.x.saturating_add(1), &self.state.title);
            (x, title_area.y.saturating_add(1), title_area)
        } else {
            let x = body_area.x.saturating_add(1).saturating_add(cursor_col);
            let y = body_area.y.saturating_add(1).saturating_add(cursor_row - scroll);
            (x, y, body_area)
        };
        if x < field_area.right().saturating_sub(1) && y < field_area.bottom().saturating_sub(1) {
            frame.set_cursor_position(Position::new(x, y));
        }
    }
}
