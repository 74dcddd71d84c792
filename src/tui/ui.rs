use std::time::Instant;

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::Paragraph;

use crate::tui::app::{App, EditorMode, View};
use crate::tui::component::Component;
use crate::tui::components::{
    ChatPanel, FlashMessages, Header, LoginForm, PostEditor, PostList, PostView, SearchOverlay,
};

const CHAT_WIDTH: u16 = 40;
const LOGIN_WIDTH: u16 = 44;

pub fn draw_ui(frame: &mut Frame, app: &mut App) {
    use Constraint::{Length, Min};

    let now = Instant::now();
    let state = app.store.state();
    let messages = app.flash.visible(
        &state.flash_messages,
        now,
        app.timings.flash_duration,
    );
    let mut flash = FlashMessages { messages };

    let [header_area, flash_area, body_area] =
        Layout::vertical([Length(1), Length(flash.height()), Min(0)]).areas(frame.area());

    let username = state.current_user().map(|u| u.username.clone());
    let mut header = Header::new(username.clone(), state.unread_chat_count);
    header.render(frame, header_area);
    flash.render(frame, flash_area);

    let show_chat = state.is_chat_open && state.logged_in;
    let (main_area, chat_area) = if show_chat {
        let [main, chat] = Layout::horizontal([Min(0), Length(CHAT_WIDTH)]).areas(body_area);
        (main, Some(chat))
    } else {
        (body_area, None)
    };

    match &mut app.view {
        View::Guest(form) => draw_guest(frame, main_area, form),
        View::Feed(posts) => PostList::new(posts, "Your feed")
            .empty_text("Your feed is empty. Follow people to see their posts.")
            .render(frame, main_area),
        View::Profile { username, posts } => {
            PostList::new(posts, format!("{username}'s posts"))
                .hide_author()
                .empty_text("No posts yet.")
                .render(frame, main_area)
        }
        View::Post(post) => {
            let own = post
                .post
                .as_ref()
                .is_some_and(|p| username.as_deref() == Some(p.author.username.as_str()));
            PostView::new(post).editable(own).render(frame, main_area)
        }
        View::Editor { mode, state } => {
            let heading = match mode {
                EditorMode::Create => "New post",
                EditorMode::Edit(_) => "Edit post",
            };
            PostEditor::new(state, heading).render(frame, main_area)
        }
    }

    if let Some(area) = chat_area {
        ChatPanel::new(&app.chat).render(frame, area);
    }

    // Drawn last so its cursor wins over the view underneath
    if let Some(search) = app.search.as_mut() {
        SearchOverlay::new(search).render(frame, main_area);
    }
}

fn draw_guest(frame: &mut Frame, area: Rect, form: &mut LoginForm) {
    use Constraint::{Length, Min};

    let [_, welcome_area, form_area, _] =
        Layout::vertical([Min(0), Length(3), Length(7), Min(0)]).areas(area);

    let welcome = Paragraph::new(vec![
        Line::styled(
            "Welcome to PostsApp",
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Line::styled(
            "Sign in to see the feed from people you follow.",
            Style::default().fg(Color::DarkGray),
        ),
    ])
    .alignment(Alignment::Center);
    frame.render_widget(welcome, welcome_area);

    form.render(frame, centered_columns(form_area, LOGIN_WIDTH));
}

/// Horizontally centres a column of `width` inside `area`.
fn centered_columns(area: Rect, width: u16) -> Rect {
    let width = width.min(area.width);
    Rect {
        x: area.x + (area.width - width) / 2,
        width,
        ..area
    }
}
