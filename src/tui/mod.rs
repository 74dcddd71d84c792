//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! and translates keyboard events into session actions and navigation.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Redraw Strategy
//!
//! The event loop uses conditional redraw to avoid unnecessary work:
//!
//! - **Animating** (requests in flight, flash messages on screen, search
//!   debounce running): wakes every ~100ms so timers expire on time.
//! - **Idle**: sleeps up to 500ms, only redraws on events, background
//!   results, or terminal resize.

pub mod app;
pub mod component;
pub mod components;
pub mod event;
pub mod markdown;
mod ui;

use log::{debug, info};
use std::io::stdout;
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, EnableBracketedPaste, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;

use crate::api::{HttpBackend, PostsBackend};
use crate::core::config::ResolvedConfig;
use crate::core::storage::FileStorage;
use crate::core::store::Store;
use crate::tui::app::{App, AppMessage, Timings};
use crate::tui::event::{poll_event_immediate, poll_event_timeout};

const ANIMATING_POLL: Duration = Duration::from_millis(100);
const IDLE_POLL: Duration = Duration::from_millis(500);

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        // Kitty keyboard protocol is ignored by terminals that lack it
        execute!(
            stdout(),
            EnableBracketedPaste,
            Show,
            SetCursorStyle::SteadyBlock,
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )?;
        info!("Terminal modes enabled (bracketed paste, steady block cursor, keyboard enhancement)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            PopKeyboardEnhancementFlags,
            DisableBracketedPaste,
            Hide
        );
    }
}

pub fn run(config: ResolvedConfig) -> std::io::Result<()> {
    info!("Backend: {}", config.backend_url);
    let backend: Arc<dyn PostsBackend> = Arc::new(HttpBackend::new(
        config.backend_url.clone(),
        config.request_timeout,
    ));
    let storage = FileStorage::open(&config.storage_path)?;
    let store = Store::open(Box::new(storage));

    // Channel for results from background requests
    let (tx, rx) = mpsc::channel::<AppMessage>();

    let mut app = App::new(
        store,
        backend,
        tx,
        Timings {
            flash_duration: config.flash_duration,
            search_debounce: config.search_debounce,
        },
    );
    app.start_token_check();

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new();
    let mut needs_redraw = true;

    loop {
        let now = Instant::now();
        let animating = app.is_animating(now);
        if animating {
            needs_redraw = true;
        }

        if needs_redraw {
            terminal.draw(|f| ui::draw_ui(f, &mut app))?;
            needs_redraw = false;
        }

        let timeout = if animating { ANIMATING_POLL } else { IDLE_POLL };
        let first_event = poll_event_timeout(timeout);
        if first_event.is_some() {
            needs_redraw = true;
        }

        // Drain every pending event before the next draw
        let mut should_quit = false;
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            if app.handle_event(event) {
                should_quit = true;
                break;
            }
        }
        if should_quit {
            info!("Quit requested");
            break;
        }

        while let Ok(message) = rx.try_recv() {
            needs_redraw = true;
            debug!("Event loop received: {:?}", message);
            app.handle_message(message);
        }

        app.tick(Instant::now());
    }

    ratatui::restore();
    Ok(())
}
