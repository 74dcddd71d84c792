use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// TUI-specific input events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TuiEvent {
    // Global shortcuts (handled by the event loop)
    ForceQuit,  // Ctrl+C
    OpenSearch, // Ctrl+F
    ToggleChat, // Ctrl+T
    OwnProfile, // Ctrl+P
    GoHome,     // Ctrl+E
    SignOut,    // Ctrl+L
    NewPost,    // Ctrl+N
    Resize,

    // Routed to the focused component
    Escape,
    Submit,
    Save, // Ctrl+S
    Tab,
    InputChar(char),
    Paste(String),
    Backspace,
    CursorUp,
    CursorDown,
}

/// Poll for an event without blocking (returns immediately)
pub fn poll_event_immediate() -> Option<TuiEvent> {
    poll_event_timeout(std::time::Duration::ZERO)
}

/// Poll for an event, blocking up to `timeout`.
pub fn poll_event_timeout(timeout: std::time::Duration) -> Option<TuiEvent> {
    if !event::poll(timeout).unwrap_or(false) {
        return None;
    }
    match event::read().ok()? {
        Event::Key(key_event) => map_key(key_event),
        Event::Paste(data) => Some(TuiEvent::Paste(data)),
        Event::Resize(_, _) => Some(TuiEvent::Resize),
        _ => None,
    }
}

/// Translate a key press into a `TuiEvent`. Releases and repeats are ignored.
pub fn map_key(key_event: KeyEvent) -> Option<TuiEvent> {
    if key_event.kind != KeyEventKind::Press {
        return None;
    }
    log::debug!(
        "Key event: {:?} with modifiers {:?}",
        key_event.code,
        key_event.modifiers
    );
    match (key_event.modifiers, key_event.code) {
        (KeyModifiers::CONTROL, KeyCode::Char('c')) => Some(TuiEvent::ForceQuit),
        (KeyModifiers::CONTROL, KeyCode::Char('f')) => Some(TuiEvent::OpenSearch),
        (KeyModifiers::CONTROL, KeyCode::Char('t')) => Some(TuiEvent::ToggleChat),
        (KeyModifiers::CONTROL, KeyCode::Char('p')) => Some(TuiEvent::OwnProfile),
        (KeyModifiers::CONTROL, KeyCode::Char('e')) => Some(TuiEvent::GoHome),
        (KeyModifiers::CONTROL, KeyCode::Char('l')) => Some(TuiEvent::SignOut),
        (KeyModifiers::CONTROL, KeyCode::Char('n')) => Some(TuiEvent::NewPost),
        (KeyModifiers::CONTROL, KeyCode::Char('s')) => Some(TuiEvent::Save),
        (KeyModifiers::CONTROL, _) => None,
        (_, KeyCode::Char(c)) => Some(TuiEvent::InputChar(c)),
        (_, KeyCode::Backspace) => Some(TuiEvent::Backspace),
        (_, KeyCode::Enter) => Some(TuiEvent::Submit),
        (_, KeyCode::Tab) | (_, KeyCode::BackTab) => Some(TuiEvent::Tab),
        (_, KeyCode::Esc) => Some(TuiEvent::Escape),
        (_, KeyCode::Up) => Some(TuiEvent::CursorUp),
        (_, KeyCode::Down) => Some(TuiEvent::CursorDown),
        _ => None,
    }
}
