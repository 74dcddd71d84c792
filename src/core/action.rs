//! # Actions
//!
//! Everything that can change the session becomes an `Action`.
//! User signs in? That's `Action::Login(user)`.
//! Stored token rejected at startup? That's `Action::Logout` followed by
//! `Action::AddFlashMessage(..)`.
//!
//! The `update()` function takes the current state and an action,
//! then returns the new state. No side effects here. Storage and network
//! I/O happen in observers and the TUI loop.
//!
//! ```text
//! State + Action  →  update()  →  New State
//! ```
//!
//! This makes everything testable: `assert_eq!(update(state, action), expected)`.

use log::debug;

use crate::core::state::{SessionState, User};

/// Flash message shown when the stored token no longer validates.
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please log in again";
pub const LOGIN_SUCCESS_MESSAGE: &str = "You have successfully logged in.";
pub const LOGIN_FAILED_MESSAGE: &str = "Invalid username / password.";
pub const LOGOUT_MESSAGE: &str = "You have successfully logged out.";
pub const POST_CREATED_MESSAGE: &str = "Congrats, you created a new post.";
pub const POST_UPDATED_MESSAGE: &str = "Post was updated.";
pub const EDIT_FORBIDDEN_MESSAGE: &str = "You do not have permission to edit that post.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Login(User),
    /// User fields are left as they were; they are ignored while logged out.
    Logout,
    AddFlashMessage(String),
    OpenSearch,
    CloseSearch,
    ToggleChat,
    CloseChat,
    IncrementUnreadChatCount,
    ClearUnreadChatCount,
}

/// Pure state transition. Total over every action.
pub fn update(mut state: SessionState, action: Action) -> SessionState {
    debug!("update: {:?}", action);
    match action {
        Action::Login(user) => {
            state.logged_in = true;
            state.user = user;
        }
        Action::Logout => {
            state.logged_in = false;
        }
        Action::AddFlashMessage(value) => {
            state.flash_messages.push(value);
        }
        Action::OpenSearch => {
            state.is_search_open = true;
        }
        Action::CloseSearch => {
            state.is_search_open = false;
        }
        Action::ToggleChat => {
            state.is_chat_open = !state.is_chat_open;
        }
        Action::CloseChat => {
            state.is_chat_open = false;
        }
        Action::IncrementUnreadChatCount => {
            state.unread_chat_count = state.unread_chat_count.saturating_add(1);
        }
        Action::ClearUnreadChatCount => {
            state.unread_chat_count = 0;
        }
    }
    state
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_actions() -> Vec<Action> {
        vec![
            Action::Login(User::new("a", "b", "c")),
            Action::Logout,
            Action::AddFlashMessage("x".to_string()),
            Action::OpenSearch,
            Action::CloseSearch,
            Action::ToggleChat,
            Action::CloseChat,
            Action::IncrementUnreadChatCount,
            Action::ClearUnreadChatCount,
        ]
    }

    #[test]
    fn test_login_sets_user() {
        let state = update(SessionState::default(), Action::Login(User::new("a", "b", "c")));
        assert!(state.logged_in);
        assert_eq!(state.user, User::new("a", "b", "c"));
    }

    #[test]
    fn test_logout_keeps_stale_user() {
        let state = update(SessionState::default(), Action::Login(User::new("a", "b", "c")));
        let state = update(state, Action::Logout);
        assert!(!state.logged_in);
        assert_eq!(state.user.username, "a");
        assert!(state.current_user().is_none());
    }

    #[test]
    fn test_add_flash_message_appends_in_order() {
        let mut state = SessionState::default();
        state.flash_messages = vec!["first".to_string(), "second".to_string()];
        let state = update(state, Action::AddFlashMessage("x".to_string()));
        assert_eq!(state.flash_messages, vec!["first", "second", "x"]);
    }

    #[test]
    fn test_search_open_close() {
        let state = update(SessionState::default(), Action::OpenSearch);
        assert!(state.is_search_open);
        let state = update(state, Action::OpenSearch);
        assert!(state.is_search_open);
        let state = update(state, Action::CloseSearch);
        assert!(!state.is_search_open);
    }

    #[test]
    fn test_toggle_chat_twice_restores() {
        for start in [false, true] {
            let state = SessionState {
                is_chat_open: start,
                ..Default::default()
            };
            let once = update(state, Action::ToggleChat);
            assert_eq!(once.is_chat_open, !start);
            let twice = update(once, Action::ToggleChat);
            assert_eq!(twice.is_chat_open, start);
        }
    }

    #[test]
    fn test_close_chat() {
        let state = update(SessionState::default(), Action::ToggleChat);
        let state = update(state, Action::CloseChat);
        assert!(!state.is_chat_open);
        let state = update(state, Action::CloseChat);
        assert!(!state.is_chat_open);
    }

    #[test]
    fn test_increment_then_clear_is_zero() {
        for start in [0, 1, 7, u32::MAX - 1, u32::MAX] {
            let state = SessionState {
                unread_chat_count: start,
                ..Default::default()
            };
            let state = update(state, Action::IncrementUnreadChatCount);
            let state = update(state, Action::ClearUnreadChatCount);
            assert_eq!(state.unread_chat_count, 0);
        }
    }

    #[test]
    fn test_increment_saturates() {
        let state = SessionState {
            unread_chat_count: u32::MAX,
            ..Default::default()
        };
        let state = update(state, Action::IncrementUnreadChatCount);
        assert_eq!(state.unread_chat_count, u32::MAX);
    }

    #[test]
    fn test_every_three_action_sequence_is_total() {
        // 9^3 sequences, each checked against an independently tracked model
        let actions = all_actions();
        for a in &actions {
            for b in &actions {
                for c in &actions {
                    let mut state = SessionState::default();
                    let mut expected_count: u32 = 0;
                    let mut expected_flashes = 0usize;
                    for action in [a, b, c] {
                        match action {
                            Action::IncrementUnreadChatCount => expected_count += 1,
                            Action::ClearUnreadChatCount => expected_count = 0,
                            Action::AddFlashMessage(_) => expected_flashes += 1,
                            _ => {}
                        }
                        state = update(state, action.clone());
                    }
                    assert_eq!(state.unread_chat_count, expected_count);
                    assert_eq!(state.flash_messages.len(), expected_flashes);
                }
            }
        }
    }
}
