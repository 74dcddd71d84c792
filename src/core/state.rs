//! # Session State
//!
//! Client-side session and UI state for PostsApp. Domain data only -
//! view-specific presentation state lives in the `tui` module.
//!
//! ```text
//! SessionState
//! ├── logged_in: bool               // valid credential established
//! ├── user: User                    // username, avatar, token
//! ├── flash_messages: Vec<String>   // append-only notifications
//! ├── is_search_open: bool          // search overlay visible
//! ├── is_chat_open: bool            // chat panel visible
//! └── unread_chat_count: u32        // badge counter
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.
//! `user` is only meaningful while `logged_in` is true.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::storage::{AVATAR_KEY, ClientStorage, TOKEN_KEY, USERNAME_KEY};

/// Identity of the signed-in user, as returned by `POST /login`.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub avatar: String,
    pub token: String,
}

impl User {
    pub fn new(username: impl Into<String>, avatar: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            avatar: avatar.into(),
            token: token.into(),
        }
    }
}

// Tokens never reach the log file through `{:?}`.
impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("username", &self.username)
            .field("avatar", &self.avatar)
            .field("token", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub logged_in: bool,
    pub user: User,
    pub flash_messages: Vec<String>,
    pub is_search_open: bool,
    pub is_chat_open: bool,
    pub unread_chat_count: u32,
}

impl SessionState {
    /// Builds the startup state from durable client storage.
    ///
    /// Logged in only when the token, username and avatar are all present.
    /// A partial set starts logged out; the persistence observer clears the
    /// leftovers on its first run.
    pub fn from_storage(storage: &dyn ClientStorage) -> Self {
        let token = storage.get(TOKEN_KEY);
        let username = storage.get(USERNAME_KEY);
        let avatar = storage.get(AVATAR_KEY);

        match (username, avatar, token) {
            (Some(username), Some(avatar), Some(token)) => Self {
                logged_in: true,
                user: User {
                    username,
                    avatar,
                    token,
                },
                ..Self::default()
            },
            _ => Self::default(),
        }
    }

    /// The signed-in user, or `None` when logged out (stale fields hidden).
    pub fn current_user(&self) -> Option<&User> {
        self.logged_in.then_some(&self.user)
    }
}
