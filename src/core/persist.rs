//! # Persistence Observer
//!
//! Mirrors the credential fields of `SessionState` into `ClientStorage`.
//! Runs after every dispatch but only writes when `logged_in` changes
//! (and once on the first run, to reconcile whatever was on disk).

use log::{info, warn};

use crate::core::state::SessionState;
use crate::core::storage::{AVATAR_KEY, ClientStorage, TOKEN_KEY, USERNAME_KEY};

#[derive(Debug, Default)]
pub struct PersistObserver {
    last_logged_in: Option<bool>,
}

impl PersistObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when storage was written.
    ///
    /// A failed write leaves the transition unrecorded, so the next call
    /// tries again.
    pub fn observe(&mut self, state: &SessionState, storage: &mut dyn ClientStorage) -> bool {
        if self.last_logged_in == Some(state.logged_in) {
            return false;
        }

        let result = if state.logged_in {
            info!("Persisting credentials for {}", state.user.username);
            storage
                .set(USERNAME_KEY, &state.user.username)
                .and_then(|_| storage.set(AVATAR_KEY, &state.user.avatar))
                .and_then(|_| storage.set(TOKEN_KEY, &state.user.token))
        } else {
            info!("Clearing stored credentials");
            storage
                .remove(USERNAME_KEY)
                .and_then(|_| storage.remove(AVATAR_KEY))
                .and_then(|_| storage.remove(TOKEN_KEY))
        };

        match result {
            Ok(()) => {
                self.last_logged_in = Some(state.logged_in);
                true
            }
            Err(e) => {
                warn!("Failed to sync credentials to storage: {}", e);
                false
            }
        }
    }
}
