//! # Store
//!
//! Owns the live `SessionState` together with durable storage. Every
//! dispatch runs the pure reducer and then the persistence observer, so
//! callers never touch storage directly.

use crate::core::action::{Action, update};
use crate::core::persist::PersistObserver;
use crate::core::state::SessionState;
use crate::core::storage::ClientStorage;

pub struct Store {
    state: SessionState,
    storage: Box<dyn ClientStorage + Send>,
    observer: PersistObserver,
}

impl Store {
    /// Builds the startup state from `storage` and reconciles it once.
    pub fn open(mut storage: Box<dyn ClientStorage + Send>) -> Self {
        let state = SessionState::from_storage(&*storage);
        let mut observer = PersistObserver::new();
        observer.observe(&state, &mut *storage);
        Self {
            state,
            storage,
            observer,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn dispatch(&mut self, action: Action) {
        let current = std::mem::take(&mut self.state);
        self.state = update(current, action);
        self.observer.observe(&self.state, &mut *self.storage);
    }

    pub fn storage(&self) -> &dyn ClientStorage {
        &*self.storage
    }
}
