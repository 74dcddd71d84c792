//! # Startup Token Check
//!
//! A stored token may have expired while the client was closed. Once at
//! startup the token is posted to `/checkToken`; a falsy answer signs the
//! user out with a flash message. Errors and cancellation are logged only.
//!
//! The rejection is reported as a `TokenRejected` carrying the token that
//! was checked. It only turns into actions while that token is still the
//! signed-in one, so a slow answer cannot sign out a later session.

use std::sync::Arc;
use std::sync::mpsc::Sender;

use log::{debug, info, warn};

use crate::api::{CancelHandle, PostsBackend, spawn_cancellable};
use crate::core::action::{Action, SESSION_EXPIRED_MESSAGE};
use crate::core::state::SessionState;

/// The backend rejected `token` at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRejected {
    pub token: String,
}

impl TokenRejected {
    /// Actions to dispatch against `state`: the expired-session pair if
    /// `state` is still signed in with the rejected token, otherwise none.
    pub fn actions_for(&self, state: &SessionState) -> Vec<Action> {
        match state.current_user() {
            Some(user) if user.token == self.token => expired_session_actions().to_vec(),
            _ => {
                debug!("Ignoring token rejection: session changed since the check");
                Vec::new()
            }
        }
    }
}

/// Spawns the check if `state` is logged in. Returns `None` otherwise.
///
/// The result goes through `sender`; cancelling the returned handle before
/// the backend answers suppresses it.
pub fn spawn_token_check<A>(
    backend: Arc<dyn PostsBackend>,
    state: &SessionState,
    sender: Sender<A>,
) -> Option<CancelHandle>
where
    A: From<TokenRejected> + Send + 'static,
{
    let user = state.current_user()?;
    let token = user.token.clone();
    info!("Validating stored token for {}", user.username);

    let handle = spawn_cancellable(
        "checkToken",
        async move {
            let result = backend.check_token(&token).await;
            (token, result)
        },
        move |(token, result)| match result {
            Ok(true) => info!("Stored token is still valid"),
            Ok(false) => {
                info!("Stored token rejected, signing out");
                if sender.send(A::from(TokenRejected { token })).is_err() {
                    warn!("Failed to deliver token check result: receiver dropped");
                }
            }
            Err(e) => warn!("There was a problem checking the stored token: {}", e),
        },
    );
    Some(handle)
}

/// The dispatches that follow a rejected token, in order.
pub fn expired_session_actions() -> [Action; 2] {
    [
        Action::Logout,
        Action::AddFlashMessage(SESSION_EXPIRED_MESSAGE.to_string()),
    ]
}
