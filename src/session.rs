//! The process-wide session store.
//!
//! There is exactly one active session state for the whole app: either no one
//! is signed in (anonymous) or the household user is. Handlers publish
//! sign-in and sign-out transitions here, and interested parts of the app
//! (the budget book) subscribe to react to them. The auth cookie only proves
//! identity between requests; this store is the source of truth for whether
//! a session is active.

use std::sync::Arc;

use axum_extra::extract::PrivateCookieJar;
use tokio::sync::watch;

use crate::{auth::get_token, user::UserID};

/// The active session, when someone is signed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    /// The signed-in user.
    pub user_id: UserID,
}

/// Publishes session transitions to subscribers.
///
/// Cloning the store is cheap and every clone refers to the same underlying
/// session state.
#[derive(Clone)]
pub struct SessionStore {
    tx: Arc<watch::Sender<Option<Session>>>,
}

impl SessionStore {
    /// Create a session store with no active session.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);

        Self { tx: Arc::new(tx) }
    }

    /// Publish a sign-in for `user_id`, replacing any existing session.
    pub fn sign_in(&self, user_id: UserID) {
        self.tx.send_replace(Some(Session { user_id }));
    }

    /// Publish a sign-out, returning the session state to anonymous.
    pub fn sign_out(&self) {
        self.tx.send_replace(None);
    }

    /// The current session, or `None` while anonymous.
    pub fn current(&self) -> Option<Session> {
        *self.tx.borrow()
    }

    /// Subscribe to session transitions.
    ///
    /// The receiver yields the latest session state after each transition.
    /// Intermediate states may be skipped if transitions happen faster than
    /// the subscriber consumes them, which is fine here since only the latest
    /// state matters.
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.tx.subscribe()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

/// The user that the current request is acting as, if any.
///
/// A request only counts as signed in when it carries a valid, unexpired auth
/// token AND that token matches the active session. A stale cookie left over
/// from before a sign-out does not grant access.
pub fn active_user(jar: &PrivateCookieJar, sessions: &SessionStore) -> Option<UserID> {
    let token = get_token(jar).ok()?;
    let session = sessions.current()?;

    (token.user_id == session.user_id).then_some(session.user_id)
}
