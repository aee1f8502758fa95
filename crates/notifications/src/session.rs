//! Ambient session identity and the task that keeps an engine in step
//! with it.
//!
//! The identity is injected rather than read from a global, so several
//! sessions (and engines) can live in one process.

use std::sync::Arc;

use innohub_core::types::UserId;
use tokio::sync::watch;

use crate::engine::NotificationSync;

/// Publishes which user, if any, is currently signed in.
pub struct Session {
    sender: watch::Sender<Option<UserId>>,
}

impl Session {
    /// Create a signed-out session.
    pub fn new() -> Self {
        let (sender, _) = watch::channel(None);
        Self { sender }
    }

    pub fn sign_in(&self, user: UserId) {
        self.sender.send_replace(Some(user));
    }

    pub fn sign_out(&self) {
        self.sender.send_replace(None);
    }

    pub fn current(&self) -> Option<UserId> {
        self.sender.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<UserId>> {
        self.sender.subscribe()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationSync {
    /// Follow identity changes until the session sender is dropped.
    ///
    /// Signing in as a new user resets the cache and spawns a refresh;
    /// signing out resets the cache. The refresh is spawned so that a
    /// sign-out arriving while it is in flight is applied immediately.
    pub async fn follow_session(self: Arc<Self>, mut session: watch::Receiver<Option<UserId>>) {
        loop {
            let identity = session.borrow_and_update().clone();
            if self.switch_identity(identity) {
                let engine = Arc::clone(&self);
                tokio::spawn(async move { engine.refresh().await });
            }

            if session.changed().await.is_err() {
                tracing::info!("Session closed, notification sync stopping");
                break;
            }
        }
    }
}
