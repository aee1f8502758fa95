//! Optimistic notification sync engine.
//!
//! [`NotificationSync`] owns the cached [`NotificationState`] for one
//! session. Every mutation is applied locally before the store is called,
//! and a failed call is reconciled by a full
//! [`refresh`](NotificationSync::refresh) rather than a per-operation
//! rollback.
//!
//! Observers subscribe to a `tokio::sync::watch` channel. Every state
//! change (optimistic apply, refresh start, refresh completion, reset)
//! publishes exactly one new snapshot; a confirmed mutation publishes
//! nothing further.

use std::sync::Arc;

use innohub_core::actions::{
    ACTION_DELETE, ACTION_GET, ACTION_GET_PREFERENCES, ACTION_MARK_ALL_READ, ACTION_MARK_READ,
    ACTION_UPDATE_PREFERENCES,
};
use innohub_core::notification::{NotificationId, NotificationPreferences};
use innohub_core::types::UserId;
use tokio::sync::{broadcast, watch};

use crate::notice::SyncNotice;
use crate::state::NotificationState;
use crate::store::{NotificationStore, StoreError, StoreRequest, StoreResponse};

/// Buffer capacity for the notice broadcast channel.
const NOTICE_CAPACITY: usize = 64;

/// Whether a refresh was requested directly or to repair a failed mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RefreshCause {
    Requested,
    Reconcile,
}

/// Cached, optimistically updated view of one user's notifications.
///
/// Designed to be shared via `Arc<NotificationSync>`; all operations take
/// `&self`.
pub struct NotificationSync {
    store: Arc<dyn NotificationStore>,
    state: watch::Sender<NotificationState>,
    identity: watch::Sender<Option<UserId>>,
    notices: broadcast::Sender<SyncNotice>,
}

impl NotificationSync {
    /// Create an engine with no signed-in identity.
    pub fn new(store: Arc<dyn NotificationStore>) -> Self {
        let (state, _) = watch::channel(NotificationState::default());
        let (identity, _) = watch::channel(None);
        let (notices, _) = broadcast::channel(NOTICE_CAPACITY);
        Self {
            store,
            state,
            identity,
            notices,
        }
    }

    /// Create an engine already bound to `user`. No fetch is issued until
    /// [`refresh`](Self::refresh) is called.
    pub fn for_user(store: Arc<dyn NotificationStore>, user: UserId) -> Self {
        let engine = Self::new(store);
        engine.identity.send_replace(Some(user));
        engine
    }

    // ---- observation ----

    /// Subscribe to state snapshots.
    pub fn subscribe(&self) -> watch::Receiver<NotificationState> {
        self.state.subscribe()
    }

    /// Subscribe to transient notices.
    pub fn notices(&self) -> broadcast::Receiver<SyncNotice> {
        self.notices.subscribe()
    }

    /// Clone of the current state.
    pub fn snapshot(&self) -> NotificationState {
        self.state.borrow().clone()
    }

    pub fn identity(&self) -> Option<UserId> {
        self.identity.borrow().clone()
    }

    // ---- session ----

    /// Switch the ambient identity without fetching.
    ///
    /// Any change clears the cache and invalidates in-flight calls.
    /// Returns `true` when the new identity is a signed-in user that
    /// needs a fresh fetch.
    pub fn switch_identity(&self, identity: Option<UserId>) -> bool {
        let changed = self.identity.send_if_modified(|current| {
            if *current == identity {
                return false;
            }
            *current = identity.clone();
            true
        });
        if !changed {
            return false;
        }

        match &identity {
            Some(user) => tracing::info!(user_id = %user, "Notification session started"),
            None => tracing::info!("Notification session ended, clearing state"),
        }
        self.reset();
        identity.is_some()
    }

    /// Switch the ambient identity and fetch for the new user, if any.
    pub async fn set_identity(&self, identity: Option<UserId>) {
        if self.switch_identity(identity) {
            self.refresh().await;
        }
    }

    /// Clear all cached data and return to `Uninitialized`.
    ///
    /// Responses to calls issued before the reset are discarded.
    pub fn reset(&self) {
        self.state
            .send_modify(|state| *state = NotificationState::empty(state.generation + 1));
    }

    // ---- operations ----

    /// Fetch the full notification set and replace the cache with it.
    ///
    /// On failure the cached data is left as is and `last_error` is set.
    pub async fn refresh(&self) {
        self.refresh_with(RefreshCause::Requested).await;
    }

    /// Mark one notification read.
    ///
    /// An id that is not cached is a local no-op; the store is still called.
    pub async fn mark_as_read(&self, id: &NotificationId) {
        if !self.has_session(ACTION_MARK_READ) {
            return;
        }
        let (generation, changed) = self.apply(|state| state.mark_read(id));
        tracing::debug!(notification_id = %id, changed, "Optimistically marked read");

        let result = self
            .store
            .call(StoreRequest::MarkRead {
                notification_id: id.clone(),
            })
            .await;
        self.reconcile(generation, ACTION_MARK_READ, result).await;
    }

    /// Mark every notification read.
    pub async fn mark_all_as_read(&self) {
        if !self.has_session(ACTION_MARK_ALL_READ) {
            return;
        }
        let (generation, _) = self.apply(NotificationState::mark_all_read);
        tracing::debug!("Optimistically marked all read");

        let result = self.store.call(StoreRequest::MarkAllRead).await;
        if self.reconcile(generation, ACTION_MARK_ALL_READ, result).await {
            self.notify(SyncNotice::info(
                ACTION_MARK_ALL_READ,
                "All notifications marked as read",
            ));
        }
    }

    /// Delete one notification.
    ///
    /// An id that is not cached is a local no-op; the store is still called.
    pub async fn remove_notification(&self, id: &NotificationId) {
        if !self.has_session(ACTION_DELETE) {
            return;
        }
        let (generation, changed) = self.apply(|state| state.remove(id));
        tracing::debug!(notification_id = %id, changed, "Optimistically removed notification");

        let result = self
            .store
            .call(StoreRequest::Delete {
                notification_id: id.clone(),
            })
            .await;
        self.reconcile(generation, ACTION_DELETE, result).await;
    }

    /// Replace the preferences with `preferences` (no merge).
    pub async fn update_preferences(&self, preferences: NotificationPreferences) {
        if !self.has_session(ACTION_UPDATE_PREFERENCES) {
            return;
        }
        let request = StoreRequest::UpdatePreferences {
            preferences: preferences.clone(),
        };
        let (generation, _) = self.apply(|state| {
            state.preferences = Some(preferences);
            true
        });
        tracing::debug!("Optimistically replaced preferences");

        let result = self.store.call(request).await;
        if self.reconcile(generation, ACTION_UPDATE_PREFERENCES, result).await {
            self.notify(SyncNotice::info(ACTION_UPDATE_PREFERENCES, "Preferences saved"));
        }
    }

    /// Fetch only the preferences.
    ///
    /// Nothing was changed locally, so a failure only sets `last_error`.
    pub async fn load_preferences(&self) {
        if !self.has_session(ACTION_GET_PREFERENCES) {
            return;
        }
        let generation = self.state.borrow().generation;

        let result = self
            .store
            .call(StoreRequest::GetPreferences)
            .await
            .and_then(|r| r.into_result(ACTION_GET_PREFERENCES));

        match result {
            Ok(response) => {
                self.state.send_if_modified(|state| {
                    if state.generation != generation {
                        return false;
                    }
                    match response.preferences {
                        Some(preferences) => {
                            state.preferences = Some(preferences);
                            true
                        }
                        None => false,
                    }
                });
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load notification preferences");
                let recorded = self.state.send_if_modified(|state| {
                    if state.generation != generation {
                        return false;
                    }
                    state.last_error = Some(e.to_string());
                    true
                });
                if recorded {
                    self.notify(SyncNotice::error(ACTION_GET_PREFERENCES, e.to_string()));
                }
            }
        }
    }

    // ---- internals ----

    fn has_session(&self, action: &'static str) -> bool {
        if self.identity.borrow().is_none() {
            tracing::debug!(action, "No signed-in user, skipping");
            return false;
        }
        true
    }

    /// Apply a local change, publishing only if it reports a modification.
    ///
    /// Returns the session generation the change was applied under.
    fn apply(&self, change: impl FnOnce(&mut NotificationState) -> bool) -> (u64, bool) {
        let mut generation = 0;
        let changed = self.state.send_if_modified(|state| {
            generation = state.generation;
            change(state)
        });
        (generation, changed)
    }

    async fn refresh_with(&self, cause: RefreshCause) {
        if !self.has_session(ACTION_GET) {
            return;
        }
        let (generation, _) = self.apply(|state| {
            state.pending_refreshes += 1;
            true
        });

        let result = self
            .store
            .call(StoreRequest::Get)
            .await
            .and_then(|r| r.into_result(ACTION_GET));

        let mut failure = None;
        let applied = self.state.send_if_modified(|state| {
            if state.generation != generation {
                return false;
            }
            state.pending_refreshes = state.pending_refreshes.saturating_sub(1);
            match &result {
                Ok(response) => state.replace_from(response.clone(), chrono::Utc::now()),
                Err(e) => {
                    state.last_error = Some(e.to_string());
                    failure = Some(e.clone());
                }
            }
            true
        });

        if !applied {
            tracing::debug!("Discarding refresh result from a previous session");
            return;
        }

        match failure {
            None => {
                let state = self.state.borrow();
                tracing::info!(
                    items = state.items.len(),
                    unread = state.unread_count,
                    "Notifications refreshed"
                );
            }
            Some(e) => {
                match cause {
                    RefreshCause::Requested => {
                        tracing::warn!(error = %e, "Failed to refresh notifications");
                    }
                    RefreshCause::Reconcile => {
                        tracing::error!(
                            error = %e,
                            "Reconciliation refresh failed, cached notifications may be stale"
                        );
                    }
                }
                self.notify(SyncNotice::error(ACTION_GET, e.to_string()));
            }
        }
    }

    /// Settle a mutation. On a proven failure, surface a notice and refetch.
    ///
    /// Returns `true` when the store confirmed the mutation within the
    /// session it was issued in.
    async fn reconcile(
        &self,
        generation: u64,
        action: &'static str,
        result: Result<StoreResponse, StoreError>,
    ) -> bool {
        let result = result.and_then(|r| r.into_result(action));
        let stale = self.state.borrow().generation != generation;

        let error = match result {
            Ok(_) if stale => {
                tracing::debug!(action, "Ignoring confirmation from a previous session");
                return false;
            }
            Ok(_) => {
                tracing::debug!(action, "Mutation confirmed");
                return true;
            }
            Err(e) => e,
        };

        if stale {
            tracing::debug!(action, error = %error, "Ignoring failure from a previous session");
            return false;
        }

        tracing::warn!(action, error = %error, "Mutation failed, refetching notifications");
        self.notify(SyncNotice::error(action, error.to_string()));
        self.refresh_with(RefreshCause::Reconcile).await;
        false
    }

    fn notify(&self, notice: SyncNotice) {
        // Zero receivers is not an error.
        let _ = self.notices.send(notice);
    }
}
