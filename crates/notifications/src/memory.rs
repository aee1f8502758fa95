//! In-process [`NotificationStore`] for tests and offline tooling.
//!
//! Holds a single user's notifications and preferences. Failures can be
//! injected per action, and every request is recorded so callers can
//! assert on what reached the store.

use std::collections::HashMap;

use async_trait::async_trait;
use innohub_core::notification::{count_unread, Notification, NotificationPreferences};
use tokio::sync::Mutex;

use crate::store::{NotificationStore, StoreError, StoreRequest, StoreResponse};

#[derive(Default)]
struct Inner {
    items: Vec<Notification>,
    preferences: Option<NotificationPreferences>,
    /// Remaining injected failures, keyed by action name.
    failures: HashMap<&'static str, u32>,
    requests: Vec<StoreRequest>,
}

/// A notification store backed by process memory.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-loaded with `items`, in backend order.
    pub fn with_items(items: Vec<Notification>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                items,
                ..Inner::default()
            }),
        }
    }

    /// Replace the stored notifications.
    pub async fn set_items(&self, items: Vec<Notification>) {
        self.inner.lock().await.items = items;
    }

    /// Append a notification, as the backend does when an event fires.
    pub async fn push(&self, notification: Notification) {
        self.inner.lock().await.items.push(notification);
    }

    pub async fn set_preferences(&self, preferences: NotificationPreferences) {
        self.inner.lock().await.preferences = Some(preferences);
    }

    pub async fn items(&self) -> Vec<Notification> {
        self.inner.lock().await.items.clone()
    }

    pub async fn preferences(&self) -> Option<NotificationPreferences> {
        self.inner.lock().await.preferences.clone()
    }

    /// Make the next `times` calls for `action` fail with a 503.
    pub async fn fail_next(&self, action: &'static str, times: u32) {
        *self.inner.lock().await.failures.entry(action).or_insert(0) += times;
    }

    /// Every request received so far, oldest first.
    pub async fn requests(&self) -> Vec<StoreRequest> {
        self.inner.lock().await.requests.clone()
    }
}

fn not_found(id: &impl std::fmt::Display) -> StoreError {
    StoreError::Remote {
        status: 404,
        message: format!("Notification {id} not found"),
    }
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn call(&self, request: StoreRequest) -> Result<StoreResponse, StoreError> {
        let mut inner = self.inner.lock().await;
        inner.requests.push(request.clone());

        let action = request.action();
        if let Some(remaining) = inner.failures.get_mut(action) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(StoreError::Remote {
                    status: 503,
                    message: format!("Injected failure for {action}"),
                });
            }
        }

        match request {
            StoreRequest::Get => {
                let unread = count_unread(&inner.items);
                let mut response = StoreResponse::listing(inner.items.clone(), unread);
                response.preferences = inner.preferences.clone();
                Ok(response)
            }
            StoreRequest::MarkRead { notification_id } => {
                let n = inner
                    .items
                    .iter_mut()
                    .find(|n| n.id == notification_id)
                    .ok_or_else(|| not_found(&notification_id))?;
                n.read = true;
                Ok(StoreResponse::ok())
            }
            StoreRequest::MarkAllRead => {
                for n in &mut inner.items {
                    n.read = true;
                }
                Ok(StoreResponse::ok())
            }
            StoreRequest::Delete { notification_id } => {
                let before = inner.items.len();
                inner.items.retain(|n| n.id != notification_id);
                if inner.items.len() == before {
                    return Err(not_found(&notification_id));
                }
                Ok(StoreResponse::ok())
            }
            StoreRequest::GetPreferences => Ok(StoreResponse {
                preferences: Some(inner.preferences.clone().unwrap_or_default()),
                ..StoreResponse::default()
            }),
            StoreRequest::UpdatePreferences { preferences } => {
                inner.preferences = Some(preferences);
                Ok(StoreResponse::ok())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
