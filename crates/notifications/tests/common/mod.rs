//! Shared fixtures for notification engine integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use innohub_core::notification::{Notification, NotificationType};
use innohub_core::types::UserId;
use innohub_notifications::{
    MemoryStore, NotificationStore, NotificationSync, StoreError, StoreRequest, StoreResponse,
};
use tokio::sync::Semaphore;

/// A store that holds every call until the test releases it, then
/// delegates to an inner [`MemoryStore`].
pub struct GatedStore {
    pub inner: MemoryStore,
    gate: Semaphore,
}

impl GatedStore {
    pub fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            gate: Semaphore::new(0),
        }
    }

    /// Let `calls` more store calls through.
    pub fn release(&self, calls: usize) {
        self.gate.add_permits(calls);
    }
}

#[async_trait]
impl NotificationStore for GatedStore {
    async fn call(&self, request: StoreRequest) -> Result<StoreResponse, StoreError> {
        let permit = self
            .gate
            .acquire()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        permit.forget();
        self.inner.call(request).await
    }
}

pub fn user() -> UserId {
    UserId::new("user-1")
}

pub fn unread(id: &str) -> Notification {
    Notification::new(id, NotificationType::Info, format!("Title {id}"), "message")
}

/// Two unread notifications, `n1` and `n2`.
pub fn two_unread() -> Vec<Notification> {
    vec![unread("n1"), unread("n2")]
}

/// An engine over a [`MemoryStore`] holding `items`, already refreshed.
pub async fn ready_engine(items: Vec<Notification>) -> (Arc<MemoryStore>, NotificationSync) {
    let store = Arc::new(MemoryStore::with_items(items));
    let engine = NotificationSync::for_user(store.clone(), user());
    engine.refresh().await;
    (store, engine)
}

/// An engine over a [`GatedStore`] holding `items`, already refreshed.
pub async fn gated_engine(items: Vec<Notification>) -> (Arc<GatedStore>, NotificationSync) {
    let store = Arc::new(GatedStore::new(MemoryStore::with_items(items)));
    let engine = NotificationSync::for_user(store.clone(), user());
    store.release(1);
    engine.refresh().await;
    (store, engine)
}
