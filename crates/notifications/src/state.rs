//! The notification snapshot published to observers.

use std::collections::BTreeMap;

use innohub_core::notification::{
    count_unread, Notification, NotificationId, NotificationPreferences, NotificationType,
};
use innohub_core::types::Timestamp;

use crate::store::StoreResponse;

/// Lifecycle phase of the cached state within one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    /// Nothing fetched yet for the current session.
    Uninitialized,
    /// A refresh is in flight.
    Loading,
    /// At least one refresh has succeeded for the current session.
    Ready,
}

/// Which notifications a list view shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotificationFilter {
    #[default]
    All,
    Unread,
    Read,
    OfType(NotificationType),
}

impl NotificationFilter {
    pub fn matches(self, notification: &Notification) -> bool {
        match self {
            NotificationFilter::All => true,
            NotificationFilter::Unread => !notification.read,
            NotificationFilter::Read => notification.read,
            NotificationFilter::OfType(kind) => notification.kind == kind,
        }
    }
}

/// Cached notifications, unread counter, and preferences for one session.
///
/// `unread_count` equals the number of unread `items` after every
/// successful refresh. Between an optimistic mutation and its
/// reconciliation it may diverge, but it never goes below zero.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationState {
    /// Backend order; never re-sorted locally.
    pub items: Vec<Notification>,
    pub unread_count: u64,
    pub preferences: Option<NotificationPreferences>,
    /// Message of the most recent failure, cleared by the next successful refresh.
    pub last_error: Option<String>,
    pub last_synced_at: Option<Timestamp>,
    pub(crate) pending_refreshes: u32,
    pub(crate) generation: u64,
}

impl Default for NotificationState {
    fn default() -> Self {
        Self::empty(0)
    }
}

impl NotificationState {
    pub(crate) fn empty(generation: u64) -> Self {
        Self {
            items: Vec::new(),
            unread_count: 0,
            preferences: None,
            last_error: None,
            last_synced_at: None,
            pending_refreshes: 0,
            generation,
        }
    }

    // ---- queries ----

    pub fn phase(&self) -> SyncPhase {
        if self.pending_refreshes > 0 {
            SyncPhase::Loading
        } else if self.last_synced_at.is_some() {
            SyncPhase::Ready
        } else {
            SyncPhase::Uninitialized
        }
    }

    pub fn is_loading(&self) -> bool {
        self.pending_refreshes > 0
    }

    pub fn get(&self, id: &NotificationId) -> Option<&Notification> {
        self.items.iter().find(|n| &n.id == id)
    }

    pub fn unread(&self) -> impl Iterator<Item = &Notification> {
        self.filtered(NotificationFilter::Unread)
    }

    pub fn filtered(&self, filter: NotificationFilter) -> impl Iterator<Item = &Notification> {
        self.items.iter().filter(move |n| filter.matches(n))
    }

    pub fn counts_by_type(&self) -> BTreeMap<NotificationType, usize> {
        let mut counts = BTreeMap::new();
        for n in &self.items {
            *counts.entry(n.kind).or_insert(0) += 1;
        }
        counts
    }

    /// Text for an unread badge: `None` when there is nothing unread,
    /// `"{cap}+"` once the count exceeds `cap`.
    pub fn badge_label(&self, cap: u64) -> Option<String> {
        match self.unread_count {
            0 => None,
            n if n > cap => Some(format!("{cap}+")),
            n => Some(n.to_string()),
        }
    }

    // ---- mutations (each returns whether anything changed) ----

    pub(crate) fn mark_read(&mut self, id: &NotificationId) -> bool {
        match self.items.iter_mut().find(|n| &n.id == id) {
            Some(n) if !n.read => {
                n.read = true;
                self.unread_count = self.unread_count.saturating_sub(1);
                true
            }
            _ => false,
        }
    }

    pub(crate) fn mark_all_read(&mut self) -> bool {
        let changed = self.unread_count != 0 || self.items.iter().any(|n| !n.read);
        for n in &mut self.items {
            n.read = true;
        }
        self.unread_count = 0;
        changed
    }

    pub(crate) fn remove(&mut self, id: &NotificationId) -> bool {
        let Some(pos) = self.items.iter().position(|n| &n.id == id) else {
            return false;
        };
        let removed = self.items.remove(pos);
        if !removed.read {
            self.unread_count = self.unread_count.saturating_sub(1);
        }
        true
    }

    /// Replace the cached data wholesale with a `get` response.
    pub(crate) fn replace_from(&mut self, response: StoreResponse, now: Timestamp) {
        let items = response.items.unwrap_or_default();
        self.unread_count = response
            .unread_count
            .unwrap_or_else(|| count_unread(&items));
        self.items = items;
        if let Some(preferences) = response.preferences {
            self.preferences = Some(preferences);
        }
        self.last_error = None;
        self.last_synced_at = Some(now);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
