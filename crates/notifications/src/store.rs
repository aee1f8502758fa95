//! Remote notification store boundary.
//!
//! The backend exposes a single callable entry point that switches on an
//! `action` discriminator. [`StoreRequest`] models that request and
//! [`StoreResponse`] the loosely-typed reply; [`NotificationStore`] is the
//! async seam the sync engine calls through.

use async_trait::async_trait;
use innohub_core::actions::{
    ACTION_DELETE, ACTION_GET, ACTION_GET_PREFERENCES, ACTION_MARK_ALL_READ, ACTION_MARK_READ,
    ACTION_UPDATE_PREFERENCES,
};
use innohub_core::notification::{Notification, NotificationId, NotificationPreferences};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Request / response
// ---------------------------------------------------------------------------

/// A request to the notifications function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum StoreRequest {
    Get,
    MarkRead {
        #[serde(rename = "notificationId")]
        notification_id: NotificationId,
    },
    MarkAllRead,
    Delete {
        #[serde(rename = "notificationId")]
        notification_id: NotificationId,
    },
    GetPreferences,
    UpdatePreferences {
        preferences: NotificationPreferences,
    },
}

impl StoreRequest {
    /// The wire name of the action.
    pub fn action(&self) -> &'static str {
        match self {
            StoreRequest::Get => ACTION_GET,
            StoreRequest::MarkRead { .. } => ACTION_MARK_READ,
            StoreRequest::MarkAllRead => ACTION_MARK_ALL_READ,
            StoreRequest::Delete { .. } => ACTION_DELETE,
            StoreRequest::GetPreferences => ACTION_GET_PREFERENCES,
            StoreRequest::UpdatePreferences { .. } => ACTION_UPDATE_PREFERENCES,
        }
    }
}

/// Reply from the notifications function. Which fields are present
/// depends on the action.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<Notification>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unread_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferences: Option<NotificationPreferences>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
}

impl StoreResponse {
    /// An acknowledgement with `success: true`.
    pub fn ok() -> Self {
        Self {
            success: Some(true),
            ..Self::default()
        }
    }

    /// A full listing as returned by the `get` action.
    pub fn listing(items: Vec<Notification>, unread_count: u64) -> Self {
        Self {
            items: Some(items),
            unread_count: Some(unread_count),
            ..Self::default()
        }
    }

    /// Treat an explicit `success: false` as a failed call.
    pub fn into_result(self, action: &'static str) -> Result<Self, StoreError> {
        if self.success == Some(false) {
            return Err(StoreError::Rejected { action });
        }
        Ok(self)
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from a notification store call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    /// The call never produced a response (network, DNS, TLS, timeout).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The backend answered with an error status.
    #[error("Remote error ({status}): {message}")]
    Remote { status: u16, message: String },

    /// The backend answered but reported `success: false`.
    #[error("Remote rejected `{action}`")]
    Rejected { action: &'static str },

    /// No signed-in session to authenticate the call with.
    #[error("Not authenticated")]
    Unauthenticated,

    /// The response body could not be interpreted.
    #[error("Malformed response: {0}")]
    Malformed(String),
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// The remote store owning durable notification data for the signed-in user.
///
/// Authentication is carried by the implementation (session token), not
/// by the request.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn call(&self, request: StoreRequest) -> Result<StoreResponse, StoreError>;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
