//! Transient, toast-style signals emitted by the sync engine.

use serde::Serialize;

/// Severity of a [`SyncNotice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Error,
    Info,
}

/// A user-visible message about a sync operation.
///
/// Notices are ephemeral: they are broadcast once and not retained in
/// [`NotificationState`](crate::NotificationState).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncNotice {
    pub kind: NoticeKind,
    /// Store action the notice is about, e.g. `"markRead"`.
    pub action: &'static str,
    pub message: String,
}

impl SyncNotice {
    pub fn error(action: &'static str, message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            action,
            message: message.into(),
        }
    }

    pub fn info(action: &'static str, message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            action,
            message: message.into(),
        }
    }
}
