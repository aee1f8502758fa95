//! Notification entity models and user notification preferences.
//!
//! The wire format mirrors the documents produced by the backend
//! notifications function: camelCase keys and lowercase type names.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Identifier of a notification, unique within one user's notification set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(String);

impl NotificationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NotificationId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for NotificationId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

// ---------------------------------------------------------------------------
// NotificationType
// ---------------------------------------------------------------------------

/// Category of a notification, used for icons and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationType {
    Success,
    Warning,
    Error,
    Invite,
    Achievement,
    Update,
    Info,
}

impl NotificationType {
    pub const ALL: [NotificationType; 7] = [
        NotificationType::Success,
        NotificationType::Warning,
        NotificationType::Error,
        NotificationType::Invite,
        NotificationType::Achievement,
        NotificationType::Update,
        NotificationType::Info,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            NotificationType::Success => "success",
            NotificationType::Warning => "warning",
            NotificationType::Error => "error",
            NotificationType::Invite => "invite",
            NotificationType::Achievement => "achievement",
            NotificationType::Update => "update",
            NotificationType::Info => "info",
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("Unknown notification type: {s}")))
    }
}

// ---------------------------------------------------------------------------
// Notification
// ---------------------------------------------------------------------------

/// A single notification delivered to the signed-in user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: NotificationId,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    pub read: bool,
    pub created_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl Notification {
    /// Create an unread notification stamped with the current time.
    pub fn new(
        id: impl Into<NotificationId>,
        kind: NotificationType,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            title: title.into(),
            message: message.into(),
            read: false,
            created_at: chrono::Utc::now(),
            link: None,
        }
    }

    /// Attach a deep link to the notification.
    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    /// Mark the notification as already read.
    pub fn read(mut self) -> Self {
        self.read = true;
        self
    }
}

/// Count the unread notifications in a slice.
pub fn count_unread(items: &[Notification]) -> u64 {
    items.iter().filter(|n| !n.read).count() as u64
}

// ---------------------------------------------------------------------------
// NotificationPreferences
// ---------------------------------------------------------------------------

fn enabled() -> bool {
    true
}

/// A user's notification preferences.
///
/// The named flags are the ones the settings page renders. Any other
/// field stored on the preferences document (extension flags, backend
/// bookkeeping such as `updatedAt`) is kept in `extra` and written back
/// unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPreferences {
    #[serde(default = "enabled")]
    pub email_notifications: bool,
    #[serde(default = "enabled")]
    pub push_notifications: bool,
    #[serde(default)]
    pub marketing_emails: bool,
    #[serde(default = "enabled")]
    pub team_invites: bool,
    #[serde(default = "enabled")]
    pub challenge_updates: bool,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            email_notifications: true,
            push_notifications: true,
            marketing_emails: false,
            team_invites: true,
            challenge_updates: true,
            extra: BTreeMap::new(),
        }
    }
}

impl NotificationPreferences {
    /// Look up a flag by its wire name, including extension flags.
    pub fn flag(&self, name: &str) -> Option<bool> {
        match name {
            "emailNotifications" => Some(self.email_notifications),
            "pushNotifications" => Some(self.push_notifications),
            "marketingEmails" => Some(self.marketing_emails),
            "teamInvites" => Some(self.team_invites),
            "challengeUpdates" => Some(self.challenge_updates),
            other => self.extra.get(other).and_then(serde_json::Value::as_bool),
        }
    }

    /// Return a copy with the named flag set. Unknown names become
    /// extension flags.
    pub fn with_flag(mut self, name: &str, value: bool) -> Self {
        match name {
            "emailNotifications" => self.email_notifications = value,
            "pushNotifications" => self.push_notifications = value,
            "marketingEmails" => self.marketing_emails = value,
            "teamInvites" => self.team_invites = value,
            "challengeUpdates" => self.challenge_updates = value,
            other => {
                self.extra.insert(other.to_string(), serde_json::Value::Bool(value));
            }
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn notification_uses_camel_case_wire_format() {
        let json = serde_json::json!({
            "id": "n1",
            "type": "invite",
            "title": "Team invite",
            "message": "You were invited to Team Rocket",
            "read": false,
            "createdAt": "2026-03-01T12:00:00Z",
            "link": "/teams/rocket"
        });

        let n: Notification = serde_json::from_value(json).unwrap();
        assert_eq!(n.id.as_str(), "n1");
        assert_eq!(n.kind, NotificationType::Invite);
        assert_eq!(n.link.as_deref(), Some("/teams/rocket"));

        let back = serde_json::to_value(&n).unwrap();
        assert_eq!(back["type"], "invite");
        assert!(back.get("createdAt").is_some());
    }

    #[test]
    fn link_is_optional() {
        let json = serde_json::json!({
            "id": "n2",
            "type": "info",
            "title": "t",
            "message": "m",
            "read": true,
            "createdAt": "2026-03-01T12:00:00Z"
        });

        let n: Notification = serde_json::from_value(json).unwrap();
        assert!(n.link.is_none());
        assert!(serde_json::to_value(&n).unwrap().get("link").is_none());
    }

    #[test]
    fn count_unread_ignores_read_items() {
        let items = vec![
            Notification::new("a", NotificationType::Info, "t", "m"),
            Notification::new("b", NotificationType::Info, "t", "m").read(),
            Notification::new("c", NotificationType::Update, "t", "m"),
        ];
        assert_eq!(count_unread(&items), 2);
    }

    #[test]
    fn notification_type_parses_lowercase_names() {
        assert_eq!(
            "achievement".parse::<NotificationType>().unwrap(),
            NotificationType::Achievement
        );
        assert_matches!(
            "Achievement".parse::<NotificationType>(),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn preferences_keep_extension_flags() {
        let json = serde_json::json!({
            "emailNotifications": false,
            "pushNotifications": true,
            "marketingEmails": false,
            "teamInvites": true,
            "challengeUpdates": true,
            "weeklyDigest": true
        });

        let prefs: NotificationPreferences = serde_json::from_value(json.clone()).unwrap();
        assert!(!prefs.email_notifications);
        assert_eq!(prefs.flag("weeklyDigest"), Some(true));
        assert_eq!(serde_json::to_value(&prefs).unwrap(), json);
    }

    #[test]
    fn preferences_fill_missing_named_flags() {
        let prefs: NotificationPreferences =
            serde_json::from_value(serde_json::json!({ "emailNotifications": false })).unwrap();
        assert!(!prefs.email_notifications);
        assert!(prefs.push_notifications);
        assert!(!prefs.marketing_emails);
        assert!(prefs.extra.is_empty());
    }

    #[test]
    fn with_flag_sets_named_and_extension_flags() {
        let prefs = NotificationPreferences::default()
            .with_flag("marketingEmails", true)
            .with_flag("mentorMessages", false);
        assert!(prefs.marketing_emails);
        assert_eq!(prefs.flag("mentorMessages"), Some(false));
        assert_eq!(prefs.flag("unknown"), None);
    }

    #[test]
    fn preferences_tolerate_non_boolean_fields() {
        let json = serde_json::json!({
            "emailNotifications": true,
            "updatedAt": "2026-01-01T00:00:00Z",
            "quietHours": { "start": 22, "end": 7 }
        });

        let prefs: NotificationPreferences = serde_json::from_value(json).unwrap();
        assert!(prefs.email_notifications);
        assert_eq!(prefs.flag("updatedAt"), None);
        assert_eq!(
            prefs.extra.get("updatedAt"),
            Some(&serde_json::json!("2026-01-01T00:00:00Z"))
        );

        let back = serde_json::to_value(&prefs).unwrap();
        assert_eq!(back["quietHours"]["start"], 22);
    }
}
