//! Well-known action names accepted by the notifications callable function.
//!
//! These must match the `action` discriminator the backend function
//! switches on.

pub const ACTION_GET: &str = "get";

pub const ACTION_MARK_READ: &str = "markRead";

pub const ACTION_MARK_ALL_READ: &str = "markAllRead";

pub const ACTION_DELETE: &str = "delete";

pub const ACTION_GET_PREFERENCES: &str = "getPreferences";

pub const ACTION_UPDATE_PREFERENCES: &str = "updatePreferences";
