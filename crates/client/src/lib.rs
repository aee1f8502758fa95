//! HTTP client for the platform's callable cloud functions.
//!
//! [`CallableStore`] implements
//! [`NotificationStore`](innohub_notifications::NotificationStore) on top
//! of the `manageNotifications` callable function using [`reqwest`].
//! [`ClientConfig`] reads the endpoint and credentials from the
//! environment.

pub mod callable;
pub mod config;
pub mod error;

pub use callable::CallableStore;
pub use config::ClientConfig;
pub use error::{ClientError, ConfigError};
