//! Client-side notification synchronization.
//!
//! - [`NotificationSync`] holds one user's cached notifications and
//!   preferences, applies mutations optimistically, and reconciles with
//!   the remote store by refetching when a mutation fails.
//! - [`NotificationState`] is the snapshot observers receive through a
//!   `tokio::sync::watch` channel.
//! - [`NotificationStore`] is the remote RPC boundary; [`MemoryStore`]
//!   is an in-process implementation.
//! - [`SyncNotice`] carries toast-style error and info signals over a
//!   `tokio::sync::broadcast` channel.

pub mod engine;
pub mod memory;
pub mod notice;
pub mod session;
pub mod state;
pub mod store;

pub use engine::NotificationSync;
pub use memory::MemoryStore;
pub use notice::{NoticeKind, SyncNotice};
pub use session::Session;
pub use state::{NotificationFilter, NotificationState, SyncPhase};
pub use store::{NotificationStore, StoreError, StoreRequest, StoreResponse};
