//! Shared domain types for the innohub client workspace.
//!
//! This crate has zero internal dependencies so it can be used by the
//! notification engine, the HTTP client, and any CLI tooling alike.

pub mod access;
pub mod actions;
pub mod currency;
pub mod error;
pub mod notification;
pub mod roles;
pub mod types;
