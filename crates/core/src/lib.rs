//! Core types for fwa
//!
//! This crate provides:
//! - Change-kind flag sets reported by the event facility
//! - Bounded-retry opening of watch handles
//! - Engine configuration (retry budget, initial-open policy)

pub mod change;
pub mod config;
pub mod retry;

// Re-exports
pub use change::{ChangeKind, ChangeSet};
pub use config::{MissingFilePolicy, WatchConfig, DEBOUNCE_WINDOW};
pub use retry::{open_with_retry, RetryPolicy};
