//! Change monitoring engine for fwa
//!
//! This crate provides:
//! - The event-queue capability and a `notify`-backed implementation
//! - The watch table and the registrar that fills it
//! - Recovery of paths whose inode was deleted or replaced
//! - The debouncing event loop that turns notifications into reports

pub mod debounce;
pub mod platform;
pub mod queue;
pub mod recovery;
pub mod registrar;
pub mod report;
pub mod table;

#[cfg(test)]
mod testing;

// Re-exports
pub use debounce::{EventLoop, LoopError, Turn};
pub use platform::{DefaultQueue, NotifyQueue};
pub use queue::{EventQueue, Notification, QueueError, Token};
pub use recovery::{needs_recovery, recover, RecoveryOutcome};
pub use registrar::{register_all, RegisterError};
pub use report::Report;
pub use table::{WatchTable, WatchedFile};
