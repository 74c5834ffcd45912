//! Platform-specific event queue implementations
//!
//! `notify` picks the kernel facility: inotify on Linux, FSEvents on
//! macOS, kqueue on the BSDs.

mod notify_queue;

pub use notify_queue::{classify, NotifyQueue};

/// Event queue the `fwa` binary runs on
pub type DefaultQueue = NotifyQueue;
