//! The event-queue capability: the engine's only view of the kernel facility

use fwa_core::ChangeSet;
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Registration identity: the entry's index in the watch table
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct Token(pub usize);

impl Token {
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One delivered notification
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub token: Token,
    pub changes: ChangeSet,
}

impl Notification {
    pub fn new(token: Token, changes: impl Into<ChangeSet>) -> Self {
        Self {
            token,
            changes: changes.into(),
        }
    }
}

/// Event queue failures
#[derive(Error, Debug)]
pub enum QueueError {
    /// The facility could not be created
    #[error("unable to create event queue: {0}")]
    Create(String),

    /// Buffer for delivered notifications could not be reserved
    #[error("unable to allocate event memory for {0} events")]
    EventMemory(usize),

    /// A path could not be registered
    #[error("unable to watch {path}: {reason}")]
    Register { path: PathBuf, reason: String },

    /// A registration could not be dropped
    #[error("unable to stop watching {path}: {reason}")]
    Deregister { path: PathBuf, reason: String },

    /// The blocking wait itself failed
    #[error("event queue wait failed: {0}")]
    Wait(String),

    /// The delivery side of the facility went away
    #[error("event queue disconnected")]
    Disconnected,
}

/// Kernel event facility, created once and handed to the engine
///
/// Registrations are clear-on-read: a condition is delivered once and not
/// again until it is re-triggered, so nothing needs re-arming between
/// notifications. Only a replaced handle needs a fresh `register`.
pub trait EventQueue {
    /// Watch the file behind `handle` (opened from `path`) under `token`
    ///
    /// Path-based backends may land on whatever inode `path` names at call
    /// time; callers re-check the handle against the path afterwards.
    fn register(&mut self, token: Token, path: &Path, handle: &File) -> Result<(), QueueError>;

    /// Drop the registration held under `token`
    fn deregister(&mut self, token: Token, path: &Path) -> Result<(), QueueError>;

    /// Block for up to `timeout`
    ///
    /// Appends every notification available on wake-up to `out`. Leaves
    /// `out` untouched when the timeout expires with nothing delivered.
    fn wait(&mut self, timeout: Duration, out: &mut Vec<Notification>) -> Result<(), QueueError>;
}

impl<Q: EventQueue + ?Sized> EventQueue for Box<Q> {
    fn register(&mut self, token: Token, path: &Path, handle: &File) -> Result<(), QueueError> {
        (**self).register(token, path, handle)
    }

    fn deregister(&mut self, token: Token, path: &Path) -> Result<(), QueueError> {
        (**self).deregister(token, path)
    }

    fn wait(&mut self, timeout: Duration, out: &mut Vec<Notification>) -> Result<(), QueueError> {
        (**self).wait(timeout, out)
    }
}
