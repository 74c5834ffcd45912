//! Bounded-retry opening of watch handles
//!
//! Paths can be mid-creation or mid-replacement when we look at them
//! (editors and deploy tools write a new file then rename it into place),
//! so a failed open is retried a fixed number of times before giving up.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;
use std::thread::sleep;
use std::time::Duration;
use tracing::trace;

/// Fixed-spacing retry budget for opening a path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub attempts: u32,
    /// Pause between consecutive attempts
    pub spacing: Duration,
}

impl RetryPolicy {
    pub const DEFAULT_ATTEMPTS: u32 = 10;
    pub const DEFAULT_SPACING: Duration = Duration::from_millis(100);

    pub const fn new(attempts: u32, spacing: Duration) -> Self {
        Self { attempts, spacing }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_ATTEMPTS, Self::DEFAULT_SPACING)
    }
}

/// Open `path` read-only and non-blocking, retrying per `policy`
///
/// Returns the error of the last attempt once the budget is spent.
/// A policy with zero attempts still tries once.
pub fn open_with_retry(path: &Path, policy: &RetryPolicy) -> io::Result<File> {
    let attempts = policy.attempts.max(1);
    let mut attempt = 1;

    loop {
        match open_handle(path) {
            Ok(file) => return Ok(file),
            Err(e) if attempt >= attempts => return Err(e),
            Err(e) => {
                trace!(
                    "open {} failed (attempt {}/{}): {}",
                    path.display(),
                    attempt,
                    attempts,
                    e
                );
                attempt += 1;
                sleep(policy.spacing);
            }
        }
    }
}

#[cfg(unix)]
fn open_handle(path: &Path) -> io::Result<File> {
    use std::os::unix::fs::OpenOptionsExt;

    OpenOptions::new()
        .read(true)
        .custom_flags(nix::libc::O_NONBLOCK)
        .open(path)
}

#[cfg(not(unix))]
fn open_handle(path: &Path) -> io::Result<File> {
    OpenOptions::new().read(true).open(path)
}
