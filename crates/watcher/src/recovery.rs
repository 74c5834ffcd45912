//! Recovery policy: re-open paths whose inode went away
//!
//! Registrations follow the inode, not the path. Once a watched file is
//! deleted or renamed away (including the write-new-then-rename dance of
//! editors and deploy tools) the old handle is useless, so the path is
//! opened again and the new handle registered under the same token.

use crate::queue::{EventQueue, Token};
use crate::registrar::open_and_register;
use crate::table::WatchedFile;
use fwa_core::{ChangeKind, ChangeSet, RetryPolicy};
use std::fs::File;
use std::io;
use tracing::{debug, info, trace, warn};

/// What recovery did with an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryOutcome {
    /// Handle still names the file at the path
    Untouched,
    /// Stale handle replaced and registered again
    Reopened,
    /// Entry is unregistered and stays that way
    Abandoned,
}

/// Whether the flushed `changes` mean `entry`'s handle has to be replaced
///
/// Some facilities report an unlink of a file we still hold open only as a
/// link-count or attribute change, so those are checked against the
/// filesystem.
pub fn needs_recovery(entry: &WatchedFile, changes: ChangeSet) -> bool {
    if changes.invalidates_handle() {
        return true;
    }
    changes.intersects(ChangeKind::Attrib | ChangeKind::Link) && entry.is_orphaned()
}

/// Apply the recovery policy to an entry that was just flushed
///
/// Failures are logged and absorbed; the worst case is an abandoned entry.
pub fn recover<Q>(
    entry: &mut WatchedFile,
    token: Token,
    changes: ChangeSet,
    queue: &mut Q,
    retry: &RetryPolicy,
) -> RecoveryOutcome
where
    Q: EventQueue + ?Sized,
{
    if !needs_recovery(entry, changes) {
        return RecoveryOutcome::Untouched;
    }

    let Some(stale) = entry.take_handle() else {
        trace!("{} already unwatched", entry.path().display());
        return RecoveryOutcome::Abandoned;
    };

    debug!("Recovering {} after {}", entry.path().display(), changes);

    if let Err(e) = queue.deregister(token, entry.path()) {
        debug!("Dropping stale registration for {}: {}", entry.path().display(), e);
    }
    if let Err(e) = close(stale) {
        warn!("Failed to close stale handle for {}: {}", entry.path().display(), e);
    }

    let handle = match open_and_register(token, entry.path(), queue, retry) {
        Ok(handle) => handle,
        Err(e) => {
            warn!("No longer watching {}: {}", entry.path().display(), e);
            return RecoveryOutcome::Abandoned;
        }
    };

    entry.install(handle);
    info!("Watching new file at {}", entry.path().display());
    RecoveryOutcome::Reopened
}

#[cfg(unix)]
fn close(handle: File) -> io::Result<()> {
    use std::os::unix::io::IntoRawFd;

    nix::unistd::close(handle.into_raw_fd()).map_err(io::Error::from)
}

#[cfg(not(unix))]
fn close(handle: File) -> io::Result<()> {
    drop(handle);
    Ok(())
}
