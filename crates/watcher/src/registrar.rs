//! Watch registrar: open every requested path and register it

use crate::queue::{EventQueue, QueueError, Token};
use crate::table::{names_file, WatchTable, WatchedFile};
use fwa_core::{open_with_retry, MissingFilePolicy, RetryPolicy, WatchConfig};
use std::collections::TryReserveError;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Registration failures; every one of them is fatal
#[derive(Error, Debug)]
pub enum RegisterError {
    /// Nothing to watch (no paths given, or every path was skipped)
    #[error("no files to watch")]
    NoPaths,

    /// Descriptor table storage could not be reserved
    #[error("unable to allocate descriptors for {count} files: {source}")]
    TableAllocation {
        count: usize,
        #[source]
        source: TryReserveError,
    },

    /// A path stayed unopenable for the whole retry budget
    #[error("unable to open file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Queue(#[from] QueueError),
}

/// Build the watch table for `paths` and register each entry with `queue`
///
/// Tokens follow the order of `paths` (minus skipped ones). On error the
/// partially filled table is dropped and its handles closed; callers must
/// not keep using `queue` for an event loop.
pub fn register_all<Q, P>(
    paths: &[P],
    queue: &mut Q,
    config: &WatchConfig,
) -> Result<WatchTable, RegisterError>
where
    Q: EventQueue + ?Sized,
    P: AsRef<Path>,
{
    if paths.is_empty() {
        return Err(RegisterError::NoPaths);
    }

    let mut table =
        WatchTable::with_capacity(paths.len()).map_err(|source| RegisterError::TableAllocation {
            count: paths.len(),
            source,
        })?;

    for path in paths {
        let path = path.as_ref();
        let token = table.next_token();
        let handle = match open_and_register(token, path, queue, &config.retry) {
            Ok(handle) => handle,
            Err(RegisterError::Open { source, .. })
                if config.on_missing == MissingFilePolicy::Skip =>
            {
                warn!("Not watching {}: {}", path.display(), source);
                continue;
            }
            Err(e) => return Err(e),
        };

        debug!("Watching {} as {}", path.display(), token);
        table.push(WatchedFile::new(path, handle));
    }

    if table.is_empty() {
        return Err(RegisterError::NoPaths);
    }

    info!("Watching {} of {} files", table.len(), paths.len());
    Ok(table)
}

/// Open `path` and register it under `token`
///
/// The facility watches by path, so the file may be swapped between the
/// open and the registration. The returned handle is checked against the
/// file at `path` afterwards; on a mismatch the registration is dropped and
/// both steps are repeated, at most `retry.attempts` times.
pub(crate) fn open_and_register<Q>(
    token: Token,
    path: &Path,
    queue: &mut Q,
    retry: &RetryPolicy,
) -> Result<File, RegisterError>
where
    Q: EventQueue + ?Sized,
{
    let attempts = retry.attempts.max(1);

    for attempt in 1..=attempts {
        let handle = open_with_retry(path, retry).map_err(|source| RegisterError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        queue.register(token, path, &handle)?;

        if names_file(&handle, path) {
            return Ok(handle);
        }

        debug!(
            "{} replaced while registering (attempt {}/{})",
            path.display(),
            attempt,
            attempts
        );
        if let Err(e) = queue.deregister(token, path) {
            debug!("Dropping registration for {}: {}", path.display(), e);
        }
    }

    Err(RegisterError::Open {
        path: path.to_path_buf(),
        source: io::Error::new(io::ErrorKind::Other, "file kept being replaced"),
    })
}
