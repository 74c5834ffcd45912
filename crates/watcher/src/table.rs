//! Descriptor table: one entry per watched path

use crate::queue::Token;
use fwa_core::ChangeSet;
use std::collections::TryReserveError;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// A watched path, its current handle, and the changes seen since the last flush
#[derive(Debug)]
pub struct WatchedFile {
    /// Path exactly as the caller gave it
    path: PathBuf,
    /// Sole owner of the open handle; `None` once recovery gave up
    handle: Option<File>,
    pending: ChangeSet,
}

impl WatchedFile {
    pub fn new(path: impl Into<PathBuf>, handle: File) -> Self {
        Self {
            path: path.into(),
            handle: Some(handle),
            pending: ChangeSet::empty(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn handle(&self) -> Option<&File> {
        self.handle.as_ref()
    }

    /// Whether a live handle (and so a registration) backs this entry
    pub fn is_watched(&self) -> bool {
        self.handle.is_some()
    }

    pub fn pending(&self) -> ChangeSet {
        self.pending
    }

    pub fn record(&mut self, changes: ChangeSet) {
        self.pending |= changes;
    }

    /// Clear the pending set, returning what it held
    pub fn take_pending(&mut self) -> ChangeSet {
        self.pending.take()
    }

    pub(crate) fn take_handle(&mut self) -> Option<File> {
        self.handle.take()
    }

    pub(crate) fn install(&mut self, handle: File) {
        debug_assert!(self.handle.is_none(), "stale handle must be closed first");
        self.handle = Some(handle);
    }

    /// Whether the handle no longer names the file at `path`
    ///
    /// True when the handle's inode has no links left, or the path is
    /// gone or now resolves to a different inode. Entries without a
    /// handle are not orphaned; they are simply unwatched.
    pub fn is_orphaned(&self) -> bool {
        match &self.handle {
            Some(handle) => !names_file(handle, &self.path),
            None => false,
        }
    }
}

/// Whether `handle` is the live file currently found at `path`
pub(crate) fn names_file(handle: &File, path: &Path) -> bool {
    match (handle.metadata(), fs::metadata(path)) {
        (Ok(held), Ok(current)) => same_file(&held, &current),
        _ => false,
    }
}

#[cfg(unix)]
fn same_file(held: &fs::Metadata, current: &fs::Metadata) -> bool {
    use std::os::unix::fs::MetadataExt;

    held.nlink() > 0 && held.dev() == current.dev() && held.ino() == current.ino()
}

#[cfg(not(unix))]
fn same_file(held: &fs::Metadata, current: &fs::Metadata) -> bool {
    held.len() == current.len() && held.modified().ok() == current.modified().ok()
}

/// Ordered watch entries; an entry's index is its registration token
///
/// Built once at startup. Entries are mutated in place afterwards but
/// never added or removed, so tokens stay valid for the process lifetime.
#[derive(Debug, Default)]
pub struct WatchTable {
    entries: Vec<WatchedFile>,
}

impl WatchTable {
    /// Reserve room for `capacity` entries without aborting on failure
    pub fn with_capacity(capacity: usize) -> Result<Self, TryReserveError> {
        let mut entries = Vec::new();
        entries.try_reserve_exact(capacity)?;
        Ok(Self { entries })
    }

    /// Token the next pushed entry will get
    pub(crate) fn next_token(&self) -> Token {
        Token(self.entries.len())
    }

    pub(crate) fn push(&mut self, entry: WatchedFile) -> Token {
        let token = self.next_token();
        self.entries.push(entry);
        token
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, token: Token) -> Option<&WatchedFile> {
        self.entries.get(token.index())
    }

    pub fn get_mut(&mut self, token: Token) -> Option<&mut WatchedFile> {
        self.entries.get_mut(token.index())
    }

    /// Entries in registration order
    pub fn iter(&self) -> impl Iterator<Item = (Token, &WatchedFile)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, entry)| (Token(index), entry))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Token, &mut WatchedFile)> {
        self.entries
            .iter_mut()
            .enumerate()
            .map(|(index, entry)| (Token(index), entry))
    }

    /// Fold `changes` into the entry behind `token`
    ///
    /// Returns false if no entry has that token.
    pub fn record(&mut self, token: Token, changes: ChangeSet) -> bool {
        match self.get_mut(token) {
            Some(entry) => {
                entry.record(changes);
                true
            }
            None => false,
        }
    }

    /// Entries still backed by a live handle
    pub fn watched_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.is_watched()).count()
    }
}
