//! Event queue backed by the `notify` crate's recommended watcher

use crate::queue::{EventQueue, Notification, QueueError, Token};
use crossbeam_channel::{Receiver, RecvTimeoutError};
use fwa_core::{ChangeKind, ChangeSet};
use notify::event::{AccessKind, AccessMode, DataChange, Event, EventKind, ModifyKind};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use std::{env, fs, io};
use tracing::{trace, warn};

/// Map a backend event kind onto the change kinds we track
///
/// Plain accesses map to the empty set and are dropped.
pub fn classify(kind: &EventKind) -> ChangeSet {
    match kind {
        EventKind::Remove(_) => ChangeKind::Delete.into(),
        EventKind::Create(_) => ChangeKind::Link.into(),
        EventKind::Modify(ModifyKind::Data(DataChange::Size)) => ChangeKind::Extend.into(),
        EventKind::Modify(ModifyKind::Data(_))
        | EventKind::Modify(ModifyKind::Any)
        | EventKind::Modify(ModifyKind::Other) => ChangeKind::Write.into(),
        EventKind::Modify(ModifyKind::Metadata(_)) => ChangeKind::Attrib.into(),
        EventKind::Modify(ModifyKind::Name(_)) => ChangeKind::Rename.into(),
        EventKind::Access(AccessKind::Close(AccessMode::Write)) => ChangeKind::Write.into(),
        EventKind::Access(_) => ChangeSet::empty(),
        EventKind::Any => ChangeKind::Write.into(),
        EventKind::Other => ChangeKind::Revoke.into(),
    }
}

/// `notify` watcher plus the channel its delivery thread feeds
pub struct NotifyQueue {
    watcher: RecommendedWatcher,
    events: Receiver<notify::Result<Event>>,
    /// Reported path -> tokens watching it (absolute and canonical forms)
    tokens: HashMap<PathBuf, Vec<Token>>,
}

impl NotifyQueue {
    pub fn new() -> Result<Self, QueueError> {
        let (tx, events) = crossbeam_channel::unbounded();
        let watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            // Receiver gone means the queue was dropped; nothing to tell
            let _ = tx.send(res);
        })
        .map_err(|e| QueueError::Create(e.to_string()))?;

        Ok(Self {
            watcher,
            events,
            tokens: HashMap::new(),
        })
    }

    fn lookup(&self, path: &Path) -> Option<&[Token]> {
        if let Some(tokens) = self.tokens.get(path) {
            return Some(tokens.as_slice());
        }
        let canonical = fs::canonicalize(path).ok()?;
        self.tokens.get(&canonical).map(Vec::as_slice)
    }

    fn deliver(
        &self,
        received: notify::Result<Event>,
        out: &mut Vec<Notification>,
    ) -> Result<(), QueueError> {
        let event = received.map_err(|e| QueueError::Wait(e.to_string()))?;

        if event.need_rescan() {
            warn!("Event backend dropped notifications; some changes may go unreported");
        }

        let changes = classify(&event.kind);
        if changes.is_empty() {
            trace!("Ignoring {:?} on {:?}", event.kind, event.paths);
            return Ok(());
        }

        for path in &event.paths {
            match self.lookup(path) {
                Some(tokens) => {
                    out.extend(tokens.iter().map(|token| Notification::new(*token, changes)));
                }
                None => trace!("Ignoring {} for unwatched {}", changes, path.display()),
            }
        }
        Ok(())
    }
}

impl EventQueue for NotifyQueue {
    fn register(&mut self, token: Token, path: &Path, _handle: &File) -> Result<(), QueueError> {
        self.watcher
            .watch(path, RecursiveMode::NonRecursive)
            .map_err(|e| QueueError::Register {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        for key in lookup_keys(path) {
            let tokens = self.tokens.entry(key).or_default();
            if !tokens.contains(&token) {
                tokens.push(token);
            }
        }
        Ok(())
    }

    fn deregister(&mut self, token: Token, path: &Path) -> Result<(), QueueError> {
        for tokens in self.tokens.values_mut() {
            tokens.retain(|t| *t != token);
        }
        self.tokens.retain(|_, tokens| !tokens.is_empty());

        // Another entry for the same path keeps the backend watch alive
        let shared = lookup_keys(path)
            .iter()
            .any(|key| self.tokens.contains_key(key));
        if shared {
            return Ok(());
        }

        self.watcher
            .unwatch(path)
            .map_err(|e| QueueError::Deregister {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
    }

    fn wait(&mut self, timeout: Duration, out: &mut Vec<Notification>) -> Result<(), QueueError> {
        let deadline = Instant::now() + timeout;
        let before = out.len();

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let received = match self.events.recv_timeout(remaining) {
                Ok(received) => received,
                Err(RecvTimeoutError::Timeout) => return Ok(()),
                Err(RecvTimeoutError::Disconnected) => return Err(QueueError::Disconnected),
            };
            self.deliver(received, out)?;

            while let Ok(received) = self.events.try_recv() {
                self.deliver(received, out)?;
            }

            // Only attributable notifications end the wait early
            if out.len() > before {
                return Ok(());
            }
        }
    }
}

/// Forms under which the backend may report `path`
fn lookup_keys(path: &Path) -> Vec<PathBuf> {
    let mut keys = Vec::with_capacity(2);
    if let Ok(absolute) = absolute(path) {
        keys.push(absolute);
    }
    if let Ok(canonical) = fs::canonicalize(path) {
        if !keys.contains(&canonical) {
            keys.push(canonical);
        }
    }
    keys
}

fn absolute(path: &Path) -> io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(env::current_dir()?.join(path))
    }
}
