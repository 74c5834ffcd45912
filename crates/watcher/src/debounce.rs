//! Event loop with timeout-driven debouncing
//!
//! Every wake-up that delivers notifications only folds their change kinds
//! into the table. A wait that times out means the files have been quiet
//! for a whole `DEBOUNCE_WINDOW`: that is the flush point. Any number of
//! notifications between two flushes yields at most one line per path.

use crate::queue::{EventQueue, Notification, QueueError};
use crate::recovery::{recover, RecoveryOutcome};
use crate::report::{write_line, Report};
use crate::table::WatchTable;
use fwa_core::{RetryPolicy, WatchConfig, DEBOUNCE_WINDOW};
use std::convert::Infallible;
use std::io::{self, Write};
use thiserror::Error;
use tracing::{debug, trace};

/// Fatal event loop failures
#[derive(Error, Debug)]
pub enum LoopError {
    /// The wait itself failed
    #[error(transparent)]
    Queue(#[from] QueueError),

    /// Report lines could not be written
    #[error("unable to write report: {0}")]
    Output(#[source] io::Error),
}

/// What one wake-up did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Turn {
    /// This many notifications were recorded
    Notified(usize),
    /// The window expired quietly and pending changes were flushed
    Flushed(Report),
}

/// Drives a watch table from an event queue
pub struct EventLoop<Q> {
    queue: Q,
    table: WatchTable,
    retry: RetryPolicy,
    /// Notification buffer, reserved once for the whole table
    events: Vec<Notification>,
}

impl<Q: EventQueue> EventLoop<Q> {
    pub fn new(queue: Q, table: WatchTable, config: &WatchConfig) -> Result<Self, QueueError> {
        let mut events = Vec::new();
        events
            .try_reserve_exact(table.len())
            .map_err(|_| QueueError::EventMemory(table.len()))?;

        Ok(Self {
            queue,
            table,
            retry: config.retry,
            events,
        })
    }

    pub fn table(&self) -> &WatchTable {
        &self.table
    }

    pub fn queue(&self) -> &Q {
        &self.queue
    }

    pub fn queue_mut(&mut self) -> &mut Q {
        &mut self.queue
    }

    /// Wait once and act on the outcome
    pub fn turn<W: Write + ?Sized>(&mut self, out: &mut W) -> Result<Turn, LoopError> {
        self.events.clear();
        self.queue.wait(DEBOUNCE_WINDOW, &mut self.events)?;

        if self.events.is_empty() {
            return self.flush(&mut *out).map(Turn::Flushed);
        }

        let count = self.events.len();
        for notification in self.events.drain(..) {
            if !self.table.record(notification.token, notification.changes) {
                trace!("Notification for unknown token {}", notification.token);
            }
        }
        trace!("Recorded {} notifications", count);
        Ok(Turn::Notified(count))
    }

    /// Report and clear every entry with pending changes, in table order
    ///
    /// Each line is written (and flushed) before the entry goes through
    /// recovery, so a slow reopen never delays the line announcing it.
    pub fn flush<W: Write + ?Sized>(&mut self, out: &mut W) -> Result<Report, LoopError> {
        let mut report = Report::default();

        for (token, entry) in self.table.iter_mut() {
            let changes = entry.pending();
            if changes.is_empty() {
                continue;
            }

            write_line(&mut *out, entry.path()).map_err(LoopError::Output)?;
            report.push(entry.path().to_path_buf());

            match recover(entry, token, changes, &mut self.queue, &self.retry) {
                RecoveryOutcome::Untouched => {}
                outcome => debug!("{}: {:?}", entry.path().display(), outcome),
            }
            entry.take_pending();
        }

        if !report.is_empty() {
            debug!("Reported {} changed files", report.len());
        }
        Ok(report)
    }

    /// Turn forever; returns only on a fatal error
    pub fn run<W: Write + ?Sized>(&mut self, out: &mut W) -> Result<Infallible, LoopError> {
        debug!(
            "Entering event loop for {} files (window {:?})",
            self.table.len(),
            DEBOUNCE_WINDOW
        );
        loop {
            self.turn(&mut *out)?;
        }
    }
}
