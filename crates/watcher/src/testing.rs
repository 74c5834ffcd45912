//! Scripted in-memory event queue for unit tests

use crate::queue::{EventQueue, Notification, QueueError, Token};
use std::collections::VecDeque;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::Duration;

enum Wakeup {
    Deliver(Vec<Notification>),
    Fail,
}

/// Queue that replays scripted wake-ups; an empty script times out
#[derive(Default)]
pub struct ScriptedQueue {
    script: VecDeque<Wakeup>,
    live: Vec<(Token, PathBuf)>,
    deregistered: Vec<Token>,
    registrations: usize,
    reject: bool,
    /// Registrations left that swap a new file in at the path afterwards
    swaps: u32,
    waits: usize,
}

impl ScriptedQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next wait delivers `notifications` in this order
    pub fn deliver(&mut self, notifications: impl IntoIterator<Item = Notification>) -> &mut Self {
        self.script
            .push_back(Wakeup::Deliver(notifications.into_iter().collect()));
        self
    }

    /// Next wait fails
    pub fn fail_next_wait(&mut self) -> &mut Self {
        self.script.push_back(Wakeup::Fail);
        self
    }

    pub fn reject_registrations(&mut self, reject: bool) {
        self.reject = reject;
    }

    /// The next `count` successful registrations each put a new inode at
    /// the registered path, as if the file was replaced mid-registration
    pub fn replace_after_register(&mut self, count: u32) {
        self.swaps = count;
    }

    /// Tokens with a live registration, in registration order
    pub fn registered(&self) -> Vec<Token> {
        self.live.iter().map(|(token, _)| *token).collect()
    }

    pub fn deregistered(&self) -> &[Token] {
        &self.deregistered
    }

    /// Successful `register` calls so far
    pub fn registrations(&self) -> usize {
        self.registrations
    }

    pub fn waits(&self) -> usize {
        self.waits
    }
}

impl EventQueue for ScriptedQueue {
    fn register(&mut self, token: Token, path: &Path, _handle: &File) -> Result<(), QueueError> {
        if self.reject {
            return Err(QueueError::Register {
                path: path.to_path_buf(),
                reason: "rejected by script".to_string(),
            });
        }
        self.live.retain(|(t, _)| *t != token);
        self.live.push((token, path.to_path_buf()));
        self.registrations += 1;
        if self.swaps > 0 {
            self.swaps -= 1;
            replace_file(path);
        }
        Ok(())
    }

    fn deregister(&mut self, token: Token, path: &Path) -> Result<(), QueueError> {
        let before = self.live.len();
        self.live.retain(|(t, _)| *t != token);
        if self.live.len() == before {
            return Err(QueueError::Deregister {
                path: path.to_path_buf(),
                reason: "not registered".to_string(),
            });
        }
        self.deregistered.push(token);
        Ok(())
    }

    fn wait(&mut self, _timeout: Duration, out: &mut Vec<Notification>) -> Result<(), QueueError> {
        self.waits += 1;
        match self.script.pop_front() {
            Some(Wakeup::Deliver(batch)) => {
                out.extend(batch);
                Ok(())
            }
            Some(Wakeup::Fail) => Err(QueueError::Wait("scripted failure".to_string())),
            None => Ok(()),
        }
    }
}

fn replace_file(path: &Path) {
    let staged = path.with_extension("replacement");
    fs::write(&staged, b"replacement").expect("stage replacement");
    fs::rename(&staged, path).expect("swap replacement in");
}
