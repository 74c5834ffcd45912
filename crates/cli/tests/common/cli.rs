//! Helpers for driving the `fwa` binary
//!
//! `fwa` normally runs until killed, so besides one-shot execution this
//! module can spawn it and read report lines as they appear.

use anyhow::{bail, Context, Result};
use crossbeam_channel::{Receiver, RecvTimeoutError};
use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// Command builder for the fwa binary
pub struct FwaCommand {
    binary_path: PathBuf,
    working_dir: PathBuf,
    args: Vec<String>,
    env: HashMap<String, String>,
}

impl FwaCommand {
    /// Create a new command in the given working directory
    pub fn new(working_dir: impl AsRef<Path>) -> Self {
        Self {
            binary_path: PathBuf::from(env!("CARGO_BIN_EXE_fwa")),
            working_dir: working_dir.as_ref().to_path_buf(),
            args: Vec::new(),
            env: HashMap::new(),
        }
    }

    /// Add command arguments
    pub fn args(&mut self, args: &[&str]) -> &mut Self {
        self.args.extend(args.iter().map(|s| s.to_string()));
        self
    }

    /// Set environment variable
    pub fn env(&mut self, key: &str, value: &str) -> &mut Self {
        self.env.insert(key.to_string(), value.to_string());
        self
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.binary_path);
        command
            .args(&self.args)
            .current_dir(&self.working_dir)
            .env_remove("FWA_ON_MISSING")
            .envs(&self.env);
        command
    }

    /// Run to completion; only for invocations that are expected to exit
    pub fn execute(&self, timeout: Duration) -> Result<CommandResult> {
        let start = Instant::now();
        let mut child = self
            .command()
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .context("Failed to spawn fwa")?;

        loop {
            if let Some(status) = child.try_wait()? {
                let mut stdout = String::new();
                let mut stderr = String::new();
                if let Some(mut out) = child.stdout.take() {
                    out.read_to_string(&mut stdout)?;
                }
                if let Some(mut err) = child.stderr.take() {
                    err.read_to_string(&mut stderr)?;
                }
                return Ok(CommandResult {
                    stdout,
                    stderr,
                    exit_code: status.code().unwrap_or(-1),
                    duration: start.elapsed(),
                });
            }
            if start.elapsed() > timeout {
                let _ = child.kill();
                let _ = child.wait();
                bail!("fwa {:?} still running after {:?}", self.args, timeout);
            }
            thread::sleep(Duration::from_millis(20));
        }
    }

    /// Start fwa in the background and stream its report lines
    pub fn spawn(&self) -> Result<RunningFwa> {
        let mut child = self
            .command()
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .context("Failed to spawn fwa")?;

        let stdout = child.stdout.take().context("fwa stdout not captured")?;
        let (tx, lines) = crossbeam_channel::unbounded();
        thread::spawn(move || {
            for line in BufReader::new(stdout).lines() {
                match line {
                    Ok(line) => {
                        if tx.send(line).is_err() {
                            break;
                        }
                    }
                    Err(_) => break,
                }
            }
        });

        Ok(RunningFwa { child, lines })
    }
}

/// A background fwa process
pub struct RunningFwa {
    child: Child,
    lines: Receiver<String>,
}

impl RunningFwa {
    /// Wait for the next report line
    pub fn next_line(&self, timeout: Duration) -> Result<String> {
        match self.lines.recv_timeout(timeout) {
            Ok(line) => Ok(line),
            Err(RecvTimeoutError::Timeout) => bail!("no report line within {:?}", timeout),
            Err(RecvTimeoutError::Disconnected) => bail!("fwa closed its stdout"),
        }
    }

    /// Assert nothing is reported for `period`
    pub fn expect_silence(&self, period: Duration) -> Result<()> {
        match self.lines.recv_timeout(period) {
            Ok(line) => bail!("unexpected report line: {}", line),
            Err(_) => Ok(()),
        }
    }

    /// Whether the process is still running
    pub fn is_running(&mut self) -> Result<bool> {
        Ok(self.child.try_wait()?.is_none())
    }
}

impl Drop for RunningFwa {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Result of a completed run
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub duration: Duration,
}

impl CommandResult {
    /// Check if stderr contains text
    pub fn contains_stderr(&self, text: &str) -> bool {
        self.stderr.contains(text)
    }
}

/// Macro for convenient command construction
///
/// Usage:
/// ```
/// fwa!(dir, "--on-missing", "skip", "a.txt").spawn()?;
/// ```
#[macro_export]
macro_rules! fwa {
    ($dir:expr $(, $arg:expr)*) => {{
        let mut cmd = $crate::common::cli::FwaCommand::new($dir);
        cmd.args(&[$($arg),*]);
        cmd
    }};
}
