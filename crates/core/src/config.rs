//! Engine configuration

use crate::retry::RetryPolicy;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Quiet interval after which pending changes are flushed
///
/// Fixed: the window is what coalesces bursts into one line per path.
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(500);

/// What to do with a path that cannot be opened at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingFilePolicy {
    /// Fail registration as a whole
    #[default]
    Abort,
    /// Warn and watch the remaining paths
    Skip,
}

impl MissingFilePolicy {
    pub const fn as_str(self) -> &'static str {
        match self {
            MissingFilePolicy::Abort => "abort",
            MissingFilePolicy::Skip => "skip",
        }
    }
}

impl fmt::Display for MissingFilePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MissingFilePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "abort" => Ok(MissingFilePolicy::Abort),
            "skip" => Ok(MissingFilePolicy::Skip),
            other => Err(format!(
                "unknown missing-file policy '{}' (expected 'abort' or 'skip')",
                other
            )),
        }
    }
}

/// Settings shared by the registrar and the recovery policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WatchConfig {
    /// Retry budget for every open, initial or recovery
    pub retry: RetryPolicy,
    /// Initial-open failure handling
    pub on_missing: MissingFilePolicy,
}

impl WatchConfig {
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_missing_policy(mut self, on_missing: MissingFilePolicy) -> Self {
        self.on_missing = on_missing;
        self
    }
}
