//! Command line arguments

use clap::{Parser, ValueEnum};
use fwa_core::{MissingFilePolicy, WatchConfig};
use std::path::PathBuf;

/// fwa - print the files that changed, one line per file per burst
#[derive(Parser, Debug)]
#[command(name = "fwa")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// What to do with a file that cannot be opened at startup
    #[arg(long, value_enum, env = "FWA_ON_MISSING", default_value_t = OnMissing::Abort)]
    pub on_missing: OnMissing,

    /// Files to watch
    #[arg(required = true, value_name = "PATH")]
    pub paths: Vec<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OnMissing {
    /// Exit with an error
    Abort,
    /// Warn and watch the remaining files
    Skip,
}

impl From<OnMissing> for MissingFilePolicy {
    fn from(value: OnMissing) -> Self {
        match value {
            OnMissing::Abort => MissingFilePolicy::Abort,
            OnMissing::Skip => MissingFilePolicy::Skip,
        }
    }
}

impl Cli {
    /// Engine settings for these arguments
    pub fn config(&self) -> WatchConfig {
        WatchConfig::default().with_missing_policy(self.on_missing.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn test_paths_keep_their_order() {
        let cli = Cli::try_parse_from(["fwa", "b.txt", "./a.txt", "/etc/hosts"]).unwrap();
        assert_eq!(
            cli.paths,
            vec![
                PathBuf::from("b.txt"),
                PathBuf::from("./a.txt"),
                PathBuf::from("/etc/hosts")
            ]
        );
        assert_eq!(cli.config().on_missing, MissingFilePolicy::Abort);
    }

    #[test]
    fn test_at_least_one_path() {
        let err = Cli::try_parse_from(["fwa"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
        assert!(err.use_stderr());
    }

    #[test]
    fn test_skip_policy_flag() {
        let cli = Cli::try_parse_from(["fwa", "--on-missing", "skip", "a"]).unwrap();
        assert_eq!(cli.on_missing, OnMissing::Skip);
        assert_eq!(cli.config().on_missing, MissingFilePolicy::Skip);
    }

    #[test]
    fn test_unknown_policy_rejected() {
        let err = Cli::try_parse_from(["fwa", "--on-missing", "retry", "a"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
    }

    #[test]
    fn test_help_is_not_an_error_stream() {
        let err = Cli::try_parse_from(["fwa", "--help"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
        assert!(!err.use_stderr());
    }
}
