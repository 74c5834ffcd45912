//! fwa command line front end
//!
//! Parses arguments, wires the watch engine to stdout, and maps fatal
//! errors onto exit codes.

pub mod app;
pub mod args;
pub mod exit;
pub mod sandbox;

pub use args::Cli;
pub use exit::{ExitStatus, Fatal};
