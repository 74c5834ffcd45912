//! fwa - file watch & announce

use clap::Parser;
use fwa_cli::{app, Cli, ExitStatus};
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version land here too
            let code = if e.use_stderr() {
                ExitStatus::Usage.code()
            } else {
                0
            };
            let _ = e.print();
            process::exit(code);
        }
    };

    init_tracing();

    match app::run(cli) {
        Ok(never) => match never {},
        Err(fatal) => {
            eprintln!("fwa: {}", fatal);
            process::exit(fatal.code());
        }
    }
}

/// Log to stderr; stdout carries the reports
fn init_tracing() {
    let filter = EnvFilter::try_from_env("FWA_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
