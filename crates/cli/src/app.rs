//! Startup sequence and hand-off to the event loop

use crate::args::Cli;
use crate::exit::{ExitStatus, Fatal};
use crate::sandbox;
use fwa_watcher::{register_all, DefaultQueue, EventLoop};
use std::convert::Infallible;
use std::io;
use tracing::info;

/// Register every path, drop privileges, and run the loop on stdout
///
/// Never returns successfully; the loop runs until the process is killed.
pub fn run(cli: Cli) -> Result<Infallible, Fatal> {
    let config = cli.config();

    let mut queue = DefaultQueue::new()?;
    let table = register_all(&cli.paths, &mut queue, &config)?;
    let mut event_loop = EventLoop::new(queue, table, &config)?;

    sandbox::restrict().map_err(|e| {
        Fatal::new(
            ExitStatus::Privilege,
            format!("unable to restrict privileges: {}", e),
        )
    })?;

    info!(
        "Reporting changes to {} files",
        event_loop.table().watched_count()
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    Ok(event_loop.run(&mut out)?)
}
