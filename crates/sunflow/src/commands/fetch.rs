//! One-shot snapshot fetch.

use std::time::Duration;

use sunflow_core::Coordinator;

use crate::cli::{FetchArgs, GlobalOpts};
use crate::commands::build_poller_config;
use crate::error::CliError;
use crate::output::{print_output, render_reading, render_snapshot};

pub async fn handle(args: FetchArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let mut config = build_poller_config(global)?;
    // One request-response cycle: disable the background loop.
    config.poll_interval = Duration::ZERO;

    let coordinator = Coordinator::new(config)?;
    coordinator.start().await?;

    let snapshot = coordinator.snapshot();
    let rendered = match args.id {
        Some(ref id) => {
            let reading = snapshot
                .get(id)
                .ok_or_else(|| CliError::ReadingNotFound { id: id.clone() })?;
            render_reading(&global.output, reading)
        }
        None => render_snapshot(&global.output, &snapshot),
    };

    print_output(&rendered, global.quiet);
    coordinator.stop().await;
    Ok(())
}
