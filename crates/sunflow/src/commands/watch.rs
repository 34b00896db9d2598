//! Continuous polling with live snapshot output.

use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use sunflow_core::{Coordinator, PollEvent};

use crate::cli::{GlobalOpts, WatchArgs};
use crate::commands::build_poller_config;
use crate::error::CliError;
use crate::output::{print_output, render_snapshot};

pub async fn handle(args: WatchArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let config = build_poller_config(global)?;
    let interval = config.poll_interval;

    let coordinator = Coordinator::new(config)?;
    let mut events = coordinator.events();

    coordinator.start().await?;
    info!(interval_secs = interval.as_secs(), "watching; Ctrl-C to stop");

    // The first refresh already ran inside start().
    print_output(
        &render_snapshot(&global.output, &coordinator.snapshot()),
        global.quiet,
    );
    let mut updates: u64 = 1;

    loop {
        if args.cycles.is_some_and(|limit| updates >= limit) {
            break;
        }

        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = events.recv() => match event {
                Ok(PollEvent::Updated { new_ids }) => {
                    updates += 1;
                    if !new_ids.is_empty() {
                        info!(?new_ids, "new readings discovered");
                    }
                    print_output(
                        &render_snapshot(&global.output, &coordinator.snapshot()),
                        global.quiet,
                    );
                }
                // Discovery details are folded into the Updated output.
                Ok(PollEvent::ReadingDiscovered { .. }) => {}
                Ok(PollEvent::UpdateFailed { message }) => {
                    warn!(%message, "update failed; keeping last snapshot");
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "event stream lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
    }

    coordinator.stop().await;
    Ok(())
}
