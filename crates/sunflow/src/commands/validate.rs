//! Setup-time credential validation.

use sunflow_core::Coordinator;

use crate::cli::GlobalOpts;
use crate::commands::build_poller_config;
use crate::error::CliError;
use crate::output::print_output;

/// Perform one authentication round-trip (cloud-direct mode) or a
/// structural check (api mode), without starting a poller.
pub async fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let config = build_poller_config(global)?;
    Coordinator::validate(&config).await?;

    print_output(
        &format!("configuration OK ({} mode)", config.source.mode_name()),
        global.quiet,
    );
    Ok(())
}
