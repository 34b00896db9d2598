pub mod config_cmd;
pub mod fetch;
pub mod validate;
pub mod watch;

use sunflow_core::PollerConfig;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Route a command that needs a poller configuration.
pub async fn dispatch(command: Command, global: &GlobalOpts) -> Result<(), CliError> {
    match command {
        Command::Fetch(args) => fetch::handle(args, global).await,
        Command::Watch(args) => watch::handle(args, global).await,
        Command::Validate => validate::handle(global).await,
        // Config and Completions are handled in main before dispatch.
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}

/// Build a `PollerConfig` from the config file and the active profile.
pub fn build_poller_config(global: &GlobalOpts) -> Result<PollerConfig, CliError> {
    let cfg = sunflow_config::load_config_or_default();
    let name = sunflow_config::active_profile_name(global.profile.as_deref(), &cfg);

    let Some(profile) = cfg.profiles.get(&name) else {
        let mut available: Vec<&str> = cfg.profiles.keys().map(String::as_str).collect();
        available.sort_unstable();
        return Err(CliError::ProfileNotFound {
            name,
            available: if available.is_empty() {
                "(none)".into()
            } else {
                available.join(", ")
            },
        });
    };

    sunflow_config::profile_to_poller_config(profile, &name).map_err(Into::into)
}
