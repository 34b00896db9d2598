//! Configuration inspection.

use crate::cli::{ConfigAction, ConfigArgs, GlobalOpts};
use crate::error::CliError;
use crate::output::print_output;

pub fn handle(args: &ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.action {
        ConfigAction::Path => {
            print_output(
                &sunflow_config::config_path().display().to_string(),
                global.quiet,
            );
            Ok(())
        }
        ConfigAction::Show => {
            let mut config = sunflow_config::load_config_or_default();

            // Never echo secret material back to a terminal.
            for profile in config.profiles.values_mut() {
                redact(&mut profile.password);
                redact(&mut profile.app_secret);
                redact(&mut profile.token);
            }

            let rendered =
                toml::to_string_pretty(&config).map_err(|e| CliError::Serialize(e.to_string()))?;
            print_output(&rendered, global.quiet);
            Ok(())
        }
    }
}

fn redact(field: &mut Option<String>) {
    if field.is_some() {
        *field = Some("[redacted]".into());
    }
}
