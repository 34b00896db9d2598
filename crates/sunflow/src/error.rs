//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use sunflow_config::ConfigError;
use sunflow_core::CoreError;

/// Exit codes for process termination.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(sunflow::auth_failed),
        help(
            "Verify the app id/secret, account email and password in your profile.\n\
             Run: sunflow validate"
        )
    )]
    AuthFailed { message: String },

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(sunflow::no_credentials),
        help(
            "Add credentials to your profile, store them in the keyring,\n\
             or set SUNFLOW_PASSWORD / the configured *_env variables."
        )
    )]
    NoCredentials { profile: String },

    // ── Fetching ─────────────────────────────────────────────────────
    #[error("Update failed: {message}")]
    #[diagnostic(
        code(sunflow::update_failed),
        help("The endpoint may be down or unreachable. Retry later or check -v logs.")
    )]
    UpdateFailed { message: String },

    #[error("Could not reach the endpoint: {message}")]
    #[diagnostic(
        code(sunflow::connection_failed),
        help("Check network connectivity and the configured URL/region.")
    )]
    ConnectionFailed { message: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("Reading '{id}' not present in the current snapshot")]
    #[diagnostic(
        code(sunflow::reading_not_found),
        help("Run: sunflow fetch to list all available reading ids")
    )]
    ReadingNotFound { id: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(sunflow::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(sunflow::profile_not_found),
        help("Available profiles: {available}")
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Configuration file problem: {message}")]
    #[diagnostic(
        code(sunflow::config),
        help("Expected a TOML config at: {path}")
    )]
    Config { message: String, path: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Serialization failed: {0}")]
    #[diagnostic(code(sunflow::serialize))]
    Serialize(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::ReadingNotFound { .. } | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        // Classify terminal failures by their root cause so that, e.g.,
        // three failed auth attempts still exit with the auth code.
        match err.root() {
            CoreError::AuthenticationFailed { message } => CliError::AuthFailed {
                message: message.clone(),
            },
            CoreError::Transport { message } => CliError::ConnectionFailed {
                message: message.clone(),
            },
            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "config".into(),
                reason: message.clone(),
            },
            CoreError::Config { message } => CliError::Config {
                message: message.clone(),
                path: sunflow_config::config_path().display().to_string(),
            },
            _ => CliError::UpdateFailed {
                message: err.to_string(),
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::MissingField { field, profile } => CliError::Validation {
                field,
                reason: format!("required by profile '{profile}' but not set"),
            },
            other => CliError::Config {
                message: other.to_string(),
                path: sunflow_config::config_path().display().to_string(),
            },
        }
    }
}
