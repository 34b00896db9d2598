//! Profile configuration for the sunflow CLI.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext),
//! and translation to `sunflow_core::PollerConfig`. The core crate
//! never reads config files -- everything on disk stops here.

use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use sunflow_core::{CloudCredentials, FetchSource, PollerConfig, Region};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("missing {field} for profile '{profile}'")]
    MissingField { field: String, profile: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named poller profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            poll_interval: default_poll_interval(),
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_poll_interval() -> u64 {
    60
}
fn default_timeout() -> u64 {
    20
}

/// A named poller profile.
///
/// `mode` selects which field group applies: `"api"` uses
/// `url`/`token`, `"cloud_direct"` uses the cloud credential fields.
#[derive(Debug, Deserialize, Serialize)]
pub struct Profile {
    /// Fetch mode: "api" or "cloud_direct".
    #[serde(default = "default_mode")]
    pub mode: String,

    // ── api mode ────────────────────────────────────────────────────
    /// Text feed URL.
    pub url: Option<String>,

    /// Static bearer token for the feed (plaintext — prefer keyring or env).
    pub token: Option<String>,

    /// Environment variable name containing the bearer token.
    pub token_env: Option<String>,

    // ── cloud_direct mode ───────────────────────────────────────────
    pub app_id: Option<String>,

    /// App secret (plaintext — prefer keyring or env).
    pub app_secret: Option<String>,

    /// Environment variable name containing the app secret.
    pub app_secret_env: Option<String>,

    pub email: Option<String>,

    /// Account password (plaintext — prefer keyring or `SUNFLOW_PASSWORD`).
    pub password: Option<String>,

    pub device_serial: Option<String>,

    /// Regional server: "eu1" or "us1".
    pub region: Option<String>,

    // ── shared tuning ───────────────────────────────────────────────
    /// Poll interval in seconds (5–3600 for api, 10–3600 for cloud).
    pub poll_interval: Option<u64>,

    /// Request timeout in seconds.
    pub timeout: Option<u64>,
}

fn default_mode() -> String {
    "cloud_direct".into()
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("io", "sunflow", "sunflow").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("sunflow");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    let path = config_path();

    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .merge(Env::prefixed("SUNFLOW_").split("_"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    let path = config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(&path, toml_str)?;
    Ok(())
}

// ── Profile selection ───────────────────────────────────────────────

/// Resolve the active profile name: explicit flag, then the config's
/// `default_profile`, then "default".
pub fn active_profile_name(explicit: Option<&str>, config: &Config) -> String {
    explicit
        .map(str::to_owned)
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

// ── Credential resolution ───────────────────────────────────────────

/// Look up a secret in the system keyring, ignoring lookup failures
/// (absent keyring backends fall through to the next chain step).
fn keyring_secret(profile_name: &str, slot: &str) -> Option<String> {
    let entry = keyring::Entry::new("sunflow", &format!("{profile_name}/{slot}")).ok()?;
    entry.get_password().ok()
}

/// Resolve the account password: `SUNFLOW_PASSWORD` env var, then
/// keyring, then plaintext in the profile.
pub fn resolve_password(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    if let Ok(pw) = std::env::var("SUNFLOW_PASSWORD") {
        return Ok(SecretString::from(pw));
    }

    if let Some(pw) = keyring_secret(profile_name, "password") {
        return Ok(SecretString::from(pw));
    }

    if let Some(ref pw) = profile.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Resolve the app secret: profile's `app_secret_env`, then keyring,
/// then plaintext.
pub fn resolve_app_secret(
    profile: &Profile,
    profile_name: &str,
) -> Result<SecretString, ConfigError> {
    if let Some(ref env_name) = profile.app_secret_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    if let Some(secret) = keyring_secret(profile_name, "app-secret") {
        return Ok(SecretString::from(secret));
    }

    if let Some(ref secret) = profile.app_secret {
        return Ok(SecretString::from(secret.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Resolve the optional feed bearer token: `token_env`, then keyring,
/// then plaintext. Absent everywhere means the feed is unauthenticated.
pub fn resolve_bearer_token(profile: &Profile, profile_name: &str) -> Option<SecretString> {
    if let Some(ref env_name) = profile.token_env {
        if let Ok(val) = std::env::var(env_name) {
            return Some(SecretString::from(val));
        }
    }

    if let Some(token) = keyring_secret(profile_name, "token") {
        return Some(SecretString::from(token));
    }

    profile
        .token
        .as_ref()
        .map(|t| SecretString::from(t.clone()))
}

// ── Profile → PollerConfig ──────────────────────────────────────────

fn require<'a>(
    field: &str,
    value: &'a Option<String>,
    profile_name: &str,
) -> Result<&'a str, ConfigError> {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ConfigError::MissingField {
            field: field.into(),
            profile: profile_name.into(),
        })
}

/// Build a `PollerConfig` from a profile.
///
/// Resolves credentials through the chain, parses the region, and
/// bounds-checks the poll interval via `PollerConfig::validate`.
pub fn profile_to_poller_config(
    profile: &Profile,
    profile_name: &str,
) -> Result<PollerConfig, ConfigError> {
    let source = match profile.mode.as_str() {
        "api" => {
            let raw_url = require("url", &profile.url, profile_name)?;
            let url: url::Url = raw_url.parse().map_err(|_| ConfigError::Validation {
                field: "url".into(),
                reason: format!("invalid URL: {raw_url}"),
            })?;

            FetchSource::TextEndpoint {
                url,
                bearer_token: resolve_bearer_token(profile, profile_name),
            }
        }

        "cloud_direct" => {
            let region_raw = profile.region.as_deref().unwrap_or("eu1");
            let region =
                Region::from_str(region_raw).map_err(|_| ConfigError::Validation {
                    field: "region".into(),
                    reason: format!("expected 'eu1' or 'us1', got '{region_raw}'"),
                })?;

            let credentials = CloudCredentials {
                app_id: require("app_id", &profile.app_id, profile_name)?.to_owned(),
                app_secret: resolve_app_secret(profile, profile_name)?,
                email: require("email", &profile.email, profile_name)?.to_owned(),
                password: resolve_password(profile, profile_name)?,
                device_serial: require("device_serial", &profile.device_serial, profile_name)?
                    .to_owned(),
            };

            FetchSource::CloudDirect {
                credentials,
                region,
            }
        }

        other => {
            return Err(ConfigError::Validation {
                field: "mode".into(),
                reason: format!("expected 'api' or 'cloud_direct', got '{other}'"),
            });
        }
    };

    let mut config = PollerConfig::new(source).with_poll_interval(Duration::from_secs(
        profile.poll_interval.unwrap_or_else(default_poll_interval),
    ));

    if let Some(timeout) = profile.timeout {
        config.timeout = Duration::from_secs(timeout);
    }

    config.validate().map_err(|e| ConfigError::Validation {
        field: "poll_interval".into(),
        reason: e.to_string(),
    })?;

    Ok(config)
}
