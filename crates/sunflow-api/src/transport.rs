// Shared transport configuration for building reqwest::Client instances.
//
// Both the cloud and text clients share timeout and user-agent settings
// through this module, avoiding duplicated builder logic. Polling calls
// use the default 20s timeout; setup-time validation uses a tighter 10s.

use std::time::Duration;

use crate::error::Error;

/// Request timeout applied to polling-cycle HTTP calls.
pub const POLL_TIMEOUT: Duration = Duration::from_secs(20);

/// Request timeout for one-shot validation calls issued outside the
/// polling loop (e.g. setup-time credential checks).
pub const VALIDATION_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: POLL_TIMEOUT,
        }
    }
}

impl TransportConfig {
    /// A config tuned for setup-time validation calls.
    pub fn for_validation() -> Self {
        Self {
            timeout: VALIDATION_TIMEOUT,
        }
    }

    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("sunflow/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(Error::Transport)
    }
}
