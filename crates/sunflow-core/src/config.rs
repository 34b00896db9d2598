// ── Runtime polling configuration ──
//
// These types describe *what* to poll and how often. They carry
// credential data and tuning, but never touch disk -- the CLI (via
// sunflow-config) constructs a `PollerConfig` and hands it in.
// Immutable for the lifetime of a coordinator.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use sunflow_api::{CloudCredentials, Region};

use crate::error::CoreError;
use crate::retry::RetryPolicy;

/// Default poll interval.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Minimum poll interval for the text-endpoint mode (seconds).
pub const TEXT_MIN_INTERVAL_SECS: u64 = 5;

/// Minimum poll interval for the cloud-direct mode (seconds).
pub const CLOUD_MIN_INTERVAL_SECS: u64 = 10;

/// Maximum poll interval for either mode (seconds).
pub const MAX_INTERVAL_SECS: u64 = 3600;

/// Which fetch strategy a coordinator uses. The two are mutually
/// exclusive; a coordinator never switches at runtime.
#[derive(Debug, Clone)]
pub enum FetchSource {
    /// Bare GET against a pre-formatted tab-delimited feed.
    TextEndpoint {
        url: Url,
        /// Optional static bearer token for the feed.
        bearer_token: Option<SecretString>,
    },
    /// Authenticated access to the vendor's regional cloud API.
    CloudDirect {
        credentials: CloudCredentials,
        region: Region,
    },
}

impl FetchSource {
    /// Stable mode name, used in logs and config files.
    pub fn mode_name(&self) -> &'static str {
        match self {
            Self::TextEndpoint { .. } => "api",
            Self::CloudDirect { .. } => "cloud_direct",
        }
    }

    /// The lowest poll interval this mode accepts.
    fn min_interval_secs(&self) -> u64 {
        match self {
            Self::TextEndpoint { .. } => TEXT_MIN_INTERVAL_SECS,
            Self::CloudDirect { .. } => CLOUD_MIN_INTERVAL_SECS,
        }
    }
}

/// Configuration for a single polling coordinator.
///
/// Built by the config layer or tests, passed to
/// [`Coordinator::new`](crate::coordinator::Coordinator::new).
#[derive(Debug, Clone)]
pub struct PollerConfig {
    pub source: FetchSource,
    /// How often to poll. Zero disables the background loop entirely
    /// (one-shot use); non-zero values are bounds-checked per mode.
    pub poll_interval: Duration,
    /// Per-request timeout for polling-cycle HTTP calls.
    pub timeout: Duration,
    /// Attempt budget and backoff for each cycle.
    pub retry: RetryPolicy,
}

impl PollerConfig {
    /// A config with default interval, timeout, and retry policy.
    pub fn new(source: FetchSource) -> Self {
        Self {
            source,
            poll_interval: DEFAULT_POLL_INTERVAL,
            timeout: sunflow_api::transport::POLL_TIMEOUT,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Check interval bounds and mode invariants.
    pub fn validate(&self) -> Result<(), CoreError> {
        if let FetchSource::TextEndpoint { url, .. } = &self.source {
            match url.scheme() {
                "http" | "https" => {}
                other => {
                    return Err(CoreError::ValidationFailed {
                        message: format!("unsupported URL scheme '{other}'"),
                    });
                }
            }
        }

        if self.poll_interval.is_zero() {
            // Background loop disabled; nothing to bounds-check.
            return Ok(());
        }

        let secs = self.poll_interval.as_secs();
        let min = self.source.min_interval_secs();
        if secs < min || secs > MAX_INTERVAL_SECS {
            return Err(CoreError::ValidationFailed {
                message: format!(
                    "poll interval {secs}s out of range ({min}-{MAX_INTERVAL_SECS}s for {} mode)",
                    self.source.mode_name()
                ),
            });
        }

        Ok(())
    }
}
