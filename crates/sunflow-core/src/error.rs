// ── Core error types ──
//
// User-facing errors from sunflow-core. Consumers never see raw
// transport failures -- the `From<sunflow_api::Error>` impl translates
// wire-layer errors into domain-appropriate variants before they cross
// this boundary. The retry controller treats every variant as
// retryable; classification exists for diagnostics, not routing.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Fetch-cycle errors ───────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Fetch failed: {message}")]
    FetchFailed { message: String },

    #[error("Transport error: {message}")]
    Transport { message: String },

    /// Terminal failure: the retry budget is exhausted. Carries the
    /// last underlying error; the previous snapshot stays in place.
    #[error("update failed after {attempts} attempts: {source}")]
    UpdateFailed {
        attempts: u32,
        #[source]
        source: Box<CoreError>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Returns `true` for the terminal retry-exhausted variant.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::UpdateFailed { .. })
    }

    /// The last underlying error for a terminal failure, or `self`.
    pub fn root(&self) -> &CoreError {
        match self {
            Self::UpdateFailed { source, .. } => source.root(),
            other => other,
        }
    }
}

// ── Conversion from wire-layer errors ────────────────────────────────

impl From<sunflow_api::Error> for CoreError {
    fn from(err: sunflow_api::Error) -> Self {
        match err {
            sunflow_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            sunflow_api::Error::Transport(e) => CoreError::Transport {
                message: e.to_string(),
            },
            sunflow_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("invalid URL: {e}"),
            },
            sunflow_api::Error::CloudApi { status, message } => CoreError::FetchFailed {
                message: format!("cloud API HTTP {status}: {message}"),
            },
            sunflow_api::Error::TextEndpoint { status, body } => CoreError::FetchFailed {
                message: format!("HTTP {status}: {body}"),
            },
            sunflow_api::Error::Deserialization { message } => {
                CoreError::FetchFailed { message }
            }
        }
    }
}
