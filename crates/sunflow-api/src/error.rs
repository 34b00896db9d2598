use thiserror::Error;

/// Top-level error type for the `sunflow-api` crate.
///
/// Covers every failure mode across both fetch surfaces: token
/// acquisition, device-data retrieval, and the plain-text endpoint.
/// `sunflow-core` maps these into user-facing diagnostics -- raw
/// transport errors never cross that boundary unclassified.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Token acquisition failed (bad credentials, rejected app id,
    /// falsy `success` flag, or a response without an `accessToken`).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout).
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL construction error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ── Cloud API ───────────────────────────────────────────────────
    /// Non-200 response from the device-data endpoint.
    #[error("Cloud API error (HTTP {status}): {message}")]
    CloudApi { status: u16, message: String },

    // ── Text endpoint ───────────────────────────────────────────────
    /// Non-2xx response from the configured text feed. The body is
    /// truncated to keep diagnostics readable.
    #[error("Text endpoint error (HTTP {status}): {body}")]
    TextEndpoint { status: u16, body: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed; the message carries a body preview.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String },
}

impl Error {
    /// Returns `true` if this error came from the authentication flow.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }

    /// Returns `true` if this is a transient error worth retrying.
    ///
    /// The retry controller in `sunflow-core` retries everything
    /// regardless; this exists for log annotation and callers that
    /// want to distinguish outages from configuration mistakes.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::CloudApi { status, .. } | Self::TextEndpoint { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Truncate a response body for inclusion in error messages.
///
/// Byte-indexed but char-boundary safe, so multi-byte payloads cannot
/// panic the error path.
pub(crate) fn body_preview(body: &str) -> &str {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body;
    }
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

#[cfg(test)]
mod tests {
    use super::body_preview;

    #[test]
    fn preview_keeps_short_bodies_intact() {
        assert_eq!(body_preview("short"), "short");
    }

    #[test]
    fn preview_truncates_on_char_boundary() {
        // 67 x '€' (3 bytes each) = 201 bytes; byte 200 falls mid-char.
        let body = "€".repeat(67);
        let preview = body_preview(&body);
        assert_eq!(preview.len(), 198);
        assert!(body.starts_with(preview));
    }
}
