// Plain-text endpoint client
//
// Bare GET against a pre-configured URL serving tab-delimited
// `name\tvalue[\tunit]` lines, with an optional static bearer token.
// No vendor authentication is involved in this mode.

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;
use url::Url;

use crate::error::{Error, body_preview};
use crate::transport::TransportConfig;

/// Client for the pre-formatted text feed.
pub struct TextClient {
    http: reqwest::Client,
    url: Url,
    bearer_token: Option<SecretString>,
}

impl TextClient {
    /// Create a client using a shared `TransportConfig`.
    pub fn new(
        url: Url,
        bearer_token: Option<SecretString>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, url, bearer_token))
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        url: Url,
        bearer_token: Option<SecretString>,
    ) -> Self {
        Self {
            http,
            url,
            bearer_token,
        }
    }

    /// The configured feed URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Fetch the raw feed body.
    ///
    /// Any non-2xx status is a hard failure carrying a truncated body
    /// for diagnostics. Parsing happens in `sunflow-core::parse`.
    pub async fn fetch_raw(&self) -> Result<String, Error> {
        debug!("GET {}", self.url);

        let mut request = self.http.get(self.url.clone());
        if let Some(ref token) = self.bearer_token {
            request = request.bearer_auth(token.expose_secret());
        }

        let resp = request.send().await.map_err(Error::Transport)?;

        let status = resp.status();
        let body = resp.text().await.map_err(Error::Transport)?;

        if !status.is_success() {
            return Err(Error::TextEndpoint {
                status: status.as_u16(),
                body: body_preview(&body).to_owned(),
            });
        }

        Ok(body)
    }
}
