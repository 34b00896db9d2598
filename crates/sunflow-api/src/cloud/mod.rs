// Cloud developer-API HTTP client
//
// Wraps `reqwest::Client` with regional URL construction and the token
// cache. The auth flow (token endpoint) and the data flow (device/latest
// endpoint) are implemented as inherent methods in separate files to
// keep this module focused on transport mechanics.

pub mod auth;
pub mod data;
pub mod models;

use std::sync::RwLock;

use secrecy::SecretString;
use url::Url;

use crate::error::Error;
use crate::region::Region;
use crate::transport::TransportConfig;

use auth::CachedToken;

/// Credentials for the cloud developer API.
///
/// `app_id`/`app_secret` identify the registered application;
/// `email`/`password` identify the account. The password is hashed
/// before it ever leaves the process (see [`auth`]).
#[derive(Debug, Clone)]
pub struct CloudCredentials {
    pub app_id: String,
    pub app_secret: SecretString,
    pub email: String,
    pub password: SecretString,
    pub device_serial: String,
}

/// Raw HTTP client for the vendor's cloud developer API.
///
/// Owns the token cache: callers never handle tokens directly unless
/// they want to. One instance per polled device/account pair -- the
/// cache is instance-local and memory-only.
pub struct CloudClient {
    http: reqwest::Client,
    base_url: Url,
    credentials: CloudCredentials,
    /// Cached access token with its assumed expiry. Guarded by a std
    /// lock; it is only ever held for a field read or write, never
    /// across an await point.
    token: RwLock<Option<CachedToken>>,
}

impl CloudClient {
    /// Create a client for a region using a shared `TransportConfig`.
    pub fn new(
        region: Region,
        credentials: CloudCredentials,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, region.base_url(), credentials))
    }

    /// Create a client with a pre-built `reqwest::Client` and explicit
    /// base URL. Used by tests to point at a mock server.
    pub fn with_client(http: reqwest::Client, base_url: Url, credentials: CloudCredentials) -> Self {
        Self {
            http,
            base_url,
            credentials,
            token: RwLock::new(None),
        }
    }

    /// The API base URL this client talks to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Serial number of the device this client polls.
    pub fn device_serial(&self) -> &str {
        &self.credentials.device_serial
    }

    /// Build a full URL for an API path (e.g. `v1.0/account/token`).
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        self.base_url.join(path).map_err(Error::InvalidUrl)
    }
}
