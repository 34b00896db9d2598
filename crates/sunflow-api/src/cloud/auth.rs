// Cloud API authentication
//
// Token acquisition against `POST /v1.0/account/token`, with an
// in-memory cache. The API does not report an expiry, so a fixed
// 1-hour validity window is assumed from the moment of receipt.
// The account password is sent as a lowercase SHA-256 hex digest --
// the plaintext never goes on the wire.

use chrono::{DateTime, Duration, Utc};
use secrecy::ExposeSecret;
use serde_json::json;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::cloud::CloudClient;
use crate::cloud::models::TokenResponse;
use crate::error::{Error, body_preview};

/// Assumed validity window for a freshly issued access token.
fn token_validity() -> Duration {
    Duration::hours(1)
}

/// A cached access token and the instant it stops being trusted.
#[derive(Debug, Clone)]
pub(crate) struct CachedToken {
    pub(crate) token: String,
    pub(crate) expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn issued_now(token: String) -> Self {
        Self {
            token,
            expires_at: Utc::now() + token_validity(),
        }
    }

    /// A cache hit requires the token to exist *and* be unexpired.
    fn is_valid(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Lowercase hex SHA-256 digest of the account password.
fn password_digest(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

impl CloudClient {
    /// Return a valid access token, hitting the network only on a
    /// cache miss or after the assumed expiry has passed.
    pub async fn get_token(&self) -> Result<String, Error> {
        if let Some(token) = self.cached_token() {
            debug!("using cached access token");
            return Ok(token);
        }
        self.request_token().await
    }

    /// Read the cache without touching the network.
    fn cached_token(&self) -> Option<String> {
        let guard = self.token.read().expect("token lock poisoned");
        guard
            .as_ref()
            .filter(|t| t.is_valid(Utc::now()))
            .map(|t| t.token.clone())
    }

    /// Unconditionally request a fresh token and cache it.
    async fn request_token(&self) -> Result<String, Error> {
        let url = self.api_url("/v1.0/account/token")?;
        info!("requesting new access token");

        let body = json!({
            "appSecret": self.credentials.app_secret.expose_secret(),
            "email": self.credentials.email,
            "password": password_digest(self.credentials.password.expose_secret()),
        });

        let resp = self
            .http
            .post(url)
            .query(&[("appId", self.credentials.app_id.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        if status != reqwest::StatusCode::OK {
            let text = resp.text().await.unwrap_or_default();
            return Err(Error::Authentication {
                message: format!("HTTP {status}: {}", body_preview(&text)),
            });
        }

        let text = resp.text().await.map_err(Error::Transport)?;
        let result: TokenResponse =
            serde_json::from_str(&text).map_err(|e| Error::Deserialization {
                message: format!("{e} (body preview: {:?})", body_preview(&text)),
            })?;

        if !result.success {
            return Err(Error::Authentication {
                message: result.msg.unwrap_or_else(|| "unknown error".into()),
            });
        }

        let Some(token) = result.access_token else {
            return Err(Error::Authentication {
                message: "no access token in response".into(),
            });
        };

        *self.token.write().expect("token lock poisoned") =
            Some(CachedToken::issued_now(token.clone()));

        info!("obtained new access token");
        Ok(token)
    }

    /// One authentication round-trip, discarding the token.
    ///
    /// Setup-time credential validation -- build the client with
    /// [`TransportConfig::for_validation`](crate::transport::TransportConfig::for_validation)
    /// to get the tighter timeout.
    pub async fn validate_credentials(&self) -> Result<(), Error> {
        self.request_token().await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use chrono::{Duration, Utc};
    use secrecy::SecretString;
    use serde_json::json;
    use url::Url;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::{CachedToken, password_digest};
    use crate::cloud::{CloudClient, CloudCredentials};
    use crate::error::Error;

    fn credentials() -> CloudCredentials {
        CloudCredentials {
            app_id: "app-1".into(),
            app_secret: SecretString::from("s3cret".to_string()),
            email: "owner@example.com".into(),
            password: SecretString::from("hunter2".to_string()),
            device_serial: "SN123".into(),
        }
    }

    async fn setup() -> (MockServer, CloudClient) {
        let server = MockServer::start().await;
        let base_url = Url::parse(&server.uri()).unwrap();
        let client = CloudClient::with_client(reqwest::Client::new(), base_url, credentials());
        (server, client)
    }

    #[test]
    fn password_digest_is_lowercase_hex_sha256() {
        // Known digest of "hunter2".
        assert_eq!(
            password_digest("hunter2"),
            "f52fbd32b2b3b86ff88ef6c490628285f482af15ddcb29541f94bcf526a3f6c7"
        );
    }

    #[test]
    fn cached_token_expires() {
        let token = CachedToken {
            token: "tok".into(),
            expires_at: Utc::now() + Duration::minutes(5),
        };
        assert!(token.is_valid(Utc::now()));
        assert!(!token.is_valid(token.expires_at));
        assert!(!token.is_valid(token.expires_at + Duration::seconds(1)));
    }

    #[tokio::test]
    async fn token_request_sends_hashed_password_and_app_id() {
        let (server, client) = setup().await;

        Mock::given(method("POST"))
            .and(path("/v1.0/account/token"))
            .and(query_param("appId", "app-1"))
            .and(body_partial_json(json!({
                "appSecret": "s3cret",
                "email": "owner@example.com",
                "password": password_digest("hunter2"),
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "accessToken": "tok-abc",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let token = client.get_token().await.unwrap();
        assert_eq!(token, "tok-abc");
    }

    #[tokio::test]
    async fn second_call_within_window_hits_the_cache() {
        let (server, client) = setup().await;

        Mock::given(method("POST"))
            .and(path("/v1.0/account/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "accessToken": "tok-abc",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let first = client.get_token().await.unwrap();
        let second = client.get_token().await.unwrap();
        assert_eq!(first, second);
        // expect(1) verifies on drop that only one request was made.
    }

    #[tokio::test]
    async fn expired_cache_entry_triggers_exactly_one_refetch() {
        let (server, client) = setup().await;

        Mock::given(method("POST"))
            .and(path("/v1.0/account/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "accessToken": "tok-fresh",
            })))
            .expect(1)
            .mount(&server)
            .await;

        // Plant an already-expired entry directly in the cache.
        *client.token.write().unwrap() = Some(CachedToken {
            token: "tok-stale".into(),
            expires_at: Utc::now() - Duration::seconds(1),
        });

        let token = client.get_token().await.unwrap();
        assert_eq!(token, "tok-fresh");

        // The fresh token is now cached and unexpired.
        let again = client.get_token().await.unwrap();
        assert_eq!(again, "tok-fresh");
    }

    #[tokio::test]
    async fn non_200_status_is_an_authentication_error() {
        let (server, client) = setup().await;

        Mock::given(method("POST"))
            .and(path("/v1.0/account/token"))
            .respond_with(ResponseTemplate::new(403).set_body_string("Forbidden"))
            .mount(&server)
            .await;

        let err = client.get_token().await.unwrap_err();
        match err {
            Error::Authentication { message } => {
                assert!(message.contains("403"), "unexpected message: {message}");
            }
            other => panic!("expected Authentication error, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn falsy_success_flag_carries_the_api_message() {
        let (server, client) = setup().await;

        Mock::given(method("POST"))
            .and(path("/v1.0/account/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": false,
                "msg": "invalid appSecret",
            })))
            .mount(&server)
            .await;

        let err = client.get_token().await.unwrap_err();
        match err {
            Error::Authentication { message } => assert_eq!(message, "invalid appSecret"),
            other => panic!("expected Authentication error, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_access_token_field_fails() {
        let (server, client) = setup().await;

        Mock::given(method("POST"))
            .and(path("/v1.0/account/token"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "success": true })),
            )
            .mount(&server)
            .await;

        let err = client.get_token().await.unwrap_err();
        assert!(err.is_auth(), "expected auth error, got: {err:?}");
    }
}
