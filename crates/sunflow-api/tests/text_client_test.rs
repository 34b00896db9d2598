#![allow(clippy::unwrap_used)]
// Integration tests for `TextClient` using wiremock.

use secrecy::SecretString;
use url::Url;
use wiremock::matchers::{header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use sunflow_api::{Error, TextClient};

async fn setup(bearer: Option<&str>) -> (MockServer, TextClient) {
    let server = MockServer::start().await;
    let url = Url::parse(&format!("{}/feed", server.uri())).unwrap();
    let token = bearer.map(|t| SecretString::from(t.to_string()));
    let client = TextClient::with_client(reqwest::Client::new(), url, token);
    (server, client)
}

#[tokio::test]
async fn fetch_returns_the_raw_body() {
    let (server, client) = setup(None).await;

    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Grid Power\t1500\tW\n"))
        .mount(&server)
        .await;

    let body = client.fetch_raw().await.unwrap();
    assert_eq!(body, "Grid Power\t1500\tW\n");
}

#[tokio::test]
async fn bearer_token_is_sent_when_configured() {
    let (server, client) = setup(Some("feed-token")).await;

    Mock::given(method("GET"))
        .and(path("/feed"))
        .and(header("authorization", "Bearer feed-token"))
        .respond_with(ResponseTemplate::new(200).set_body_string(""))
        .expect(1)
        .mount(&server)
        .await;

    client.fetch_raw().await.unwrap();
}

#[tokio::test]
async fn no_authorization_header_without_a_token() {
    let (server, client) = setup(None).await;

    // Mount a catch-all that rejects any request carrying auth.
    Mock::given(method("GET"))
        .and(path("/feed"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    let body = client.fetch_raw().await.unwrap();
    assert_eq!(body, "ok");
}

#[tokio::test]
async fn non_2xx_is_a_text_endpoint_error_with_truncated_body() {
    let (server, client) = setup(None).await;

    let long_body = "x".repeat(1000);
    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(ResponseTemplate::new(503).set_body_string(long_body))
        .mount(&server)
        .await;

    let err = client.fetch_raw().await.unwrap_err();
    match err {
        Error::TextEndpoint { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body.len(), 200);
        }
        other => panic!("expected TextEndpoint error, got: {other:?}"),
    }
}
