#![allow(clippy::unwrap_used)]
// Integration tests for `VaultClient` using wiremock.

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use lvslb_api::{Error, VaultClient};

async fn setup() -> (MockServer, VaultClient) {
    let server = MockServer::start().await;
    let client = VaultClient::with_client(
        reqwest::Client::new(),
        Url::parse(&server.uri()).unwrap(),
        SecretString::from("root-token".to_owned()),
    );
    (server, client)
}

#[tokio::test]
async fn test_read_login() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/secret/lvs/10.0.0.254"))
        .and(header("X-Vault-Token", "root-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "lease_duration": 2_764_800,
            "data": { "login": "admin", "password": "s3cret" }
        })))
        .mount(&server)
        .await;

    let login = client.read_login("lvs", "10.0.0.254").await.unwrap().unwrap();
    assert_eq!(login.login, "admin");
    assert_eq!(login.password.expose_secret(), "s3cret");
}

#[tokio::test]
async fn test_missing_fields_read_as_empty() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/secret/lvs/lb1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "login": "admin", "password": 42 }
        })))
        .mount(&server)
        .await;

    let login = client.read_login("/lvs/", "lb1").await.unwrap().unwrap();
    assert_eq!(login.login, "admin");
    assert_eq!(login.password.expose_secret(), "");
}

#[tokio::test]
async fn test_missing_secret_is_none() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "errors": [] })))
        .mount(&server)
        .await;

    assert!(client.read_login("lvs", "lb1").await.unwrap().is_none());
}

#[tokio::test]
async fn test_forbidden_is_vault_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403).set_body_string("permission denied"))
        .mount(&server)
        .await;

    let result = client.read_login("lvs", "lb1").await;
    match result {
        Err(Error::Vault { status, ref message }) => {
            assert_eq!(status, 403);
            assert_eq!(message, "permission denied");
        }
        other => panic!("expected Vault error, got: {other:?}"),
    }
}
