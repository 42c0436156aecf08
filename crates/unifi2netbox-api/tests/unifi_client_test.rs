#![allow(clippy::unwrap_used)]
// Integration tests for `UnifiClient` using wiremock.

use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use unifi2netbox_api::{ControllerPlatform, Error, UnifiClient};

// ── Helpers ─────────────────────────────────────────────────────────

const MFA_SECRET: &str = "JBSWY3DPEHPK3PXP";

async fn setup() -> (MockServer, UnifiClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = UnifiClient::with_client(
        reqwest::Client::new(),
        base_url,
        ControllerPlatform::ClassicController,
    );
    (server, client)
}

fn secret(value: &str) -> SecretString {
    SecretString::from(value.to_string())
}

// ── Authentication tests ────────────────────────────────────────────

#[tokio::test]
async fn test_login_sends_totp_and_succeeds() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .and(body_partial_json(json!({ "username": "admin", "password": "pw" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "meta": { "rc": "ok" }, "data": [] })),
        )
        .expect(1)
        .mount(&server)
        .await;

    client
        .login("admin", &secret("pw"), &secret(MFA_SECRET))
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let token = body["ubic_2fa_token"].as_str().unwrap();
    assert_eq!(token.len(), 6);
    assert!(token.chars().all(|c| c.is_ascii_digit()));
}

#[tokio::test]
async fn test_login_invalid_credentials() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(400).set_body_json(
            json!({ "meta": { "rc": "error", "msg": "api.err.Invalid" }, "data": [] }),
        ))
        .mount(&server)
        .await;

    let result = client
        .login("admin", &secret("wrong"), &secret(MFA_SECRET))
        .await;

    assert!(
        matches!(
            result,
            Err(Error::Authentication { ref message }) if message.contains("invalid credentials")
        ),
        "expected Authentication error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_login_rejects_bad_mfa_secret_before_any_request() {
    let (server, client) = setup().await;

    let result = client
        .login("admin", &secret("pw"), &secret("%%%"))
        .await;

    assert!(matches!(result, Err(Error::InvalidMfaSecret(_))));
    assert!(server.received_requests().await.unwrap().is_empty());
}

// ── Site / device tests ─────────────────────────────────────────────

#[tokio::test]
async fn test_list_sites() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/self/sites"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "meta": { "rc": "ok" },
            "data": [
                { "_id": "s1", "name": "default", "desc": "Head Office" },
                { "_id": "s2", "name": "x8f2k", "desc": "Warehouse" }
            ]
        })))
        .mount(&server)
        .await;

    let sites = client.list_sites().await.unwrap();

    assert_eq!(sites.len(), 2);
    assert_eq!(sites[0].name, "default");
    assert_eq!(sites[1].desc.as_deref(), Some("Warehouse"));
}

#[tokio::test]
async fn test_list_devices_with_port_table() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/s/x8f2k/stat/device"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "meta": { "rc": "ok" },
            "data": [{
                "_id": "d1",
                "mac": "aa:bb:cc:dd:ee:ff",
                "type": "usw",
                "name": "Switch-24",
                "model": "US24",
                "ip": "10.0.0.2",
                "serial": "F09FC2AA0001",
                "port_table": [
                    { "port_idx": 1, "name": "Port 1", "media": "GE" },
                    { "port_idx": 25, "name": "SFP 1", "media": "SFP" }
                ]
            }]
        })))
        .mount(&server)
        .await;

    let devices = client.list_devices("x8f2k").await.unwrap();

    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0].serial.as_deref(), Some("F09FC2AA0001"));
    assert_eq!(devices[0].port_table.len(), 2);
    assert_eq!(devices[0].port_table[0].media.as_deref(), Some("GE"));
}

// ── Error tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_login_required_is_auth_expired() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "meta": { "rc": "error", "msg": "api.err.LoginRequired" },
            "data": []
        })))
        .mount(&server)
        .await;

    let err = client.list_sites().await.unwrap_err();

    assert!(err.is_auth_expired(), "expected expired session, got: {err:?}");
    assert!(err.to_string().contains("LoginRequired"));
}

#[tokio::test]
async fn test_legacy_api_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/s/default/stat/device"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "meta": { "rc": "error", "msg": "api.err.NoSiteContext" },
            "data": []
        })))
        .mount(&server)
        .await;

    match client.list_devices("default").await {
        Err(Error::LegacyApi { ref message }) => {
            assert!(message.contains("NoSiteContext"), "got: {message}");
        }
        other => panic!("expected LegacyApi error, got: {other:?}"),
    }
}
