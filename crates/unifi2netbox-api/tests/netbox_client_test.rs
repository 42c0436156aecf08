#![allow(clippy::unwrap_used)]
// Integration tests for `NetboxClient` using wiremock.

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use unifi2netbox_api::netbox::models::{NewDevice, RoleAssignment};
use unifi2netbox_api::{NetboxClient, TransportConfig};

async fn setup() -> (MockServer, NetboxClient) {
    let server = MockServer::start().await;
    let token = SecretString::from("t0ken".to_string());
    let client = NetboxClient::new(&server.uri(), &token, &TransportConfig::default()).unwrap();
    (server, client)
}

fn new_device(name: &str) -> NewDevice {
    NewDevice {
        name: name.into(),
        device_type: 1,
        tenant: 2,
        site: 3,
        serial: "S1".into(),
        role: RoleAssignment::Role(4),
    }
}

#[tokio::test]
async fn test_base_url_normalization() {
    let http = reqwest::Client::new();
    let bare = NetboxClient::from_reqwest("https://netbox.local", http.clone()).unwrap();
    let with_api = NetboxClient::from_reqwest("https://netbox.local/api", http).unwrap();

    assert_eq!(bare.base_url().as_str(), "https://netbox.local/api/");
    assert_eq!(with_api.base_url().as_str(), "https://netbox.local/api/");
}

#[tokio::test]
async fn test_list_follows_pagination_with_token() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/dcim/devices/"))
        .and(query_param("serial", "S1"))
        .and(header("Authorization", "Token t0ken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 2,
            "next": format!("{}/api/dcim/devices/?offset=1&limit=1", server.uri()),
            "results": [{ "id": 1, "name": "ap-1", "serial": "S1" }]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/dcim/devices/"))
        .and(query_param("offset", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 2,
            "next": null,
            "results": [{ "id": 2, "name": "ap-1_S1", "serial": "S1" }]
        })))
        .mount(&server)
        .await;

    let devices = client
        .devices(&[("serial", "S1".to_string())])
        .await
        .unwrap();

    let ids: Vec<u64> = devices.iter().map(|d| d.id).collect();
    assert_eq!(ids, vec![1, 2]);
}

#[tokio::test]
async fn test_create_device_name_conflict_is_detected() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/dcim/devices/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "__all__": ["Device name must be unique per site."]
        })))
        .mount(&server)
        .await;

    let err = client.create_device(&new_device("ap-1")).await.unwrap_err();

    assert!(err.is_unique_name_conflict(), "got: {err:?}");
    assert_eq!(err.status(), Some(400));
}

#[tokio::test]
async fn test_create_device_posts_role_key() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/dcim/devices/"))
        .and(body_json(json!({
            "name": "ap-1", "device_type": 1, "tenant": 2, "site": 3, "serial": "S1", "role": 4
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 11, "name": "ap-1", "serial": "S1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let device = client.create_device(&new_device("ap-1")).await.unwrap();
    assert_eq!(device.id, 11);
}

#[tokio::test]
async fn test_device_create_fields_from_options() {
    let (server, client) = setup().await;

    Mock::given(method("OPTIONS"))
        .and(path("/api/dcim/devices/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "Device List",
            "actions": { "POST": {
                "name": { "type": "string" },
                "device_role": { "type": "nested object" },
                "serial": { "type": "string" }
            }}
        })))
        .mount(&server)
        .await;

    let fields = client.device_create_fields().await.unwrap();

    assert!(fields.contains("device_role"));
    assert!(!fields.contains("role"));
    assert_eq!(fields.len(), 3);
}

#[tokio::test]
async fn test_set_primary_ip4_patches_device() {
    let (server, client) = setup().await;

    Mock::given(method("PATCH"))
        .and(path("/api/dcim/devices/7/"))
        .and(body_json(json!({ "primary_ip4": 42 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 7, "name": "ap-1", "serial": "S1", "primary_ip4": { "id": 42 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let device = client.set_primary_ip4(7, 42).await.unwrap();
    assert_eq!(device.primary_ip4.map(|ip| ip.id), Some(42));
}

#[tokio::test]
async fn test_prefixes_containing_passes_filters() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/ipam/prefixes/"))
        .and(query_param("contains", "10.1.2.3"))
        .and(query_param("vrf_id", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 1, "next": null,
            "results": [{ "id": 3, "prefix": "10.1.2.0/24", "vrf": { "id": 5, "name": "vrf_HQ" } }]
        })))
        .mount(&server)
        .await;

    let prefixes = client.prefixes_containing("10.1.2.3", 5).await.unwrap();
    assert_eq!(prefixes[0].prefix, "10.1.2.0/24");
}
