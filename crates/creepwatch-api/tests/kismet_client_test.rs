// Integration tests for `KismetClient` using wiremock.

use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use creepwatch_api::transport::TransportConfig;
use creepwatch_api::{Error, HttpdCredentials, KismetClient};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup(credentials: Option<HttpdCredentials>) -> (MockServer, KismetClient) {
    let server = MockServer::start().await;
    let url = server.uri().parse().expect("mock server URL");
    let client = KismetClient::new(url, credentials, &TransportConfig::default())
        .expect("client construction");
    (server, client)
}

fn device(key: &str, last_time: i64) -> serde_json::Value {
    json!({
        "kismet.device.base.key": key,
        "kismet.device.base.last_time": last_time,
        "kismet.device.base.name": "LinksysSetup",
        "kismet.device.base.type": "Wi-Fi AP",
        "kismet.device.base.macaddr": "AA:BB:CC:DD:EE:FF",
        "kismet.device.base.manuf": "Linksys",
        "kismet.common.signal.last_signal": -61,
        "min_loc": [-122.419, 37.774],
        "max_loc": [-122.408, 37.783],
        "last_loc": [-122.410, 37.781],
    })
}

// ── Happy path ──────────────────────────────────────────────────────

#[tokio::test]
async fn devices_since_posts_projection_and_window() {
    let (server, client) = setup(None).await;

    Mock::given(method("POST"))
        .and(path("/devices/views/all/last-time/-60/devices.json"))
        .and(body_string_contains("fields"))
        .and(body_string_contains("min_loc"))
        .and(body_string_contains("max_loc"))
        .and(body_string_contains("last_loc"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([device("4202770D_1", 1_700_000_100)])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let devices = client.devices_since(-60).await.expect("fetch");

    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0].key, "4202770D_1");
    assert_eq!(devices[0].last_time, 1_700_000_100);
    assert_eq!(devices[0].last_signal, Some(-61));
    assert_eq!(devices[0].last_loc, Some([-122.410, 37.781]));
}

#[tokio::test]
async fn devices_since_retains_sentinel_located_records() {
    let (server, client) = setup(None).await;

    let mut no_gps = device("NOLOC_1", 1_700_000_000);
    no_gps["min_loc"] = json!(0);
    no_gps["max_loc"] = json!(0);
    no_gps["last_loc"] = json!(0);

    Mock::given(method("POST"))
        .and(path("/devices/views/all/last-time/1/devices.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([no_gps])))
        .mount(&server)
        .await;

    // Sentinel locations decode to None but the record itself is kept —
    // filtering is the projector's job, not the fetcher's.
    let devices = client.devices_since(1).await.expect("fetch");
    assert_eq!(devices.len(), 1);
    assert!(devices[0].min_loc.is_none());
    assert!(devices[0].max_loc.is_none());
    assert!(devices[0].last_loc.is_none());
}

#[tokio::test]
async fn system_status_probe() {
    let (server, client) = setup(None).await;

    Mock::given(method("GET"))
        .and(path("/system/status.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "kismet.system.devices.count": 42,
            "kismet.system.timestamp.sec": 1_700_000_000,
            "kismet.system.memory.rss": 123_456,
        })))
        .mount(&server)
        .await;

    let status = client.system_status().await.expect("status");
    assert_eq!(status.devices_count, 42);
    assert_eq!(status.timestamp_sec, 1_700_000_000);
}

// ── Auth ────────────────────────────────────────────────────────────

#[tokio::test]
async fn basic_auth_header_is_sent() {
    let creds = HttpdCredentials {
        username: "kismet".into(),
        password: "hacktheplanet".to_owned().into(),
    };
    let (server, client) = setup(Some(creds)).await;

    // kismet:hacktheplanet base64-encoded
    Mock::given(method("GET"))
        .and(path("/system/status.json"))
        .and(wiremock::matchers::header(
            "authorization",
            "Basic a2lzbWV0OmhhY2t0aGVwbGFuZXQ=",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    client.system_status().await.expect("status");
}

#[tokio::test]
async fn unauthorized_maps_to_authentication_error() {
    let (server, client) = setup(None).await;

    Mock::given(method("POST"))
        .and(path("/devices/views/all/last-time/1/devices.json"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = client.devices_since(1).await.expect_err("should fail");
    assert!(matches!(err, Error::Authentication { .. }));
}

// ── Failure mapping ─────────────────────────────────────────────────

#[tokio::test]
async fn malformed_body_maps_to_deserialization_error() {
    let (server, client) = setup(None).await;

    Mock::given(method("POST"))
        .and(path("/devices/views/all/last-time/1/devices.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let err = client.devices_since(1).await.expect_err("should fail");
    match err {
        Error::Deserialization { body, .. } => assert!(body.contains("not json")),
        other => panic!("expected Deserialization, got {other:?}"),
    }
}

#[tokio::test]
async fn server_error_maps_to_api_error() {
    let (server, client) = setup(None).await;

    Mock::given(method("POST"))
        .and(path("/devices/views/all/last-time/1/devices.json"))
        .respond_with(ResponseTemplate::new(500).set_body_string("tracker offline"))
        .mount(&server)
        .await;

    let err = client.devices_since(1).await.expect_err("should fail");
    match err {
        Error::Api { status, message } => {
            assert_eq!(status, 500);
            assert!(message.contains("tracker offline"));
        }
        other => panic!("expected Api, got {other:?}"),
    }
}

#[tokio::test]
async fn connection_refused_is_transient() {
    // Point at a server that's no longer listening.
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let client = KismetClient::new(
        uri.parse().expect("URL"),
        None,
        &TransportConfig::default(),
    )
    .expect("client construction");

    let err = client.devices_since(1).await.expect_err("should fail");
    assert!(err.is_transient());
}
