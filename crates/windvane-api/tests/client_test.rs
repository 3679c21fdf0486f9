// Integration tests for `WeatherClient` using wiremock.

use std::time::Duration;

use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use windvane_api::{
    ClientConfig, Credentials, CycleType, DeviceIdentifier, Error, ErrorKind, UnitOptions,
    WeatherClient,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn credentials() -> Credentials {
    Credentials {
        application_key: SecretString::from("test-app-key"),
        api_key: SecretString::from("test-api-key"),
    }
}

async fn setup() -> (MockServer, WeatherClient) {
    let server = MockServer::start().await;
    let config = ClientConfig::new(credentials())
        .with_base_url(Url::parse(&server.uri()).expect("mock server URL"));
    let client = WeatherClient::new(config).expect("valid config");
    (server, client)
}

fn envelope(data: serde_json::Value) -> serde_json::Value {
    json!({ "code": 0, "msg": "success", "time": "1700000000", "data": data })
}

// ── Happy-path tests ────────────────────────────────────────────────

#[tokio::test]
async fn list_devices_transforms_records() {
    let (server, client) = setup().await;

    let body = envelope(json!({
        "list": [
            {
                "id": 1,
                "name": "Device 1",
                "mac": "AA:BB:CC:DD:EE:FF",
                "stationtype": "GW1000",
                "date_zone_id": "America/New_York",
                "longitude": -73.97,
                "latitude": 40.78
            },
            { "id": 2, "name": "Paddock", "imei": "865167060000000" }
        ],
        "total": 2
    }));

    Mock::given(method("GET"))
        .and(path("/device/list"))
        .and(query_param("application_key", "test-app-key"))
        .and(query_param("api_key", "test-api-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let devices = client.list_devices().await.expect("device list");
    assert_eq!(devices.len(), 2);
    assert_eq!(devices[0].name.as_deref(), Some("Device 1"));
    assert_eq!(devices[0].station_type.as_deref(), Some("GW1000"));
    assert_eq!(devices[0].address(), Some("AA:BB:CC:DD:EE:FF"));
    assert_eq!(devices[1].address(), Some("865167060000000"));
    assert!(devices[1].attached_sensors.is_empty());
}

#[tokio::test]
async fn list_devices_is_structurally_idempotent() {
    let (server, client) = setup().await;

    let body = envelope(json!({ "list": [{ "id": 1, "name": "Only" }] }));
    Mock::given(method("GET"))
        .and(path("/device/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let first = client.list_devices().await.expect("first call");
    let second = client.list_devices().await.expect("second call");
    assert_eq!(first, second);
}

#[tokio::test]
async fn empty_device_list_is_not_an_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/device/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({ "list": [] }))))
        .mount(&server)
        .await;

    assert!(client.list_devices().await.expect("empty list").is_empty());
}

#[tokio::test]
async fn absent_list_field_yields_empty_sequence() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/device/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({}))))
        .mount(&server)
        .await;

    assert!(client.list_devices().await.expect("no list field").is_empty());
}

#[tokio::test]
async fn null_data_on_success_yields_empty_sequence() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/device/list"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "code": 0, "msg": "success", "data": null })),
        )
        .mount(&server)
        .await;

    assert!(client.list_devices().await.expect("null data").is_empty());
}

#[tokio::test]
async fn detail_sends_mac_parameter_for_mac_identifiers() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/device/info"))
        .and(query_param("mac", "AA:BB:CC:DD:EE:FF"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(envelope(json!({ "id": 1, "name": "Backyard" }))),
        )
        .mount(&server)
        .await;

    let id = DeviceIdentifier::parse("aa-bb-cc-dd-ee-ff").expect("valid mac");
    let detail = client.get_device_detail(&id).await.expect("detail");
    assert_eq!(detail["name"], "Backyard");
}

#[tokio::test]
async fn detail_sends_imei_parameter_for_imei_identifiers() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/device/info"))
        .and(query_param("imei", "865167060000000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({ "id": 2 }))))
        .mount(&server)
        .await;

    let id = DeviceIdentifier::parse("865167060000000").expect("valid imei");
    client.get_device_detail(&id).await.expect("detail");
}

#[tokio::test]
async fn realtime_forwards_filter_and_units() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/device/real_time"))
        .and(query_param("mac", "AA:BB:CC:DD:EE:FF"))
        .and(query_param("call_back", "outdoor,wind"))
        .and(query_param("temp_unitid", "1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(envelope(json!({ "outdoor": { "temperature": "21.3" } }))),
        )
        .mount(&server)
        .await;

    let id = DeviceIdentifier::parse("AA:BB:CC:DD:EE:FF").expect("valid mac");
    let units = UnitOptions {
        temperature: Some(1),
        ..UnitOptions::default()
    };
    let data = client
        .get_realtime(&id, Some("outdoor,wind"), &units)
        .await
        .expect("realtime");
    assert_eq!(data["outdoor"]["temperature"], "21.3");
}

#[tokio::test]
async fn history_forwards_dates_filter_and_cycle() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/device/history"))
        .and(query_param("mac", "AA:BB:CC:DD:EE:FF"))
        .and(query_param("start_date", "2024-01-01 00:00:00"))
        .and(query_param("end_date", "2024-01-02 00:00:00"))
        .and(query_param("call_back", "outdoor"))
        .and(query_param("cycle_type", "30min"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({ "outdoor": {} }))))
        .mount(&server)
        .await;

    let id = DeviceIdentifier::parse("AA:BB:CC:DD:EE:FF").expect("valid mac");
    client
        .get_history(
            &id,
            "2024-01-01 00:00:00",
            "2024-01-02 00:00:00",
            "outdoor",
            Some(CycleType::ThirtyMinutes),
            &UnitOptions::default(),
        )
        .await
        .expect("history");
}

// ── Failure classification ──────────────────────────────────────────

#[tokio::test]
async fn http_500_classifies_as_retryable_server_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/device/list"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = client.list_devices().await.expect_err("must fail");
    assert_eq!(err.kind(), ErrorKind::Server);
    assert!(err.is_retryable());
    assert_eq!(err.code(), Some(500));
}

#[tokio::test]
async fn http_429_is_retryable() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/device/list"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let err = client.list_devices().await.expect_err("must fail");
    assert!(err.is_retryable());
    assert_eq!(err.code(), Some(429));
}

#[tokio::test]
async fn envelope_error_code_carries_upstream_message() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/device/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 40010,
            "msg": "Illegal Application_Key Parameter",
            "data": null
        })))
        .mount(&server)
        .await;

    let err = client.list_devices().await.expect_err("must fail");
    assert_eq!(err.kind(), ErrorKind::Authentication);
    assert!(!err.is_retryable());
    match err {
        Error::Api { code, message, .. } => {
            assert_eq!(code, 40010);
            assert_eq!(message, "Illegal Application_Key Parameter");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn server_busy_code_is_retryable() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/device/list"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "code": -1, "msg": "System is busy." })),
        )
        .mount(&server)
        .await;

    let err = client.list_devices().await.expect_err("must fail");
    assert_eq!(err.kind(), ErrorKind::ServerBusy);
    assert!(err.is_retryable());
}

#[tokio::test]
async fn non_envelope_body_is_a_parsing_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/device/list"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let err = client.list_devices().await.expect_err("must fail");
    assert_eq!(err.kind(), ErrorKind::DataParsing);
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn slow_response_times_out_with_timeout_kind() {
    let server = MockServer::start().await;
    let config = ClientConfig::new(credentials())
        .with_base_url(Url::parse(&server.uri()).expect("mock server URL"))
        .with_timeout(Duration::from_millis(100));
    let client = WeatherClient::new(config).expect("valid config");

    Mock::given(method("GET"))
        .and(path("/device/list"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(envelope(json!({ "list": [] })))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let err = client.list_devices().await.expect_err("must time out");
    assert_eq!(err.kind(), ErrorKind::Timeout);
    assert!(err.is_retryable());
}

#[tokio::test]
async fn connection_failure_is_a_network_error_without_secrets() {
    // Port 1 is never listening; the connect fails immediately.
    let config = ClientConfig::new(credentials())
        .with_base_url(Url::parse("http://127.0.0.1:1").expect("url"));
    let client = WeatherClient::new(config).expect("valid config");

    let err = client.list_devices().await.expect_err("must fail");
    assert_eq!(err.kind(), ErrorKind::Network);
    assert!(err.is_retryable());

    let rendered = err.to_string();
    assert!(!rendered.contains("test-app-key"));
    assert!(!rendered.contains("test-api-key"));
}
