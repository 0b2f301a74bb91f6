// Integration tests for TrackerClient against a wiremock server.

use secrecy::SecretString;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use geoblink_api::{Error, TrackerClient, TransportConfig};

fn client_for(server: &MockServer) -> TrackerClient {
    let url = server.uri().parse().expect("mock server URL");
    TrackerClient::new(url, &TransportConfig::default()).expect("client builds")
}

fn tokens() -> (SecretString, SecretString) {
    (
        SecretString::from("tok-123".to_owned()),
        SecretString::from("hash-456".to_owned()),
    )
}

#[tokio::test]
async fn list_trackers_unwraps_envelope() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/trackers"))
        .and(body_string_contains("token=tok-123"))
        .and(body_string_contains("u_hash=hash-456"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "code": "200",
            "data": {
                "trackers": [
                    { "imei": "860000000000001", "name": "Truck", "lat": "55.75", "lng": 37.61,
                      "number": "A123BC", "online": true, "charge": 80 },
                    { "imei": "860000000000002" }
                ]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let (token, hash) = tokens();
    let trackers = client
        .list_trackers(&token, &hash)
        .await
        .expect("tracker list");

    assert_eq!(trackers.len(), 2);
    assert_eq!(trackers[0].imei, "860000000000001");
    assert_eq!(trackers[0].lat, Some(55.75));
    assert_eq!(trackers[0].number.as_deref(), Some("A123BC"));
    assert_eq!(trackers[1].lat, None);
}

#[tokio::test]
async fn rejected_token_maps_to_session_expired() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/trackers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "code": "401",
            "message": "token rejected"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let (token, hash) = tokens();
    let err = client
        .list_trackers(&token, &hash)
        .await
        .expect_err("should fail");

    assert!(matches!(err, Error::SessionExpired));
    assert!(err.is_auth_expired());
}

#[tokio::test]
async fn platform_error_carries_code_and_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "code": "404",
            "message": "code mismatch"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .confirm_code("+79990000000", "1234")
        .await
        .expect_err("should fail");

    match err {
        Error::Platform { code, message } => {
            assert_eq!(code, "404");
            assert_eq!(message, "code mismatch");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn confirm_code_returns_grant() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("phone="))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "code": "200",
            "data": { "token": "tok-123", "u_hash": "hash-456" }
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let grant = client
        .confirm_code("+79990000000", "1234")
        .await
        .expect("grant");

    assert_eq!(grant.token, "tok-123");
    assert_eq!(grant.u_hash, "hash-456");
}

#[tokio::test]
async fn bind_tracker_sends_imei_and_returns_record() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/bind"))
        .and(body_string_contains("token=tok-123"))
        .and(body_string_contains("860000000000003"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "code": "200",
            "data": {
                "tracker": { "imei": "860000000000003", "name": "New van" }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let (token, hash) = tokens();
    let tracker = client
        .bind_tracker(&token, &hash, "860000000000003", Some("New van"))
        .await
        .expect("bound tracker");

    assert_eq!(tracker.imei, "860000000000003");
    assert_eq!(tracker.name.as_deref(), Some("New van"));
}

#[tokio::test]
async fn create_subscription_returns_id() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/subscription"))
        .and(body_string_contains("tariff"))
        .and(body_string_contains("autoRenew"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "code": "200",
            "data": { "subsId": "subs-42" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let (token, hash) = tokens();
    let subs_id = client
        .create_subscription(&token, &hash, "monthly")
        .await
        .expect("subscription id");

    assert_eq!(subs_id, "subs-42");
}

#[tokio::test]
async fn create_payment_yields_checkout_order() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/payment"))
        .and(body_string_contains("paymentWay"))
        .and(body_string_contains("RUB"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "code": "200",
            "data": { "pId": "pay-7", "url": "https://pay.example/checkout/7" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let (token, hash) = tokens();
    let order = client
        .create_payment(&token, &hash, "199.00", Some("subs-42"))
        .await
        .expect("payment order");

    assert_eq!(order.payment_id, "pay-7");
    assert_eq!(order.url.as_deref(), Some("https://pay.example/checkout/7"));
}

#[tokio::test]
async fn garbage_body_is_a_deserialization_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/trackers"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let (token, hash) = tokens();
    let err = client
        .list_trackers(&token, &hash)
        .await
        .expect_err("should fail");

    assert!(matches!(err, Error::Deserialization { .. }));
}
