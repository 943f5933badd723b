//! IpGeolocator against a mock ip-api.com using wiremock.

use std::{sync::Arc, time::Duration};

use serde_json::json;
use weatherlook_core::{
    Coordinates, GeolocationError, Geolocator, IpGeolocator, LookupController, LookupOutcome,
    ProviderId, WeatherClient, WeatherObservation,
};
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn serve(template: ResponseTemplate) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET")).respond_with(template).mount(&server).await;
    server
}

#[tokio::test]
async fn success_returns_coordinates() {
    let server = serve(ResponseTemplate::new(200).set_body_json(json!({
        "status": "success",
        "city": "Lisbon",
        "lat": 38.72,
        "lon": -9.14
    })))
    .await;

    let geo = IpGeolocator::with_url(server.uri()).unwrap();
    assert_eq!(geo.current_position().await, Ok(Coordinates::new(38.72, -9.14)));
}

#[tokio::test]
async fn refused_lookup_is_denied_with_message() {
    let server = serve(
        ResponseTemplate::new(200)
            .set_body_json(json!({"status": "fail", "message": "private range"})),
    )
    .await;

    let geo = IpGeolocator::with_url(server.uri()).unwrap();
    assert_eq!(
        geo.current_position().await,
        Err(GeolocationError::Denied("private range".to_string()))
    );
}

#[tokio::test]
async fn refused_lookup_without_message_is_still_denied() {
    let server = serve(ResponseTemplate::new(200).set_body_json(json!({"status": "fail"}))).await;

    let geo = IpGeolocator::with_url(server.uri()).unwrap();
    assert!(matches!(geo.current_position().await, Err(GeolocationError::Denied(_))));
}

#[tokio::test]
async fn missing_coordinates_is_other() {
    let server = serve(
        ResponseTemplate::new(200).set_body_json(json!({"status": "success", "lat": 38.72})),
    )
    .await;

    let geo = IpGeolocator::with_url(server.uri()).unwrap();
    match geo.current_position().await {
        Err(GeolocationError::Other(msg)) => assert!(msg.contains("no coordinates"), "{msg}"),
        other => panic!("expected Other, got {other:?}"),
    }
}

#[tokio::test]
async fn error_status_is_other() {
    let server = serve(ResponseTemplate::new(429).set_body_string("slow down")).await;

    let geo = IpGeolocator::with_url(server.uri()).unwrap();
    match geo.current_position().await {
        Err(GeolocationError::Other(msg)) => assert!(msg.contains("429"), "{msg}"),
        other => panic!("expected Other, got {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_service_is_unavailable() {
    let geo = IpGeolocator::with_url("http://127.0.0.1:9/json").unwrap();
    assert_eq!(geo.current_position().await, Err(GeolocationError::Unavailable));
}

#[tokio::test]
async fn denied_position_leaves_seeded_controller_untouched() {
    let server = serve(
        ResponseTemplate::new(200)
            .set_body_json(json!({"status": "fail", "message": "private range"})),
    )
    .await;

    // No key and an unroutable endpoint: any weather request would fail loudly.
    let profile = ProviderId::WeatherStack.profile().with_base_url("http://127.0.0.1:9/current");
    let provider = Arc::new(WeatherClient::new(profile, None, Duration::from_secs(1)).unwrap());
    let controller = LookupController::new(provider);
    controller.seed(WeatherObservation::demo());
    let before = controller.snapshot();

    let geo = IpGeolocator::with_url(server.uri()).unwrap();
    let outcome = controller.locate(&geo).await;

    assert_eq!(
        outcome,
        LookupOutcome::NoPosition(GeolocationError::Denied("private range".to_string()))
    );
    assert_eq!(controller.snapshot(), before);
}
