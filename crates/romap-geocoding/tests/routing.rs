//! Route client tests against a mock HTTP backend

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use romap_common::CorrelationId;
use romap_config::RoutingConfig;
use romap_geocoding::{GeocodingError, OsrmRouter, RouteProvider, Waypoint};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn router(server: &MockServer) -> OsrmRouter {
    OsrmRouter::new(&RoutingConfig {
        base_url: server.uri(),
        ..RoutingConfig::default()
    })
    .unwrap()
}

fn bucharest_to_sibiu() -> Vec<Waypoint> {
    vec![Waypoint::new(44.43, 26.1), Waypoint::new(45.8, 24.15)]
}

#[tokio::test]
async fn test_route_is_parsed_and_rounded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/route/v1/driving/26.1,44.43;24.15,45.8"))
        .and(query_param("overview", "full"))
        .and(query_param("geometries", "geojson"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": "Ok",
            "routes": [{
                "geometry": {"type": "LineString", "coordinates": [[26.1, 44.43], [25.0, 45.0], [24.15, 45.8]]},
                "distance": 276_449.3,
                "duration": 12_345.6,
                "legs": []
            }],
            "waypoints": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let plan = router(&server)
        .fetch_route(&bucharest_to_sibiu(), &CorrelationId::new())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(plan.geometry.geometry_type, "LineString");
    assert_eq!(plan.geometry.coordinates.len(), 3);
    assert!((plan.distance_km - 276.4).abs() < 1e-9);
    assert!((plan.duration_min - 206.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_no_routes_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": "NoRoute", "routes": []})))
        .mount(&server)
        .await;

    let plan = router(&server)
        .fetch_route(&bucharest_to_sibiu(), &CorrelationId::new())
        .await
        .unwrap();

    assert!(plan.is_none());
}

#[tokio::test]
async fn test_server_error_is_request_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let err = router(&server)
        .fetch_route(&bucharest_to_sibiu(), &CorrelationId::new())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        GeocodingError::RequestFailed {
            backend: "routing",
            status: 502,
            ..
        }
    ));
}

#[tokio::test]
async fn test_fewer_than_two_waypoints_skip_the_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let router = router(&server);
    let cid = CorrelationId::new();

    assert!(router.fetch_route(&[], &cid).await.unwrap().is_none());
    assert!(
        router
            .fetch_route(&[Waypoint::new(44.43, 26.1)], &cid)
            .await
            .unwrap()
            .is_none()
    );
}
