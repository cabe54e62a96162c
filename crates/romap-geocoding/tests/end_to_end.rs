//! Full search pipeline against mock geocoding and spatial-query servers

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use romap_common::CorrelationId;
use romap_config::ApplicationConfig;
use romap_geocoding::{GeocodeService, GeocodingError, ResultType, SearchService};
use serde_json::{Value, json};
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Backends {
    geocoder: MockServer,
    spatial: MockServer,
}

impl Backends {
    async fn start() -> Self {
        Self {
            geocoder: MockServer::start().await,
            spatial: MockServer::start().await,
        }
    }

    fn service(&self) -> GeocodeService {
        let mut config = ApplicationConfig::default();
        config.geocoder.base_url = self.geocoder.uri();
        config.enrichment.overpass_url = format!("{}/api/interpreter", self.spatial.uri());
        GeocodeService::from_config(&config).unwrap()
    }

    async fn expect_no_spatial_queries(&self) {
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"elements": []})))
            .expect(0)
            .mount(&self.spatial)
            .await;
    }
}

/// Geocoder record with a `[west, south, east, north]` box
fn place(osm_id: u64, name: &str, category: &str, subtype: &str, bbox: [f64; 4]) -> Value {
    let [west, south, east, north] = bbox;
    json!({
        "osm_id": osm_id,
        "osm_type": "way",
        "lat": ((south + north) / 2.0).to_string(),
        "lon": ((west + east) / 2.0).to_string(),
        "display_name": format!("{name}, România"),
        "namedetails": {"name": name},
        "boundingbox": [south.to_string(), north.to_string(), west.to_string(), east.to_string()],
        "category": category,
        "type": subtype
    })
}

#[tokio::test]
async fn test_highway_segments_collapse_into_one_result() {
    let backends = Backends::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "A1, Romania"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            place(1, "Autostrada A1", "highway", "motorway", [21.20, 45.70, 21.30, 45.75]),
            place(2, "Autostrada A1", "highway", "motorway", [23.90, 45.80, 24.00, 45.85]),
            place(3, "Autostrada A1", "highway", "motorway", [26.00, 44.40, 26.05, 44.45]),
        ])))
        .expect(1)
        .mount(&backends.geocoder)
        .await;
    // The union is already wide, so nothing is enriched
    backends.expect_no_spatial_queries().await;

    let results = backends
        .service()
        .search("A1", &CorrelationId::new())
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].name(), "Autostrada A1");
    assert_eq!(results[0].result_type(), ResultType::Highway);
    assert_eq!(results[0].id(), "1");
    assert_eq!(
        results[0].bbox().map(<[f64; 4]>::from),
        Some([21.20, 44.40, 26.05, 45.85])
    );
}

#[tokio::test]
async fn test_small_extent_is_replaced_from_spatial_backend() {
    let backends = Backends::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            place(7, "DN7", "highway", "primary", [24.10, 45.60, 24.20, 45.65]),
        ])))
        .mount(&backends.geocoder)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/interpreter"))
        .and(body_string_contains(r#"["ref"="DN7"]"#))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "elements": [
                {"type": "relation", "id": 1, "bounds": {"minlat": 44.43, "minlon": 21.30, "maxlat": 46.20, "maxlon": 26.00}},
                {"type": "way", "id": 2, "tags": {"ref": "DN7"}}
            ]
        })))
        .expect(1)
        .mount(&backends.spatial)
        .await;

    let results = backends
        .service()
        .search("DN7", &CorrelationId::new())
        .await
        .unwrap();

    assert_eq!(results[0].result_type(), ResultType::Road);
    assert_eq!(
        results[0].bbox().map(<[f64; 4]>::from),
        Some([21.30, 44.43, 26.00, 46.20])
    );
}

#[tokio::test]
async fn test_relaxed_fallback_runs_after_failed_exact_query() {
    let backends = Backends::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            place(3, "Autostrada A3", "highway", "motorway", [26.10, 44.45, 26.15, 44.50]),
        ])))
        .mount(&backends.geocoder)
        .await;
    Mock::given(method("POST"))
        .and(body_string_contains(r#"["ref"="A3"]"#))
        .respond_with(ResponseTemplate::new(504))
        .expect(1)
        .mount(&backends.spatial)
        .await;
    Mock::given(method("POST"))
        .and(body_string_contains(r#"["ref"~"#))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "elements": [
                {"type": "way", "id": 1, "bounds": {"minlat": 44.45, "minlon": 23.50, "maxlat": 46.80, "maxlon": 26.15}}
            ]
        })))
        .expect(1)
        .mount(&backends.spatial)
        .await;

    let results = backends
        .service()
        .search("A3", &CorrelationId::new())
        .await
        .unwrap();

    assert_eq!(
        results[0].bbox().map(<[f64; 4]>::from),
        Some([23.50, 44.45, 26.15, 46.80])
    );
}

#[tokio::test]
async fn test_enrichment_failure_keeps_original_extent() {
    let backends = Backends::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            place(1, "Autostrada A1", "highway", "motorway", [21.20, 45.70, 21.30, 45.75]),
        ])))
        .mount(&backends.geocoder)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&backends.spatial)
        .await;

    let results = backends
        .service()
        .search("A1", &CorrelationId::new())
        .await
        .unwrap();

    assert_eq!(
        results[0].bbox().map(<[f64; 4]>::from),
        Some([21.20, 45.70, 21.30, 45.75])
    );
}

#[tokio::test]
async fn test_blank_query_makes_no_network_calls() {
    let backends = Backends::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&backends.geocoder)
        .await;
    backends.expect_no_spatial_queries().await;

    let service = backends.service();
    assert!(service.search("", &CorrelationId::new()).await.unwrap().is_empty());
    assert!(service.search(" ", &CorrelationId::new()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_wide_city_is_returned_unmodified() {
    let backends = Backends::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "Cluj"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            place(42, "Cluj-Napoca", "place", "city", [22.00, 44.00, 25.00, 47.00]),
        ])))
        .mount(&backends.geocoder)
        .await;
    backends.expect_no_spatial_queries().await;

    let results = backends
        .service()
        .search("Cluj", &CorrelationId::new())
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].result_type(), ResultType::City);
    assert_eq!(results[0].name(), "Cluj-Napoca");
    assert_eq!(results[0].display_name(), "Cluj-Napoca, România");
    assert_eq!(
        results[0].bbox().map(<[f64; 4]>::from),
        Some([22.00, 44.00, 25.00, 47.00])
    );
}

#[tokio::test]
async fn test_small_city_is_never_enriched() {
    let backends = Backends::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            place(5, "Sat A1", "place", "hamlet", [24.00, 45.00, 24.01, 45.01]),
        ])))
        .mount(&backends.geocoder)
        .await;
    backends.expect_no_spatial_queries().await;

    let results = backends
        .service()
        .search("Sat A1", &CorrelationId::new())
        .await
        .unwrap();

    assert_eq!(results[0].result_type(), ResultType::City);
}

#[tokio::test]
async fn test_primary_failure_fails_search_without_enrichment() {
    let backends = Backends::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&backends.geocoder)
        .await;
    backends.expect_no_spatial_queries().await;

    let err = backends
        .service()
        .search("A1", &CorrelationId::new())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        GeocodingError::RequestFailed {
            backend: "geocoder",
            status: 500,
            ..
        }
    ));
}

#[tokio::test]
async fn test_results_are_capped_at_fifteen() {
    let backends = Backends::start().await;
    let places: Vec<Value> = (0..20_u32)
        .map(|i| {
            let offset = f64::from(i) * 0.1;
            place(
                100 + u64::from(i),
                &format!("Strada {i}"),
                "highway",
                "residential",
                [22.0 + offset, 45.0, 22.05 + offset, 45.05],
            )
        })
        .collect();
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(Value::Array(places)))
        .mount(&backends.geocoder)
        .await;
    backends.expect_no_spatial_queries().await;

    let results = backends
        .service()
        .search("strada", &CorrelationId::new())
        .await
        .unwrap();

    assert_eq!(results.len(), 15);
    assert_eq!(results[0].id(), "100");
    assert_eq!(results[14].id(), "114");
    assert!(results.iter().all(|r| r.result_type() == ResultType::Street));
}
