//! Test utilities: scripted in-memory backends and record builders

use crate::error::{GeocodingError, GeocodingResult};
use crate::nominatim::{GeocodeRequest, GeocodingBackend, RawPlace};
use crate::overpass::{Bounds, OverpassElement, OverpassResponse, SpatialQueryBackend};
use async_trait::async_trait;
use romap_common::CorrelationId;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Scripted reply of a mock backend
#[derive(Debug, Clone)]
enum MockReply<T> {
    Data(T),
    Status(u16),
}

impl<T: Clone> MockReply<T> {
    fn resolve(&self, backend: &'static str, correlation_id: &CorrelationId) -> GeocodingResult<T> {
        match self {
            Self::Data(data) => Ok(data.clone()),
            Self::Status(status) => Err(GeocodingError::RequestFailed {
                backend,
                status: *status,
                correlation_id: correlation_id.clone(),
            }),
        }
    }
}

/// Mock geocoding backend replaying a FIFO script
///
/// Once the script is exhausted every call returns no places.
#[derive(Clone, Default)]
pub struct MockGeocoder {
    replies: Arc<Mutex<VecDeque<MockReply<Vec<RawPlace>>>>>,
    requests: Arc<Mutex<Vec<GeocodeRequest>>>,
}

impl MockGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful reply
    #[must_use]
    pub fn then_places(self, places: Vec<RawPlace>) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(MockReply::Data(places));
        self
    }

    /// Queue a non-success HTTP status
    #[must_use]
    pub fn then_status(self, status: u16) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(MockReply::Status(status));
        self
    }

    /// Every request received so far (for test assertions)
    pub fn requests(&self) -> Vec<GeocodeRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl GeocodingBackend for MockGeocoder {
    async fn search(
        &self,
        request: &GeocodeRequest,
        correlation_id: &CorrelationId,
    ) -> GeocodingResult<Vec<RawPlace>> {
        self.requests.lock().unwrap().push(request.clone());
        let reply = self.replies.lock().unwrap().pop_front();
        reply.map_or_else(|| Ok(Vec::new()), |r| r.resolve("geocoder", correlation_id))
    }
}

/// One answer rule of [`MockSpatialBackend`]
#[derive(Debug, Clone)]
struct SpatialRule {
    needle: String,
    reply: MockReply<OverpassResponse>,
    delay: Option<Duration>,
}

/// Mock spatial backend answering by substring match on the query text
///
/// Rules are checked in registration order; the first rule whose needle
/// occurs in the query answers it. Unmatched queries get an empty response.
#[derive(Clone, Default)]
pub struct MockSpatialBackend {
    rules: Arc<Mutex<Vec<SpatialRule>>>,
    queries: Arc<Mutex<Vec<String>>>,
    completed: Arc<Mutex<Vec<String>>>,
}

impl MockSpatialBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn rule(self, needle: &str, reply: MockReply<OverpassResponse>, delay: Option<Duration>) -> Self {
        self.rules.lock().unwrap().push(SpatialRule {
            needle: needle.to_string(),
            reply,
            delay,
        });
        self
    }

    /// Answer queries containing `needle` with these elements
    #[must_use]
    pub fn on(self, needle: &str, elements: Vec<OverpassElement>) -> Self {
        self.rule(needle, MockReply::Data(OverpassResponse { elements }), None)
    }

    /// Like [`Self::on`], but the answer arrives only after `delay`
    #[must_use]
    pub fn on_delayed(self, needle: &str, elements: Vec<OverpassElement>, delay: Duration) -> Self {
        self.rule(
            needle,
            MockReply::Data(OverpassResponse { elements }),
            Some(delay),
        )
    }

    /// Fail queries containing `needle` with an HTTP status
    #[must_use]
    pub fn failing_on(self, needle: &str, status: u16) -> Self {
        self.rule(needle, MockReply::Status(status), None)
    }

    /// Every query received so far, in arrival order
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }

    /// Every answered query, in completion order
    pub fn completed_queries(&self) -> Vec<String> {
        self.completed.lock().unwrap().clone()
    }

    /// Number of queries received so far
    pub fn query_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }
}

#[async_trait]
impl SpatialQueryBackend for MockSpatialBackend {
    async fn query(
        &self,
        query: &str,
        correlation_id: &CorrelationId,
    ) -> GeocodingResult<OverpassResponse> {
        self.queries.lock().unwrap().push(query.to_string());
        let rule = self
            .rules
            .lock()
            .unwrap()
            .iter()
            .find(|rule| query.contains(rule.needle.as_str()))
            .cloned();

        if let Some(delay) = rule.as_ref().and_then(|rule| rule.delay) {
            tokio::time::sleep(delay).await;
        }
        self.completed.lock().unwrap().push(query.to_string());

        rule.map_or_else(
            || Ok(OverpassResponse::default()),
            |rule| rule.reply.resolve("spatial query", correlation_id),
        )
    }
}

/// Build a raw geocoder record; `bbox` is given as `[west, south, east, north]`
pub fn raw_place(
    osm_id: u64,
    name: &str,
    category: &str,
    subtype: &str,
    bbox: Option<[f64; 4]>,
) -> RawPlace {
    // Backend order is [south, north, west, east]
    let boundingbox = bbox.map(|[west, south, east, north]| {
        vec![
            south.to_string(),
            north.to_string(),
            west.to_string(),
            east.to_string(),
        ]
    });
    let (lat, lon) = bbox.map_or((45.9, 24.9), |[west, south, east, north]| {
        (f64::midpoint(south, north), f64::midpoint(west, east))
    });

    RawPlace {
        osm_id: Some(osm_id),
        lat: lat.to_string(),
        lon: lon.to_string(),
        display_name: format!("{name}, România"),
        namedetails: Some(HashMap::from([("name".to_string(), name.to_string())])),
        boundingbox,
        category: category.to_string(),
        subtype: subtype.to_string(),
    }
}

/// Build a spatial-query element; `bbox` is given as `[west, south, east, north]`
pub fn element(id: u64, bbox: [f64; 4]) -> OverpassElement {
    let [west, south, east, north] = bbox;
    OverpassElement {
        element_type: "way".to_string(),
        id,
        bounds: Some(Bounds {
            minlat: south,
            minlon: west,
            maxlat: north,
            maxlon: east,
        }),
        tags: HashMap::new(),
    }
}
