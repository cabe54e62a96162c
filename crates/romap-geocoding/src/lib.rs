//! Romanian road-infrastructure geocoding
//!
//! This crate turns a free-text query into classified, deduplicated search
//! results. Highway and road segments reported separately by the geocoding
//! backend are merged by name, and extents still too small to represent the
//! whole route are widened from a supplementary spatial-query backend.

pub mod classify;
pub mod enrich;
pub mod error;
pub mod merge;
pub mod nominatim;
pub mod overpass;
pub mod query;
pub mod routing;
pub mod service;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-export main types
pub use enrich::{EnrichmentStrategy, ExtentEnricher};
pub use error::{GeocodingError, GeocodingResult};
pub use nominatim::{GeocodeRequest, GeocodingBackend, NominatimClient, RawPlace};
pub use overpass::{OverpassClient, OverpassResponse, SpatialQueryBackend};
pub use routing::{LineString, OsrmRouter, RoutePlan, RouteProvider, Waypoint};
pub use service::{GeocodeService, SearchService};
pub use types::{BoundingBox, ResultType, SearchResult};

// Re-export test utilities when test-utils feature is enabled
#[cfg(any(test, feature = "test-utils"))]
pub mod test_mocks {
    pub use crate::test_utils::{MockGeocoder, MockSpatialBackend, element, raw_place};
}
