//! Route-geometry client (OSRM route service)
//!
//! A single stateless request: ordered waypoints in, one driving path with
//! distance and duration out.

use crate::error::{GeocodingError, GeocodingResult};
use async_trait::async_trait;
use romap_common::CorrelationId;
use romap_config::RoutingConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const BACKEND: &str = "routing";

/// One stop on a route
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub lat: f64,
    pub lng: f64,
}

impl Waypoint {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl std::str::FromStr for Waypoint {
    type Err = String;

    /// Parse `"lat,lng"`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lng) = s
            .split_once(',')
            .ok_or_else(|| format!("expected LAT,LNG, got '{s}'"))?;
        let lat: f64 = lat
            .trim()
            .parse()
            .map_err(|_| format!("invalid latitude in '{s}'"))?;
        let lng: f64 = lng
            .trim()
            .parse()
            .map_err(|_| format!("invalid longitude in '{s}'"))?;

        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
            return Err(format!("coordinates out of range in '{s}'"));
        }
        Ok(Self { lat, lng })
    }
}

/// GeoJSON LineString geometry, coordinates as `[lng, lat]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineString {
    #[serde(rename = "type")]
    pub geometry_type: String,
    pub coordinates: Vec<[f64; 2]>,
}

/// A computed route
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutePlan {
    pub geometry: LineString,
    /// Kilometres, one decimal
    pub distance_km: f64,
    /// Whole minutes
    pub duration_min: f64,
}

#[derive(Debug, Deserialize)]
struct OsrmResponse {
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    geometry: LineString,
    /// Metres
    distance: f64,
    /// Seconds
    duration: f64,
}

impl From<OsrmRoute> for RoutePlan {
    fn from(route: OsrmRoute) -> Self {
        Self {
            geometry: route.geometry,
            distance_km: (route.distance / 100.0).round() / 10.0,
            duration_min: (route.duration / 60.0).round(),
        }
    }
}

/// Trait for waypoint-to-path routing backends
#[async_trait]
pub trait RouteProvider: Send + Sync {
    /// Compute a route through the waypoints in order
    ///
    /// Returns `None` for fewer than two waypoints or when the backend finds
    /// no route.
    async fn fetch_route(
        &self,
        waypoints: &[Waypoint],
        correlation_id: &CorrelationId,
    ) -> GeocodingResult<Option<RoutePlan>>;
}

/// HTTP client for an OSRM-compatible route service
#[derive(Debug, Clone)]
pub struct OsrmRouter {
    http: reqwest::Client,
    base_url: String,
    profile: String,
}

impl OsrmRouter {
    /// # Errors
    /// Returns `GeocodingError::Transport` if the HTTP client cannot be built
    pub fn new(config: &RoutingConfig) -> GeocodingResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            profile: config.profile.clone(),
        })
    }

    fn route_url(&self, waypoints: &[Waypoint]) -> String {
        let coordinates = waypoints
            .iter()
            .map(|w| format!("{},{}", w.lng, w.lat))
            .collect::<Vec<_>>()
            .join(";");
        format!("{}/route/v1/{}/{coordinates}", self.base_url, self.profile)
    }
}

#[async_trait]
impl RouteProvider for OsrmRouter {
    #[tracing::instrument(skip(self, waypoints, correlation_id), fields(waypoints = waypoints.len(), correlation_id = %correlation_id))]
    async fn fetch_route(
        &self,
        waypoints: &[Waypoint],
        correlation_id: &CorrelationId,
    ) -> GeocodingResult<Option<RoutePlan>> {
        if waypoints.len() < 2 {
            return Ok(None);
        }

        let response = self
            .http
            .get(self.route_url(waypoints))
            .query(&[("overview", "full"), ("geometries", "geojson")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodingError::RequestFailed {
                backend: BACKEND,
                status: status.as_u16(),
                correlation_id: correlation_id.clone(),
            });
        }

        let body = response.text().await?;
        let parsed: OsrmResponse =
            serde_json::from_str(&body).map_err(|source| GeocodingError::Decode {
                backend: BACKEND,
                source,
            })?;

        Ok(parsed.routes.into_iter().next().map(RoutePlan::from))
    }
}
