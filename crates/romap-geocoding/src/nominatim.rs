//! Geocoding backend client (Nominatim search API)

use crate::classify::classify;
use crate::error::{GeocodingError, GeocodingResult};
use crate::types::{BoundingBox, CandidateRecord};
use async_trait::async_trait;
use romap_common::CorrelationId;
use romap_config::GeocoderConfig;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::time::Duration;

const BACKEND: &str = "geocoder";

/// One raw record as returned by the search endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPlace {
    #[serde(default)]
    pub osm_id: Option<u64>,
    pub lat: String,
    pub lon: String,
    pub display_name: String,
    /// Localized names; `name` is the preferred short label
    #[serde(default)]
    pub namedetails: Option<HashMap<String, String>>,
    /// `[south, north, west, east]`; `None` when absent or malformed
    #[serde(default, deserialize_with = "lenient_bbox")]
    pub boundingbox: Option<Vec<String>>,
    /// `category` in jsonv2 output, `class` in the legacy json format
    #[serde(default, alias = "class")]
    pub category: String,
    #[serde(default, rename = "type")]
    pub subtype: String,
}

/// Accept string or numeric corners; anything else drops the box, not the page
fn lenient_bbox<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(Value::as_array)
        .and_then(|items| items.iter().map(corner_text).collect()))
}

fn corner_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

/// Parameters of one search request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeocodeRequest {
    pub query: String,
    pub limit: usize,
    /// Ask the backend to collapse near-duplicates itself
    pub dedupe: bool,
}

/// Trait for text-to-location backends
#[async_trait]
pub trait GeocodingBackend: Send + Sync {
    /// Run a free-text search restricted to the configured country
    async fn search(
        &self,
        request: &GeocodeRequest,
        correlation_id: &CorrelationId,
    ) -> GeocodingResult<Vec<RawPlace>>;
}

/// HTTP client for a Nominatim-compatible `/search` endpoint
#[derive(Debug, Clone)]
pub struct NominatimClient {
    http: reqwest::Client,
    search_url: String,
    country_code: String,
    accept_language: String,
}

impl NominatimClient {
    /// Build a client from configuration
    ///
    /// # Errors
    /// Returns `GeocodingError::Transport` if the HTTP client cannot be built
    pub fn new(config: &GeocoderConfig) -> GeocodingResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            search_url: format!("{}/search", config.base_url.trim_end_matches('/')),
            country_code: config.country_code.clone(),
            accept_language: config.accept_language.clone(),
        })
    }
}

#[async_trait]
impl GeocodingBackend for NominatimClient {
    #[tracing::instrument(skip(self, request, correlation_id), fields(query = %request.query, correlation_id = %correlation_id))]
    async fn search(
        &self,
        request: &GeocodeRequest,
        correlation_id: &CorrelationId,
    ) -> GeocodingResult<Vec<RawPlace>> {
        let limit = request.limit.to_string();
        let dedupe = if request.dedupe { "1" } else { "0" };

        let response = self
            .http
            .get(&self.search_url)
            .header(reqwest::header::ACCEPT_LANGUAGE, &self.accept_language)
            .query(&[
                ("q", request.query.as_str()),
                ("format", "jsonv2"),
                ("countrycodes", self.country_code.as_str()),
                ("addressdetails", "1"),
                ("namedetails", "1"),
                ("limit", limit.as_str()),
                ("dedupe", dedupe),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Geocoding request rejected");
            return Err(GeocodingError::RequestFailed {
                backend: BACKEND,
                status: status.as_u16(),
                correlation_id: correlation_id.clone(),
            });
        }

        let body = response.text().await?;
        let places: Vec<RawPlace> =
            serde_json::from_str(&body).map_err(|source| GeocodingError::Decode {
                backend: BACKEND,
                source,
            })?;

        tracing::debug!(count = places.len(), "Geocoding backend returned candidates");
        Ok(places)
    }
}

/// Short display name: structured `name` if present, else the first
/// comma-delimited segment of the full label
fn short_name(place: &RawPlace) -> String {
    place
        .namedetails
        .as_ref()
        .and_then(|names| names.get("name"))
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .map_or_else(
            || {
                place
                    .display_name
                    .split(',')
                    .next()
                    .unwrap_or_default()
                    .trim()
                    .to_string()
            },
            str::to_string,
        )
}

/// Convert raw backend records into classified pipeline records
///
/// Records without parseable coordinates are dropped. Ids are the backend
/// feature id, falling back to the page position, and are made unique
/// within the page.
pub fn ingest(places: Vec<RawPlace>) -> Vec<CandidateRecord> {
    let mut seen_ids = HashSet::with_capacity(places.len());
    let mut records = Vec::with_capacity(places.len());

    for (idx, place) in places.into_iter().enumerate() {
        let (Ok(lat), Ok(lng)) = (place.lat.trim().parse::<f64>(), place.lon.trim().parse::<f64>())
        else {
            tracing::warn!(
                display_name = %place.display_name,
                "Skipping candidate with unparseable coordinates"
            );
            continue;
        };

        let mut id = place
            .osm_id
            .map_or_else(|| idx.to_string(), |osm_id| osm_id.to_string());
        if seen_ids.contains(&id) {
            id = format!("{id}-{idx}");
        }
        seen_ids.insert(id.clone());

        let bbox = place
            .boundingbox
            .as_deref()
            .and_then(BoundingBox::from_backend);

        records.push(CandidateRecord {
            id,
            name: short_name(&place),
            result_type: classify(&place.subtype, &place.category),
            lat,
            lng,
            accumulated_boxes: bbox.into_iter().collect(),
            bbox,
            display_name: place.display_name,
        });
    }

    records
}
