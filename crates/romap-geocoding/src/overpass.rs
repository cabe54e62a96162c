//! Spatial-query backend client (Overpass API)

use crate::error::{GeocodingError, GeocodingResult};
use crate::types::BoundingBox;
use async_trait::async_trait;
use romap_common::CorrelationId;
use romap_config::EnrichmentConfig;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

const BACKEND: &str = "spatial query";

/// Extent of one matched feature
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Bounds {
    pub minlat: f64,
    pub minlon: f64,
    pub maxlat: f64,
    pub maxlon: f64,
}

impl Bounds {
    pub fn to_bbox(self) -> Option<BoundingBox> {
        BoundingBox::new(self.minlon, self.minlat, self.maxlon, self.maxlat)
    }
}

/// One matched node, way or relation
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OverpassElement {
    #[serde(rename = "type")]
    pub element_type: String,
    pub id: u64,
    #[serde(default)]
    pub bounds: Option<Bounds>,
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

/// Interpreter response document
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OverpassResponse {
    #[serde(default)]
    pub elements: Vec<OverpassElement>,
}

impl OverpassResponse {
    /// Extents of every element that reported one
    pub fn boxes(&self) -> impl Iterator<Item = BoundingBox> + '_ {
        self.elements
            .iter()
            .filter_map(|element| element.bounds.and_then(Bounds::to_bbox))
    }
}

/// Trait for structured feature-tag query backends
#[async_trait]
pub trait SpatialQueryBackend: Send + Sync {
    /// Execute one query written in the backend's query language
    async fn query(
        &self,
        query: &str,
        correlation_id: &CorrelationId,
    ) -> GeocodingResult<OverpassResponse>;
}

/// HTTP client for an Overpass interpreter endpoint
#[derive(Debug, Clone)]
pub struct OverpassClient {
    http: reqwest::Client,
    url: String,
}

impl OverpassClient {
    /// Build a client from configuration
    ///
    /// The transport timeout leaves headroom over the server-side `[timeout:]`.
    ///
    /// # Errors
    /// Returns `GeocodingError::Transport` if the HTTP client cannot be built
    pub fn new(config: &EnrichmentConfig, user_agent: &str) -> GeocodingResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(user_agent.to_string())
            .timeout(Duration::from_secs(config.query_timeout_secs.saturating_add(5)))
            .build()?;

        Ok(Self {
            http,
            url: config.overpass_url.clone(),
        })
    }
}

#[async_trait]
impl SpatialQueryBackend for OverpassClient {
    #[tracing::instrument(skip(self, query, correlation_id), fields(correlation_id = %correlation_id))]
    async fn query(
        &self,
        query: &str,
        correlation_id: &CorrelationId,
    ) -> GeocodingResult<OverpassResponse> {
        let response = self
            .http
            .post(&self.url)
            .header(reqwest::header::CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(query.to_string())
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
        let parsed: OverpassResponse =
            serde_json::from_str(&body).map_err(|source| GeocodingError::Decode {
                backend: BACKEND,
                source,
            })?;

        tracing::debug!(elements = parsed.elements.len(), "Spatial query returned");
        Ok(parsed)
    }
}
