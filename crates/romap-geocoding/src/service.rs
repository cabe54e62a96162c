//! Search service: the full query-to-results pipeline

use crate::enrich::ExtentEnricher;
use crate::error::GeocodingResult;
use crate::merge::merge_linear_features;
use crate::nominatim::{GeocodeRequest, GeocodingBackend, NominatimClient, RawPlace, ingest};
use crate::overpass::OverpassClient;
use crate::query::qualify_query;
use crate::types::{CandidateRecord, SearchResult};
use async_trait::async_trait;
use romap_common::CorrelationId;
use romap_config::{ApplicationConfig, GeocoderConfig};
use std::sync::Arc;

/// Trait for free-text place search with correlation ID support
#[async_trait]
pub trait SearchService: Send + Sync {
    /// Search for places and linear features matching the query
    ///
    /// Empty or too-short queries yield an empty list without any network
    /// call. Only a failure of the primary geocoding request is returned as
    /// an error; enrichment problems degrade to the best extent found.
    async fn search(
        &self,
        query: &str,
        correlation_id: &CorrelationId,
    ) -> GeocodingResult<Vec<SearchResult>>;
}

/// Geocode, classify, merge, truncate, then enrich
pub struct GeocodeService {
    geocoder: Arc<dyn GeocodingBackend>,
    enricher: Option<ExtentEnricher>,
    country_name: String,
    candidate_limit: usize,
    max_results: usize,
    min_query_chars: usize,
}

impl GeocodeService {
    /// Create a service over explicit backends
    pub fn new(
        geocoder: Arc<dyn GeocodingBackend>,
        enricher: Option<ExtentEnricher>,
        config: &GeocoderConfig,
    ) -> Self {
        Self {
            geocoder,
            enricher,
            country_name: config.country_name.clone(),
            candidate_limit: config.candidate_limit,
            max_results: config.max_results,
            min_query_chars: config.min_query_chars,
        }
    }

    /// Wire HTTP backends from configuration
    ///
    /// # Errors
    /// Returns `GeocodingError::Transport` if an HTTP client cannot be built
    pub fn from_config(config: &ApplicationConfig) -> GeocodingResult<Self> {
        let geocoder: Arc<dyn GeocodingBackend> =
            Arc::new(NominatimClient::new(&config.geocoder)?);

        let enricher = if config.enrichment.enabled {
            let spatial = OverpassClient::new(&config.enrichment, &config.geocoder.user_agent)?;
            let enricher =
                ExtentEnricher::new(Arc::new(spatial), &config.enrichment, &config.geocoder);
            Some(if config.enrichment.name_search_fallback {
                enricher.with_name_search(Arc::clone(&geocoder))
            } else {
                enricher
            })
        } else {
            tracing::info!("Extent enrichment disabled");
            None
        };

        Ok(Self::new(geocoder, enricher, &config.geocoder))
    }

    /// Classified, merged and truncated records, before enrichment
    fn prepare(&self, places: Vec<RawPlace>) -> Vec<CandidateRecord> {
        let mut records = merge_linear_features(ingest(places));
        records.truncate(self.max_results);
        records
    }
}

#[async_trait]
impl SearchService for GeocodeService {
    #[tracing::instrument(skip(self, correlation_id), fields(correlation_id = %correlation_id))]
    async fn search(
        &self,
        query: &str,
        correlation_id: &CorrelationId,
    ) -> GeocodingResult<Vec<SearchResult>> {
        let trimmed = query.trim();
        if trimmed.chars().count() < self.min_query_chars.max(1) {
            tracing::debug!("Query too short, skipping search");
            return Ok(Vec::new());
        }

        metrics::counter!("geocode_requests_total").increment(1);

        let request = GeocodeRequest {
            query: qualify_query(trimmed, &self.country_name),
            limit: self.candidate_limit,
            dedupe: false,
        };

        let places = match self.geocoder.search(&request, correlation_id).await {
            Ok(places) => places,
            Err(e) => {
                metrics::counter!("geocode_failures_total").increment(1);
                tracing::error!(error = %e, "Primary geocoding request failed");
                return Err(e);
            }
        };

        let mut records = self.prepare(places);

        if let Some(enricher) = &self.enricher {
            enricher.enrich(&mut records, correlation_id).await;
        }

        tracing::info!(results = records.len(), "Search completed");
        Ok(records.into_iter().map(CandidateRecord::into_result).collect())
    }
}
