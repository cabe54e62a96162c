//! Extent enrichment for linear features
//!
//! A merged highway record often still carries the extent of a few
//! segments only. For every highway/road record whose box is absent or
//! narrower than the small-extent threshold, the enricher asks a
//! supplementary backend for every feature tagged with the record's road
//! code and replaces the box with the union of what comes back.
//!
//! Strategies are tried in order and the first one producing a
//! non-degenerate extent wins. Failures are logged and swallowed; a record
//! that cannot be enriched keeps the box it had.

use crate::error::GeocodingResult;
use crate::nominatim::{GeocodeRequest, GeocodingBackend, ingest};
use crate::overpass::SpatialQueryBackend;
use crate::query::{extract_road_code, split_road_code};
use crate::types::{BoundingBox, CandidateRecord};
use futures::stream::{FuturesUnordered, StreamExt};
use lru::LruCache;
use romap_common::CorrelationId;
use romap_config::{EnrichmentConfig, GeocoderConfig};
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

/// One way of asking for the full extent of a road code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrichmentStrategy {
    /// Exact `ref` match on highway ways and road route relations inside
    /// the country's administrative area
    ReferenceInCountryArea,
    /// Case-insensitive `ref` match (tolerating "DN 7" and "DN7;E60")
    /// on any element inside the country's bounding rectangle
    RelaxedReferenceInBounds,
    /// Re-query the geocoding backend by name
    NameSearch,
}

impl EnrichmentStrategy {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ReferenceInCountryArea => "reference_in_country_area",
            Self::RelaxedReferenceInBounds => "relaxed_reference_in_bounds",
            Self::NameSearch => "name_search",
        }
    }
}

impl std::fmt::Display for EnrichmentStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Replaces inadequate linear-feature extents with wider ones
pub struct ExtentEnricher {
    spatial: Arc<dyn SpatialQueryBackend>,
    name_search: Option<Arc<dyn GeocodingBackend>>,
    strategies: Vec<EnrichmentStrategy>,
    threshold_deg: f64,
    country_bounds: BoundingBox,
    country_code: String,
    country_name: String,
    candidate_limit: usize,
    query_timeout_secs: u64,
    cache: Option<Mutex<LruCache<String, BoundingBox>>>,
}

impl ExtentEnricher {
    /// Build an enricher running the two spatial strategies
    pub fn new(
        spatial: Arc<dyn SpatialQueryBackend>,
        config: &EnrichmentConfig,
        geocoder: &GeocoderConfig,
    ) -> Self {
        let bounds = config.country_bounds;
        let country_bounds = BoundingBox::new(bounds.west, bounds.south, bounds.east, bounds.north)
            .unwrap_or(BoundingBox::WORLD);

        Self {
            spatial,
            name_search: None,
            strategies: vec![
                EnrichmentStrategy::ReferenceInCountryArea,
                EnrichmentStrategy::RelaxedReferenceInBounds,
            ],
            threshold_deg: config.small_extent_threshold_deg,
            country_bounds,
            country_code: geocoder.country_code.clone(),
            country_name: geocoder.country_name.clone(),
            candidate_limit: geocoder.candidate_limit,
            query_timeout_secs: config.query_timeout_secs,
            cache: NonZeroUsize::new(config.cache_capacity)
                .map(|capacity| Mutex::new(LruCache::new(capacity))),
        }
    }

    /// Append the name-search strategy, run after the spatial ones
    #[must_use]
    pub fn with_name_search(mut self, geocoder: Arc<dyn GeocodingBackend>) -> Self {
        self.name_search = Some(geocoder);
        if !self.strategies.contains(&EnrichmentStrategy::NameSearch) {
            self.strategies.push(EnrichmentStrategy::NameSearch);
        }
        self
    }

    pub fn strategies(&self) -> &[EnrichmentStrategy] {
        &self.strategies
    }

    /// An extent is inadequate when absent or narrower than the threshold
    /// in either dimension
    pub fn needs_enrichment(&self, bbox: Option<&BoundingBox>) -> bool {
        bbox.is_none_or(|b| b.width() < self.threshold_deg || b.height() < self.threshold_deg)
    }

    /// Enrich every inadequate highway/road record in place
    ///
    /// Records are processed concurrently; results are written back by
    /// position so the input order is kept. Records without a recognizable
    /// road code are left alone.
    #[tracing::instrument(skip(self, records, correlation_id), fields(correlation_id = %correlation_id))]
    pub async fn enrich(&self, records: &mut [CandidateRecord], correlation_id: &CorrelationId) {
        let mut tasks: FuturesUnordered<_> = records
            .iter()
            .enumerate()
            .filter(|(_, record)| {
                record.result_type.is_linear() && self.needs_enrichment(record.bbox.as_ref())
            })
            .filter_map(|(idx, record)| {
                let code = extract_road_code(&record.name);
                if code.is_none() {
                    tracing::debug!(name = %record.name, "No road code in name, skipping enrichment");
                }
                code.map(|code| (idx, code, record.name.clone()))
            })
            .map(|(idx, code, name)| async move {
                let extent = self.find_extent(&code, &name, correlation_id).await;
                (idx, extent)
            })
            .collect();

        while let Some((idx, extent)) = tasks.next().await {
            if let (Some(extent), Some(record)) = (extent, records.get_mut(idx)) {
                tracing::debug!(
                    name = %record.name,
                    width = extent.width(),
                    height = extent.height(),
                    "Replacing extent"
                );
                record.bbox = Some(extent);
            }
        }
    }

    /// Resolve the full extent of one road code, trying strategies in order
    async fn find_extent(
        &self,
        code: &str,
        name: &str,
        correlation_id: &CorrelationId,
    ) -> Option<BoundingBox> {
        if let Some(cached) = self.cached(code) {
            metrics::counter!("enrichment_cache_hits_total").increment(1);
            return Some(cached);
        }

        for &strategy in &self.strategies {
            metrics::counter!("enrichment_queries_total", "strategy" => strategy.as_str())
                .increment(1);

            match self.run_strategy(strategy, code, name, correlation_id).await {
                Ok(boxes) => {
                    if let Some(extent) = self.accept(&boxes) {
                        metrics::counter!("enrichment_hits_total", "strategy" => strategy.as_str())
                            .increment(1);
                        self.remember(code, extent);
                        return Some(extent);
                    }
                    tracing::debug!(
                        %code,
                        %strategy,
                        candidates = boxes.len(),
                        "Strategy produced no usable extent"
                    );
                }
                Err(e) => {
                    tracing::warn!(%code, %strategy, error = %e, "Enrichment query failed");
                }
            }
        }

        None
    }

    async fn run_strategy(
        &self,
        strategy: EnrichmentStrategy,
        code: &str,
        name: &str,
        correlation_id: &CorrelationId,
    ) -> GeocodingResult<Vec<BoundingBox>> {
        match strategy {
            EnrichmentStrategy::ReferenceInCountryArea => {
                let query = self.country_area_query(code);
                let response = self.spatial.query(&query, correlation_id).await?;
                Ok(response.boxes().collect())
            }
            EnrichmentStrategy::RelaxedReferenceInBounds => {
                let query = self.relaxed_bounds_query(code);
                let response = self.spatial.query(&query, correlation_id).await?;
                Ok(response.boxes().collect())
            }
            EnrichmentStrategy::NameSearch => {
                let Some(geocoder) = &self.name_search else {
                    return Ok(Vec::new());
                };
                let request = GeocodeRequest {
                    query: format!("{name}, {}", self.country_name),
                    limit: self.candidate_limit,
                    dedupe: false,
                };
                let places = geocoder.search(&request, correlation_id).await?;
                Ok(ingest(places)
                    .into_iter()
                    .filter(|record| {
                        record.result_type.is_linear()
                            && extract_road_code(&record.name).as_deref() == Some(code)
                    })
                    .filter_map(|record| record.bbox)
                    .collect())
            }
        }
    }

    /// Union of the candidate boxes centered inside the country, if it has area
    fn accept(&self, boxes: &[BoundingBox]) -> Option<BoundingBox> {
        let inside: Vec<BoundingBox> = boxes
            .iter()
            .filter(|bbox| {
                let (lng, lat) = bbox.center();
                self.country_bounds.strictly_contains(lng, lat)
            })
            .copied()
            .collect();

        BoundingBox::union_all(&inside).filter(BoundingBox::has_positive_area)
    }

    fn cached(&self, code: &str) -> Option<BoundingBox> {
        let cache = self.cache.as_ref()?;
        let Ok(mut guard) = cache.lock() else {
            return None;
        };
        guard.get(code).copied()
    }

    fn remember(&self, code: &str, extent: BoundingBox) {
        let Some(cache) = &self.cache else {
            return;
        };
        if let Ok(mut guard) = cache.lock() {
            guard.put(code.to_string(), extent);
        }
    }

    fn country_area_query(&self, code: &str) -> String {
        let iso = self.country_code.to_uppercase();
        format!(
            "[out:json][timeout:{timeout}];\n\
             area[\"ISO3166-1\"=\"{iso}\"][admin_level=2]->.country;\n\
             (\n  \
               way[\"highway\"][\"ref\"=\"{code}\"](area.country);\n  \
               relation[\"route\"=\"road\"][\"ref\"=\"{code}\"](area.country);\n\
             );\n\
             out tags bb;",
            timeout = self.query_timeout_secs,
        )
    }

    fn relaxed_bounds_query(&self, code: &str) -> String {
        let (prefix, number) = split_road_code(code);
        let b = &self.country_bounds;
        format!(
            "[out:json][timeout:{timeout}];\n\
             nwr[\"ref\"~\"(^|;) *{prefix} ?{number} *(;|$)\",i]({south},{west},{north},{east});\n\
             out tags bb;",
            timeout = self.query_timeout_secs,
            south = b.south(),
            west = b.west(),
            north = b.north(),
            east = b.east(),
        )
    }
}
