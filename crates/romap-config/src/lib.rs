//! Centralized configuration management for romap
//!
//! Provides type-safe, validated configuration for the geocoding pipeline,
//! the enrichment backends, the routing client and telemetry.
//!
//! Configuration follows a simple hierarchy:
//! 1. Safe defaults (defined as constants)
//! 2. Optional TOML file
//! 3. Environment variable overrides (`ROMAP_*`)
//! 4. Runtime validation

pub mod error;
pub mod source;
pub mod validation;

pub use error::{ConfigError, ConfigResult};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

// =============================================================================
// SAFE DEFAULTS
// =============================================================================

// Geocoding backend (Nominatim)
const DEFAULT_GEOCODER_BASE_URL: &str = "https://nominatim.openstreetmap.org";
const DEFAULT_COUNTRY_CODE: &str = "ro";
const DEFAULT_COUNTRY_NAME: &str = "Romania";
const DEFAULT_USER_AGENT: &str = "RO-InfraMap/1.0";
const DEFAULT_ACCEPT_LANGUAGE: &str = "ro,en";
const DEFAULT_CANDIDATE_LIMIT: usize = 50; // Backend page size
const DEFAULT_MAX_RESULTS: usize = 15; // Returned to the caller
const DEFAULT_MIN_QUERY_CHARS: usize = 2;
const DEFAULT_GEOCODER_TIMEOUT_SECONDS: u64 = 20;

// Extent enrichment (Overpass)
const DEFAULT_ENRICHMENT_ENABLED: bool = true;
const DEFAULT_OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";
const DEFAULT_SMALL_EXTENT_THRESHOLD_DEG: f64 = 0.3; // ~30 km
const DEFAULT_ENRICHMENT_TIMEOUT_SECONDS: u64 = 25;
const DEFAULT_ENRICHMENT_CACHE_CAPACITY: usize = 128;
const DEFAULT_NAME_SEARCH_FALLBACK: bool = false;

// Romania, tight enough to exclude most of Serbia/Bulgaria
const DEFAULT_COUNTRY_WEST: f64 = 20.2;
const DEFAULT_COUNTRY_SOUTH: f64 = 43.6;
const DEFAULT_COUNTRY_EAST: f64 = 30.0;
const DEFAULT_COUNTRY_NORTH: f64 = 48.3;

// Routing (OSRM)
const DEFAULT_ROUTING_BASE_URL: &str = "https://router.project-osrm.org";
const DEFAULT_ROUTING_PROFILE: &str = "driving";
const DEFAULT_ROUTING_TIMEOUT_SECONDS: u64 = 20;

// Telemetry
const DEFAULT_TRACING_LEVEL: &str = "info";
const DEFAULT_JSON_LOGS: bool = false;
const DEFAULT_SERVICE_NAME: &str = "romap";

/// Read and parse an environment variable, ignoring unset or malformed values
fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.parse().ok())
}

/// Core configuration for the entire romap application
///
/// All settings have safe defaults and can be overridden via a TOML file or
/// environment variables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationConfig {
    /// Primary geocoding backend configuration
    pub geocoder: GeocoderConfig,

    /// Extent enrichment configuration
    pub enrichment: EnrichmentConfig,

    /// Route geometry backend configuration
    pub routing: RoutingConfig,

    /// Logging configuration
    pub telemetry: TelemetryConfig,
}

/// Geocoding backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocoderConfig {
    /// Base URL of the Nominatim-compatible service
    pub base_url: String,

    /// ISO 3166-1 alpha-2 code every search is restricted to
    pub country_code: String,

    /// Human-readable country name appended to road queries
    pub country_name: String,

    /// `User-Agent` header (Nominatim's usage policy requires one)
    pub user_agent: String,

    /// `Accept-Language` header
    pub accept_language: String,

    /// Number of candidates requested from the backend
    pub candidate_limit: usize,

    /// Maximum number of results handed back to the caller
    pub max_results: usize,

    /// Queries shorter than this (after trimming) return no results
    pub min_query_chars: usize,

    /// Request timeout enforced by the HTTP transport
    pub timeout_secs: u64,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GEOCODER_BASE_URL.to_string(),
            country_code: DEFAULT_COUNTRY_CODE.to_string(),
            country_name: DEFAULT_COUNTRY_NAME.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_language: DEFAULT_ACCEPT_LANGUAGE.to_string(),
            candidate_limit: DEFAULT_CANDIDATE_LIMIT,
            max_results: DEFAULT_MAX_RESULTS,
            min_query_chars: DEFAULT_MIN_QUERY_CHARS,
            timeout_secs: DEFAULT_GEOCODER_TIMEOUT_SECONDS,
        }
    }
}

impl GeocoderConfig {
    /// Load configuration from environment variables with safe defaults
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("ROMAP_GEOCODER_URL") {
            self.base_url = url;
        }
        if let Ok(code) = std::env::var("ROMAP_COUNTRY_CODE") {
            self.country_code = code.to_lowercase();
        }
        if let Ok(name) = std::env::var("ROMAP_COUNTRY_NAME") {
            self.country_name = name;
        }
        if let Ok(agent) = std::env::var("ROMAP_USER_AGENT") {
            self.user_agent = agent;
        }
        if let Ok(lang) = std::env::var("ROMAP_ACCEPT_LANGUAGE") {
            self.accept_language = lang;
        }
        if let Some(limit) = env_parse("ROMAP_GEOCODER_CANDIDATE_LIMIT") {
            self.candidate_limit = limit;
        }
        if let Some(max) = env_parse("ROMAP_MAX_RESULTS") {
            self.max_results = max;
        }
        if let Some(min) = env_parse("ROMAP_MIN_QUERY_CHARS") {
            self.min_query_chars = min;
        }
        if let Some(timeout) = env_parse("ROMAP_GEOCODER_TIMEOUT_SECONDS") {
            self.timeout_secs = timeout;
        }
    }
}

impl validation::Validate for GeocoderConfig {
    fn validate(&self) -> ConfigResult<()> {
        validation::validate_url(&self.base_url, "geocoder.base_url")?;
        validation::validate_country_code(&self.country_code, "geocoder.country_code")?;
        validation::validate_non_empty(&self.country_name, "geocoder.country_name")?;
        validation::validate_non_empty(&self.user_agent, "geocoder.user_agent")?;
        // Nominatim caps `limit` at 50
        validation::validate_range(
            self.candidate_limit as u64,
            1,
            50,
            "geocoder.candidate_limit",
        )?;
        validation::validate_range(self.max_results as u64, 1, 50, "geocoder.max_results")?;
        validation::validate_range(
            self.min_query_chars as u64,
            1,
            32,
            "geocoder.min_query_chars",
        )?;
        validation::validate_range(self.timeout_secs, 1, 300, "geocoder.timeout_secs")?;
        Ok(())
    }
}

/// Axis-aligned country rectangle in WGS84 degrees
///
/// Must cover the country named by `geocoder.country_code`: enrichment drops
/// every candidate centered outside it. The default is Romania, so a config
/// that selects another country must set its own bounds (`ROMAP_COUNTRY_BOUNDS`
/// takes `west,south,east,north`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CountryBounds {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl FromStr for CountryBounds {
    type Err = String;

    /// Parse `west,south,east,north`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = s
            .split(',')
            .map(|part| part.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| format!("invalid country bounds '{s}': {e}"))?;
        let [west, south, east, north] = *values.as_slice() else {
            return Err(format!("expected west,south,east,north, got '{s}'"));
        };
        Ok(Self {
            west,
            south,
            east,
            north,
        })
    }
}

impl Default for CountryBounds {
    fn default() -> Self {
        Self {
            west: DEFAULT_COUNTRY_WEST,
            south: DEFAULT_COUNTRY_SOUTH,
            east: DEFAULT_COUNTRY_EAST,
            north: DEFAULT_COUNTRY_NORTH,
        }
    }
}

/// Extent enrichment configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichmentConfig {
    /// Master switch for supplementary extent queries
    pub enabled: bool,

    /// Overpass interpreter endpoint
    pub overpass_url: String,

    /// Boxes narrower or shorter than this (degrees) are treated as inadequate
    pub small_extent_threshold_deg: f64,

    /// Server-side query timeout, also used for the HTTP transport
    pub query_timeout_secs: u64,

    /// Number of road codes kept in the in-memory extent cache (0 disables it)
    pub cache_capacity: usize,

    /// Re-query the geocoder by name when both spatial strategies come back empty
    pub name_search_fallback: bool,

    /// Enrichment candidates must have their center inside this rectangle
    pub country_bounds: CountryBounds,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            enabled: DEFAULT_ENRICHMENT_ENABLED,
            overpass_url: DEFAULT_OVERPASS_URL.to_string(),
            small_extent_threshold_deg: DEFAULT_SMALL_EXTENT_THRESHOLD_DEG,
            query_timeout_secs: DEFAULT_ENRICHMENT_TIMEOUT_SECONDS,
            cache_capacity: DEFAULT_ENRICHMENT_CACHE_CAPACITY,
            name_search_fallback: DEFAULT_NAME_SEARCH_FALLBACK,
            country_bounds: CountryBounds::default(),
        }
    }
}

impl EnrichmentConfig {
    /// Load configuration from environment variables with safe defaults
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }

    fn apply_env_overrides(&mut self) {
        if let Some(enabled) = env_parse("ROMAP_ENRICHMENT_ENABLED") {
            self.enabled = enabled;
        }
        if let Ok(url) = std::env::var("ROMAP_OVERPASS_URL") {
            self.overpass_url = url;
        }
        if let Some(threshold) = env_parse("ROMAP_SMALL_EXTENT_THRESHOLD_DEG") {
            self.small_extent_threshold_deg = threshold;
        }
        if let Some(timeout) = env_parse("ROMAP_ENRICHMENT_TIMEOUT_SECONDS") {
            self.query_timeout_secs = timeout;
        }
        if let Some(capacity) = env_parse("ROMAP_ENRICHMENT_CACHE_CAPACITY") {
            self.cache_capacity = capacity;
        }
        if let Some(fallback) = env_parse("ROMAP_NAME_SEARCH_FALLBACK") {
            self.name_search_fallback = fallback;
        }
        if let Some(bounds) = env_parse("ROMAP_COUNTRY_BOUNDS") {
            self.country_bounds = bounds;
        }
    }
}

impl validation::Validate for EnrichmentConfig {
    fn validate(&self) -> ConfigResult<()> {
        validation::validate_url(&self.overpass_url, "enrichment.overpass_url")?;
        validation::validate_positive(
            self.small_extent_threshold_deg,
            "enrichment.small_extent_threshold_deg",
        )?;
        validation::validate_range(
            self.query_timeout_secs,
            1,
            180,
            "enrichment.query_timeout_secs",
        )?;

        let bounds = &self.country_bounds;
        if !(bounds.west < bounds.east && bounds.south < bounds.north) {
            return Err(ConfigError::InvalidBounds {
                west: bounds.west,
                south: bounds.south,
                east: bounds.east,
                north: bounds.north,
            });
        }
        Ok(())
    }
}

/// Route geometry backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Base URL of the OSRM-compatible service
    pub base_url: String,

    /// Routing profile segment of the request path
    pub profile: String,

    /// Request timeout enforced by the HTTP transport
    pub timeout_secs: u64,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_ROUTING_BASE_URL.to_string(),
            profile: DEFAULT_ROUTING_PROFILE.to_string(),
            timeout_secs: DEFAULT_ROUTING_TIMEOUT_SECONDS,
        }
    }
}

impl RoutingConfig {
    /// Load configuration from environment variables with safe defaults
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("ROMAP_ROUTING_URL") {
            self.base_url = url;
        }
        if let Ok(profile) = std::env::var("ROMAP_ROUTING_PROFILE") {
            self.profile = profile;
        }
        if let Some(timeout) = env_parse("ROMAP_ROUTING_TIMEOUT_SECONDS") {
            self.timeout_secs = timeout;
        }
    }
}

impl validation::Validate for RoutingConfig {
    fn validate(&self) -> ConfigResult<()> {
        validation::validate_url(&self.base_url, "routing.base_url")?;
        validation::validate_non_empty(&self.profile, "routing.profile")?;
        validation::validate_range(self.timeout_secs, 1, 300, "routing.timeout_secs")?;
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Tracing level (trace, debug, info, warn, error)
    pub tracing_level: String,

    /// Emit JSON lines instead of human-readable text
    pub json_logs: bool,

    /// Optional directory for a daily-rolling log file
    pub log_dir: Option<PathBuf>,

    /// Service name attached to log output
    pub service_name: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            tracing_level: DEFAULT_TRACING_LEVEL.to_string(),
            json_logs: DEFAULT_JSON_LOGS,
            log_dir: None,
            service_name: DEFAULT_SERVICE_NAME.to_string(),
        }
    }
}

impl TelemetryConfig {
    /// Load configuration from environment variables with safe defaults
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(level) = std::env::var("ROMAP_TRACING_LEVEL") {
            self.tracing_level = level;
        }
        if let Some(json) = env_parse("ROMAP_JSON_LOGS") {
            self.json_logs = json;
        }
        if let Ok(dir) = std::env::var("ROMAP_LOG_DIR") {
            self.log_dir = Some(PathBuf::from(dir));
        }
        if let Ok(name) = std::env::var("ROMAP_SERVICE_NAME") {
            self.service_name = name;
        }
    }
}

impl validation::Validate for TelemetryConfig {
    fn validate(&self) -> ConfigResult<()> {
        validation::validate_non_empty(&self.service_name, "telemetry.service_name")?;

        match self.tracing_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
            _ => Err(ConfigError::InvalidTracingLevel {
                level: self.tracing_level.clone(),
            }),
        }
    }
}

impl ApplicationConfig {
    /// Load configuration from environment variables with safe defaults
    pub fn from_env() -> Self {
        Self {
            geocoder: GeocoderConfig::from_env(),
            enrichment: EnrichmentConfig::from_env(),
            routing: RoutingConfig::from_env(),
            telemetry: TelemetryConfig::from_env(),
        }
    }

    /// Apply `ROMAP_*` environment overrides on top of the current values
    pub fn apply_env_overrides(&mut self) {
        self.geocoder.apply_env_overrides();
        self.enrichment.apply_env_overrides();
        self.routing.apply_env_overrides();
        self.telemetry.apply_env_overrides();
    }
}

impl validation::Validate for ApplicationConfig {
    fn validate(&self) -> ConfigResult<()> {
        self.geocoder.validate()?;
        self.enrichment.validate()?;
        self.routing.validate()?;
        self.telemetry.validate()?;

        if self.geocoder.country_code != DEFAULT_COUNTRY_CODE
            && self.enrichment.country_bounds == CountryBounds::default()
        {
            return Err(ConfigError::CountryBoundsNotSet {
                country_code: self.geocoder.country_code.clone(),
            });
        }

        if self.geocoder.max_results > self.geocoder.candidate_limit {
            return Err(ConfigError::ResultLimitExceedsPage {
                max_results: self.geocoder.max_results,
                candidate_limit: self.geocoder.candidate_limit,
            });
        }
        Ok(())
    }
}
