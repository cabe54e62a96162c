//! Configuration error types

use thiserror::Error;

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid URL for {field}: {url}")]
    InvalidUrl { field: String, url: String },

    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Value {value} is out of range for {field} (expected {min}-{max})")]
    OutOfRange {
        field: String,
        value: u64,
        min: u64,
        max: u64,
    },

    #[error("{field} must be a lower-case ISO 3166-1 alpha-2 code, got '{value}'")]
    InvalidCountryCode { field: String, value: String },

    #[error("{field} must be a positive number, got {value}")]
    NotPositive { field: String, value: f64 },

    /// Country rectangle with inverted or empty sides
    #[error("Country bounds must satisfy west < east and south < north, got [{west}, {south}, {east}, {north}]")]
    InvalidBounds {
        west: f64,
        south: f64,
        east: f64,
        north: f64,
    },

    /// Another country selected while the bounds still describe Romania
    #[error("enrichment.country_bounds must be set when geocoder.country_code is '{country_code}'")]
    CountryBoundsNotSet { country_code: String },

    #[error("Invalid tracing level: {level}")]
    InvalidTracingLevel { level: String },

    /// More results requested than the backend page holds
    #[error("geocoder.max_results ({max_results}) must not exceed geocoder.candidate_limit ({candidate_limit})")]
    ResultLimitExceedsPage {
        max_results: usize,
        candidate_limit: usize,
    },

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;
