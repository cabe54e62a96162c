use romap_common::CorrelationId;
use thiserror::Error;

/// Geocoding pipeline error types with correlation ID support
#[derive(Error, Debug)]
pub enum GeocodingError {
    #[error("{backend} request failed with status {status} (correlation: {correlation_id})")]
    RequestFailed {
        backend: &'static str,
        status: u16,
        correlation_id: CorrelationId,
    },

    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Malformed {backend} response: {source}")]
    Decode {
        backend: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Result type for geocoding operations
pub type GeocodingResult<T> = std::result::Result<T, GeocodingError>;
