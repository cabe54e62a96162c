//! Configuration validation framework

use crate::{ConfigError, ConfigResult};
use regex::Regex;

/// Get URL validation regex - returns None if regex compilation fails
fn get_url_regex() -> Option<&'static Regex> {
    static URL_REGEX: std::sync::OnceLock<Option<Regex>> = std::sync::OnceLock::new();
    URL_REGEX
        .get_or_init(|| Regex::new(r"^https?://[^\s/$.?#].[^\s]*$").ok())
        .as_ref()
}

/// Get ISO 3166-1 alpha-2 validation regex
fn get_country_code_regex() -> Option<&'static Regex> {
    static COUNTRY_REGEX: std::sync::OnceLock<Option<Regex>> = std::sync::OnceLock::new();
    COUNTRY_REGEX
        .get_or_init(|| Regex::new(r"^[a-z]{2}$").ok())
        .as_ref()
}

/// Trait for validating configuration values
pub trait Validate {
    /// Validate this configuration object
    ///
    /// # Errors
    /// Returns validation errors if the configuration is invalid
    fn validate(&self) -> ConfigResult<()>;
}

/// Validate a URL string
///
/// # Errors
/// Returns `ConfigError::InvalidUrl` if the URL format is invalid
pub fn validate_url(url: &str, field_name: &str) -> ConfigResult<()> {
    let valid = get_url_regex().map_or_else(
        || url.starts_with("http://") || url.starts_with("https://"),
        |regex| regex.is_match(url),
    );

    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidUrl {
            field: field_name.to_string(),
            url: url.to_string(),
        })
    }
}

/// Validate a value is within a range
///
/// # Errors
/// Returns `ConfigError::OutOfRange` if value is outside the specified range
pub fn validate_range(value: u64, min: u64, max: u64, field_name: &str) -> ConfigResult<()> {
    if value < min || value > max {
        Err(ConfigError::OutOfRange {
            field: field_name.to_string(),
            value,
            min,
            max,
        })
    } else {
        Ok(())
    }
}

/// Validate a string is not empty
///
/// # Errors
/// Returns `ConfigError::MissingField` if the string is empty or whitespace-only
pub fn validate_non_empty(value: &str, field_name: &str) -> ConfigResult<()> {
    if value.trim().is_empty() {
        Err(ConfigError::MissingField {
            field: field_name.to_string(),
        })
    } else {
        Ok(())
    }
}

/// Validate a lower-case two letter country code (`ro`, `md`, ...)
///
/// # Errors
/// Returns `ConfigError::InvalidCountryCode` if the code is not two ASCII lower-case letters
pub fn validate_country_code(value: &str, field_name: &str) -> ConfigResult<()> {
    let valid = get_country_code_regex().map_or_else(
        || value.len() == 2 && value.chars().all(|c| c.is_ascii_lowercase()),
        |regex| regex.is_match(value),
    );

    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidCountryCode {
            field: field_name.to_string(),
            value: value.to_string(),
        })
    }
}

/// Validate a floating point value is finite and strictly positive
///
/// # Errors
/// Returns `ConfigError::NotPositive` for zero, negative or non-finite values
pub fn validate_positive(value: f64, field_name: &str) -> ConfigResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive {
            field: field_name.to_string(),
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url_accepts_http_and_https() {
        assert!(validate_url("https://nominatim.openstreetmap.org", "url").is_ok());
        assert!(validate_url("http://127.0.0.1:8080/api", "url").is_ok());
    }

    #[test]
    fn test_validate_url_rejects_other_schemes() {
        let err = validate_url("ftp://example.org", "geocoder.base_url").unwrap_err();
        assert!(err.to_string().contains("geocoder.base_url"));
        assert!(validate_url("not a url", "url").is_err());
    }

    #[test]
    fn test_validate_range_bounds_are_inclusive() {
        assert!(validate_range(1, 1, 50, "limit").is_ok());
        assert!(validate_range(50, 1, 50, "limit").is_ok());
        assert!(validate_range(51, 1, 50, "limit").is_err());
        assert!(validate_range(0, 1, 50, "limit").is_err());
    }

    #[test]
    fn test_validate_country_code() {
        assert!(validate_country_code("ro", "country_code").is_ok());
        assert!(validate_country_code("RO", "country_code").is_err());
        assert!(validate_country_code("rou", "country_code").is_err());
    }

    #[test]
    fn test_validate_positive() {
        assert!(validate_positive(0.3, "threshold").is_ok());
        assert!(validate_positive(0.0, "threshold").is_err());
        assert!(validate_positive(-1.0, "threshold").is_err());
        assert!(validate_positive(f64::NAN, "threshold").is_err());
    }
}
