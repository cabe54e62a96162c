//! Common utilities shared across the romap crates

pub mod init;

pub use init::{initialize_environment, initialize_test_environment};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Correlation ID for tracking one search across every backend request it issues
///
/// Uses UUID v4 for uniqueness
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CorrelationId(Uuid);

impl CorrelationId {
    /// Generate a new correlation ID using UUID v4
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CorrelationId {
    fn from(id: &str) -> Self {
        Uuid::try_parse(id).map_or_else(|_| Self(Uuid::new_v4()), Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correlation_ids_are_unique() {
        assert_ne!(CorrelationId::new(), CorrelationId::new());
    }

    #[test]
    fn test_correlation_id_parses_valid_uuid() {
        let raw = "6f1d8e4a-2b7c-4d0e-9a3f-1c2b3d4e5f60";
        let id = CorrelationId::from(raw);
        assert_eq!(id.to_string(), raw);
    }

    #[test]
    fn test_correlation_id_replaces_garbage_with_fresh_uuid() {
        let id = CorrelationId::from("not-a-uuid");
        assert!(Uuid::try_parse(&id.to_string()).is_ok());
    }

    #[test]
    fn test_correlation_id_serializes_as_plain_string() {
        let id = CorrelationId::from("6f1d8e4a-2b7c-4d0e-9a3f-1c2b3d4e5f60");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"6f1d8e4a-2b7c-4d0e-9a3f-1c2b3d4e5f60\"");
    }
}
