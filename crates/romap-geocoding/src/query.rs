//! Query and road-name heuristics

use regex::Regex;
use std::sync::OnceLock;

/// Queries that look like a Romanian road reference
fn road_query_regex() -> Option<&'static Regex> {
    static ROAD_QUERY: OnceLock<Option<Regex>> = OnceLock::new();
    ROAD_QUERY
        .get_or_init(|| {
            Regex::new(r"(?i)^(?:a\d+|dn\d+|dj\d+|dc\d+|autostrada|drum(?:ul)?\s+na[tțţ]ional)").ok()
        })
        .as_ref()
}

/// Short road codes inside a feature name: "Autostrada A1", "DN 7", "DJ107A"
fn road_code_regex() -> Option<&'static Regex> {
    static ROAD_CODE: OnceLock<Option<Regex>> = OnceLock::new();
    ROAD_CODE
        .get_or_init(|| {
            Regex::new(r"(?i)\b(?:(A)(\d{1,2})|(DN|DJ|DC)\s?(\d{1,3}[A-Z]?))\b").ok()
        })
        .as_ref()
}

/// Spelled-out national/county road names: "Drumul Național 7"
fn spelled_road_regex() -> Option<&'static Regex> {
    static SPELLED: OnceLock<Option<Regex>> = OnceLock::new();
    SPELLED
        .get_or_init(|| {
            Regex::new(r"(?i)\bdrum(?:ul)?\s+(na[tțţ]ional|jude[tțţ]ean)\s+(\d{1,3}[A-Z]?)\b").ok()
        })
        .as_ref()
}

/// True when the trimmed query starts like a road reference
pub fn is_road_query(query: &str) -> bool {
    road_query_regex().is_some_and(|regex| regex.is_match(query.trim()))
}

/// Append the country qualifier to road queries, leave anything else untouched
pub fn qualify_query(query: &str, country_name: &str) -> String {
    let trimmed = query.trim();
    if is_road_query(trimmed) {
        format!("{trimmed}, {country_name}")
    } else {
        trimmed.to_string()
    }
}

/// Extract a normalized road code ("A1", "DN7", "DJ107A") from a feature name
///
/// Returns `None` when the name doesn't carry a recognizable code; callers
/// skip enrichment in that case rather than guess.
pub fn extract_road_code(name: &str) -> Option<String> {
    if let Some(caps) = road_code_regex().and_then(|regex| regex.captures(name)) {
        let (prefix, number) = match (caps.get(1), caps.get(2), caps.get(3), caps.get(4)) {
            (Some(prefix), Some(number), _, _) | (_, _, Some(prefix), Some(number)) => {
                (prefix.as_str(), number.as_str())
            }
            _ => return None,
        };
        return Some(format!("{prefix}{number}").to_uppercase());
    }

    let caps = spelled_road_regex()?.captures(name)?;
    let kind = caps.get(1)?.as_str().to_lowercase();
    let prefix = if kind.starts_with("na") { "DN" } else { "DJ" };
    Some(format!("{prefix}{}", caps.get(2)?.as_str().to_uppercase()))
}

/// Split a normalized code into its letter prefix and numeric part
pub fn split_road_code(code: &str) -> (&str, &str) {
    let split = code
        .find(|c: char| c.is_ascii_digit())
        .unwrap_or(code.len());
    code.split_at(split)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_road_queries_are_detected() {
        assert!(is_road_query("A1"));
        assert!(is_road_query("a3 bucuresti"));
        assert!(is_road_query("DN7"));
        assert!(is_road_query("dj107"));
        assert!(is_road_query("DC12"));
        assert!(is_road_query("Autostrada Soarelui"));
        assert!(is_road_query("drum național 1"));
        assert!(is_road_query("Drumul National 7"));
        assert!(is_road_query("  A2  "));
    }

    #[test]
    fn test_place_queries_are_not_road_queries() {
        assert!(!is_road_query("Alba Iulia"));
        assert!(!is_road_query("Brasov"));
        assert!(!is_road_query("Strada A1"));
        assert!(!is_road_query(""));
    }

    #[test]
    fn test_qualify_query_appends_country_for_roads() {
        assert_eq!(qualify_query("A1", "Romania"), "A1, Romania");
        assert_eq!(qualify_query(" DN7 ", "Romania"), "DN7, Romania");
        assert_eq!(qualify_query("Sibiu", "Romania"), "Sibiu");
    }

    #[test]
    fn test_extract_road_code_from_names() {
        assert_eq!(extract_road_code("Autostrada A1").as_deref(), Some("A1"));
        assert_eq!(extract_road_code("Autostrada Soarelui (A2)").as_deref(), Some("A2"));
        assert_eq!(extract_road_code("DN7").as_deref(), Some("DN7"));
        assert_eq!(extract_road_code("DN 1A").as_deref(), Some("DN1A"));
        assert_eq!(extract_road_code("dj107").as_deref(), Some("DJ107"));
        assert_eq!(extract_road_code("Drumul Național 7").as_deref(), Some("DN7"));
        assert_eq!(extract_road_code("Drumul Județean 106").as_deref(), Some("DJ106"));
    }

    #[test]
    fn test_extract_road_code_skips_unrecognized_names() {
        assert_eq!(extract_road_code("Calea Victoriei"), None);
        assert_eq!(extract_road_code("Autostrada Transilvania"), None);
        assert_eq!(extract_road_code("Aleea 5"), None);
    }

    #[test]
    fn test_split_road_code() {
        assert_eq!(split_road_code("DN7"), ("DN", "7"));
        assert_eq!(split_road_code("A1"), ("A", "1"));
        assert_eq!(split_road_code("DJ107A"), ("DJ", "107A"));
    }
}
