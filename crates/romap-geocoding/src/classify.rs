//! Backend category/subtype to [`ResultType`] mapping

use crate::types::ResultType;

/// Backend category for the road network
const ROAD_CATEGORY: &str = "highway";
/// Backend category for named settlements
const PLACE_CATEGORY: &str = "place";

/// Map a backend `(subtype, category)` pair onto one of the five result kinds
///
/// Total over all inputs: unknown road subtypes are roads, unknown place
/// subtypes are cities, any other category is `Other`.
pub fn classify(subtype: &str, category: &str) -> ResultType {
    match category {
        ROAD_CATEGORY => match subtype {
            "motorway" | "trunk" => ResultType::Highway,
            "residential" | "living_street" => ResultType::Street,
            _ => ResultType::Road,
        },
        PLACE_CATEGORY => ResultType::City,
        _ => ResultType::Other,
    }
}
