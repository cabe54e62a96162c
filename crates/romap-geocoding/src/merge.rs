//! Name-based merging of linear features
//!
//! The geocoding backend reports a long highway as many disjoint segment
//! records. Records of the same type family (`highway`/`road`) sharing a
//! case-insensitive name collapse into the first-seen record, whose box
//! becomes the union of the whole group.

use crate::types::{BoundingBox, CandidateRecord};
use std::collections::HashMap;

/// Collapse same-named highway/road records, preserving first-seen order
///
/// Non-linear records pass through untouched, in their original positions
/// relative to the surviving linear records. Running this on its own output
/// is a no-op.
pub fn merge_linear_features(records: Vec<CandidateRecord>) -> Vec<CandidateRecord> {
    let mut merged: Vec<CandidateRecord> = Vec::with_capacity(records.len());
    let mut group_index: HashMap<String, usize> = HashMap::new();

    for record in records {
        if !record.result_type.is_linear() {
            merged.push(record);
            continue;
        }

        let key = record.name.to_lowercase();
        if let Some(first) = group_index.get(&key).and_then(|&idx| merged.get_mut(idx)) {
            first.accumulated_boxes.extend(record.accumulated_boxes);
        } else {
            group_index.insert(key, merged.len());
            merged.push(record);
        }
    }

    for record in merged.iter_mut().filter(|r| r.result_type.is_linear()) {
        if let Some(union) = BoundingBox::union_all(&record.accumulated_boxes) {
            record.bbox = Some(union);
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ResultType;

    fn record(id: &str, name: &str, result_type: ResultType, bbox: Option<[f64; 4]>) -> CandidateRecord {
        let bbox = bbox.and_then(|[w, s, e, n]| BoundingBox::new(w, s, e, n));
        CandidateRecord {
            id: id.to_string(),
            name: name.to_string(),
            display_name: format!("{name}, Romania"),
            lat: 45.0,
            lng: 25.0,
            result_type,
            bbox,
            accumulated_boxes: bbox.into_iter().collect(),
        }
    }

    #[test]
    fn test_same_named_segments_collapse_into_union() {
        let merged = merge_linear_features(vec![
            record("1", "Autostrada A1", ResultType::Highway, Some([21.0, 45.7, 21.1, 45.8])),
            record("2", "autostrada a1", ResultType::Highway, Some([23.9, 45.8, 24.0, 45.9])),
            record("3", "Autostrada A1", ResultType::Highway, Some([25.9, 44.4, 26.0, 44.5])),
        ]);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].id, "1");
        assert_eq!(
            merged[0].bbox,
            BoundingBox::new(21.0, 44.4, 26.0, 45.9)
        );
    }

    #[test]
    fn test_roads_and_highways_share_a_group() {
        let merged = merge_linear_features(vec![
            record("1", "DN7", ResultType::Road, Some([24.0, 45.0, 24.1, 45.1])),
            record("2", "DN7", ResultType::Highway, Some([22.0, 46.0, 22.1, 46.1])),
        ]);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].result_type, ResultType::Road);
        assert_eq!(merged[0].bbox, BoundingBox::new(22.0, 45.0, 24.1, 46.1));
    }

    #[test]
    fn test_non_linear_records_pass_through_in_position() {
        let merged = merge_linear_features(vec![
            record("1", "DN1", ResultType::Road, None),
            record("2", "Ploiești", ResultType::City, Some([25.9, 44.9, 26.1, 45.0])),
            record("3", "DN1", ResultType::Road, Some([25.5, 45.0, 25.6, 45.1])),
            record("4", "Ploiești", ResultType::City, None),
            record("5", "Strada Lungă", ResultType::Street, None),
            record("6", "Strada Lungă", ResultType::Street, None),
        ]);

        let ids: Vec<&str> = merged.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "4", "5", "6"]);
        // First-seen record had no box, the later segment supplies it
        assert_eq!(merged[0].bbox, BoundingBox::new(25.5, 45.0, 25.6, 45.1));
    }

    #[test]
    fn test_group_without_boxes_stays_absent() {
        let merged = merge_linear_features(vec![
            record("1", "DJ107", ResultType::Road, None),
            record("2", "DJ107", ResultType::Road, None),
        ]);

        assert_eq!(merged.len(), 1);
        assert!(merged[0].bbox.is_none());
    }

    #[test]
    fn test_merge_is_idempotent() {
        let once = merge_linear_features(vec![
            record("1", "A2", ResultType::Highway, Some([26.1, 44.4, 26.2, 44.5])),
            record("2", "Constanța", ResultType::City, Some([28.5, 44.1, 28.7, 44.3])),
            record("3", "A2", ResultType::Highway, Some([28.3, 44.2, 28.4, 44.3])),
        ]);
        let twice = merge_linear_features(once.clone());

        assert_eq!(once, twice);
    }
}
