//! Display data for a pie: slice angles and slot assets.

use serde::Serialize;

use crate::domain::{DomainError, DomainResult, ListRecord};

/// One slice of a drawn pie, angles in degrees
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub start_degrees: f64,
    pub end_degrees: f64,
    pub label: String,
}

/// Equal slices, one per record, in record order.
pub fn slice_angles(pie: &[ListRecord]) -> Vec<PieSlice> {
    let total = pie.len() as f64;
    pie.iter()
        .enumerate()
        .map(|(index, record)| PieSlice {
            start_degrees: index as f64 / total * 360.0,
            end_degrees: (index + 1) as f64 / total * 360.0,
            label: record.title.clone(),
        })
        .collect()
}

/// Name of the cake image for a record's slot, e.g. `cake3`.
///
/// # Errors
/// `InvariantViolation` when the slot lies outside `1..=capacity`.
pub fn slot_asset(record: &ListRecord, capacity: usize) -> DomainResult<String> {
    if !record.has_valid_slot(capacity) {
        return Err(DomainError::InvariantViolation(format!(
            "invalid slot {} for list {}",
            record.slot, record.id
        )));
    }
    Ok(format!("cake{}", record.slot))
}

/// Records of a pie that can be drawn with a cake image
pub fn displayable(pie: &[ListRecord], capacity: usize) -> Vec<&ListRecord> {
    pie.iter().filter(|record| record.has_valid_slot(capacity)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titled(titles: &[&str]) -> Vec<ListRecord> {
        titles
            .iter()
            .enumerate()
            .map(|(i, title)| {
                let mut record = ListRecord::new("owner", *title, Vec::new());
                record.slot = i as u32 + 1;
                record
            })
            .collect()
    }

    #[test]
    fn test_slice_angles_split_evenly() {
        let pie = titled(&["a", "b", "c", "d"]);
        let slices = slice_angles(&pie);
        let bounds: Vec<_> = slices.iter().map(|s| (s.start_degrees, s.end_degrees)).collect();
        assert_eq!(bounds, vec![(0.0, 90.0), (90.0, 180.0), (180.0, 270.0), (270.0, 360.0)]);
        assert_eq!(slices[2].label, "c");
    }

    #[test]
    fn test_slice_angles_empty_pie() {
        assert!(slice_angles(&[]).is_empty());
    }

    #[test]
    fn test_slot_asset() {
        let pie = titled(&["a", "b", "c"]);
        assert_eq!(slot_asset(&pie[2], 8).unwrap(), "cake3");
    }

    #[test]
    fn test_slot_asset_rejects_invalid_slot() {
        let mut record = ListRecord::new("owner", "broken", Vec::new());
        record.slot = 9;
        let err = slot_asset(&record, 8).unwrap_err();
        assert!(err.is_invariant_violation());

        record.slot = 0;
        assert!(slot_asset(&record, 8).is_err());
    }

    #[test]
    fn test_displayable_skips_invalid_slots() {
        let mut pie = titled(&["a", "b", "c"]);
        pie[1].slot = 0;
        let shown: Vec<_> = displayable(&pie, 8).iter().map(|r| r.title.as_str()).collect();
        assert_eq!(shown, vec!["a", "c"]);
    }
}
