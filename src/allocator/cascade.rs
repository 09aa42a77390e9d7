//! Removal with cascading slot re-numbering.
//!
//! Removing a list shifts every later list one position back, so each pie
//! after the removed list's pie hands its first member to the pie before it.
//! The handed-over member takes the slot freed in the receiving pie, and the
//! slot it held becomes the freed slot of the pie it left. Only the last pie
//! ends up with a gap.

use crate::domain::{DomainError, DomainResult, ListId, ListRecord};

use super::pie::current_pie_index;
use super::CascadeBasis;

/// One slot change made by a cascade
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reassignment {
    pub id: ListId,
    /// Pie the record belongs to after the removal
    pub pie_index: usize,
    pub from: u32,
    pub to: u32,
}

/// Result of [`remove_and_cascade`]
#[derive(Debug, Clone, PartialEq)]
pub struct CascadeOutcome {
    /// The record taken out of the active collection, slot unchanged
    pub removed: ListRecord,
    /// Slot changes in walk order (receiving pie first)
    pub reassignments: Vec<Reassignment>,
}

/// Remove the record at `removed_index` and keep earlier pies gap-free.
///
/// Nothing is changed when an error is returned.
///
/// # Errors
/// - `NotFound` if `removed_index` is past the end of `active`
/// - `InvariantViolation` if the removed record, or a record that has to move
///   into an earlier pie, carries a slot outside `1..=capacity`
pub fn remove_and_cascade(
    active: &mut Vec<ListRecord>,
    removed_index: usize,
    capacity: usize,
    basis: CascadeBasis,
) -> DomainResult<CascadeOutcome> {
    let capacity = capacity.max(1);
    let count_before = active.len();

    let target = active.get(removed_index).ok_or_else(|| {
        DomainError::NotFound(format!(
            "no active list at position {} (have {})",
            removed_index, count_before
        ))
    })?;
    check_slot(target, capacity)?;

    let removed_pie = removed_index / capacity;
    let last_pie = current_pie_index(count_before, capacity);

    // Donors are the first members of every pie after the removed one
    for pie_index in removed_pie + 1..=last_pie {
        let donor = active.get(pie_index * capacity).ok_or_else(|| {
            DomainError::InvariantViolation(format!(
                "pie {} has no first member (have {} lists)",
                pie_index, count_before
            ))
        })?;
        check_slot(donor, capacity)?;
    }

    let removed = active.remove(removed_index);

    let basis_count = match basis {
        CascadeBasis::PreRemoval => count_before,
        CascadeBasis::PostRemoval => active.len(),
    };
    if basis_count <= capacity {
        log::debug!("removed list {} from the only pie, no cascade", removed.id);
        return Ok(CascadeOutcome {
            removed,
            reassignments: Vec::new(),
        });
    }

    let mut reassignments = Vec::new();
    let mut pending = vec![(removed_pie, removed.slot)];

    while let Some((pie_index, freed_slot)) = pending.pop() {
        if pie_index >= last_pie {
            // The last pie keeps the gap
            continue;
        }

        // After the shift the donor sits in the last position of this pie
        let position = (pie_index + 1) * capacity - 1;
        let Some(record) = active.get_mut(position) else {
            return Err(DomainError::InvariantViolation(format!(
                "no list at position {} while filling pie {}",
                position, pie_index
            )));
        };

        let from = record.slot;
        record.slot = freed_slot;
        reassignments.push(Reassignment {
            id: record.id,
            pie_index,
            from,
            to: freed_slot,
        });
        pending.push((pie_index + 1, from));
    }

    log::debug!(
        "removed list {} from pie {}, {} slot(s) reassigned",
        removed.id,
        removed_pie,
        reassignments.len()
    );

    Ok(CascadeOutcome {
        removed,
        reassignments,
    })
}

fn check_slot(record: &ListRecord, capacity: usize) -> DomainResult<()> {
    if record.has_valid_slot(capacity) {
        Ok(())
    } else {
        Err(DomainError::InvariantViolation(format!(
            "list {} has slot {} outside 1..={}",
            record.id, record.slot, capacity
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocator::{assign_slot, current_pie_index, pies, MAX_LISTS_PER_PIE};

    fn build(count: usize) -> Vec<ListRecord> {
        let mut active = Vec::new();
        for i in 0..count {
            let mut record = ListRecord::new("owner", format!("List {}", i), Vec::new());
            record.slot = assign_slot(&active, MAX_LISTS_PER_PIE);
            active.push(record);
        }
        active
    }

    fn slots(active: &[ListRecord]) -> Vec<Vec<u32>> {
        pies(active, MAX_LISTS_PER_PIE)
            .iter()
            .map(|pie| pie.iter().map(|r| r.slot).collect())
            .collect()
    }

    #[test]
    fn test_merge_second_pie_into_first() {
        let mut active = build(9);
        let ninth = active[8].id;
        let third = active[2].id;

        let outcome =
            remove_and_cascade(&mut active, 2, MAX_LISTS_PER_PIE, CascadeBasis::PreRemoval).unwrap();

        assert_eq!(outcome.removed.id, third);
        assert_eq!(outcome.removed.slot, 3);
        assert_eq!(
            outcome.reassignments,
            vec![Reassignment {
                id: ninth,
                pie_index: 0,
                from: 1,
                to: 3
            }]
        );
        assert_eq!(slots(&active), vec![vec![1, 2, 4, 5, 6, 7, 8, 3]]);
        assert_eq!(current_pie_index(active.len(), MAX_LISTS_PER_PIE), 0);
    }

    #[test]
    fn test_single_pie_has_no_cascade() {
        let mut active = build(5);
        let outcome =
            remove_and_cascade(&mut active, 1, MAX_LISTS_PER_PIE, CascadeBasis::PreRemoval).unwrap();

        assert!(outcome.reassignments.is_empty());
        assert_eq!(slots(&active), vec![vec![1, 3, 4, 5]]);
    }

    #[test]
    fn test_removal_from_last_pie_leaves_gap() {
        let mut active = build(12);
        let outcome =
            remove_and_cascade(&mut active, 9, MAX_LISTS_PER_PIE, CascadeBasis::PreRemoval).unwrap();

        assert!(outcome.reassignments.is_empty());
        assert_eq!(slots(&active)[1], vec![1, 3, 4]);
    }

    #[test]
    fn test_walks_through_every_later_pie() {
        let mut active = build(20);
        // Pie 1 starts with slot 1 and pie 2 starts with slot 1
        let outcome =
            remove_and_cascade(&mut active, 4, MAX_LISTS_PER_PIE, CascadeBasis::PreRemoval).unwrap();

        let walk: Vec<_> = outcome
            .reassignments
            .iter()
            .map(|r| (r.pie_index, r.from, r.to))
            .collect();
        assert_eq!(walk, vec![(0, 1, 5), (1, 1, 1)]);
        assert_eq!(
            slots(&active),
            vec![
                vec![1, 2, 3, 4, 6, 7, 8, 5],
                vec![2, 3, 4, 5, 6, 7, 8, 1],
                vec![2, 3, 4]
            ]
        );
    }

    #[test]
    fn test_post_removal_basis_skips_merge() {
        let mut active = build(9);
        let outcome =
            remove_and_cascade(&mut active, 2, MAX_LISTS_PER_PIE, CascadeBasis::PostRemoval).unwrap();

        assert!(outcome.reassignments.is_empty());
        // The spilled record keeps slot 1, next to the original slot 1
        assert_eq!(slots(&active), vec![vec![1, 2, 4, 5, 6, 7, 8, 1]]);
    }

    #[test]
    fn test_post_removal_basis_cascades_with_several_pies() {
        let mut pre = build(17);
        let mut post = pre.clone();
        let a = remove_and_cascade(&mut pre, 0, MAX_LISTS_PER_PIE, CascadeBasis::PreRemoval).unwrap();
        let b = remove_and_cascade(&mut post, 0, MAX_LISTS_PER_PIE, CascadeBasis::PostRemoval).unwrap();
        assert_eq!(a.reassignments, b.reassignments);
        assert_eq!(pre, post);
    }

    #[test]
    fn test_out_of_range_index_is_not_found() {
        let mut active = build(3);
        let err = remove_and_cascade(&mut active, 3, MAX_LISTS_PER_PIE, CascadeBasis::PreRemoval)
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(active.len(), 3);
    }

    #[test]
    fn test_invalid_removed_slot_is_invariant_violation() {
        let mut active = build(3);
        active[1].slot = 0;
        let err = remove_and_cascade(&mut active, 1, MAX_LISTS_PER_PIE, CascadeBasis::PreRemoval)
            .unwrap_err();
        assert!(err.is_invariant_violation());
        assert_eq!(active.len(), 3);
    }

    #[test]
    fn test_invalid_donor_slot_leaves_collection_untouched() {
        let mut active = build(10);
        active[8].slot = 42;
        let before = active.clone();
        let err = remove_and_cascade(&mut active, 0, MAX_LISTS_PER_PIE, CascadeBasis::PreRemoval)
            .unwrap_err();
        assert!(err.is_invariant_violation());
        assert_eq!(active, before);
    }
}
