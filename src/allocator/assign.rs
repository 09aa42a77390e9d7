//! Slot assignment for a list about to be appended.

use crate::domain::ListRecord;

use super::pie::pies;

/// Slot for a record appended after `active`.
///
/// Fills the smallest unused slot of the last pie while it has room;
/// otherwise the record starts a new pie at slot 1.
///
/// # Examples
///
/// ```
/// use have_your_cake::allocator::assign_slot;
///
/// assert_eq!(assign_slot(&[], 8), 1);
/// ```
pub fn assign_slot(active: &[ListRecord], capacity: usize) -> u32 {
    let capacity = capacity.max(1);
    let all = pies(active, capacity);

    match all.last() {
        Some(last) if !last.is_empty() && last.len() < capacity => {
            // Fewer members than slots, so a free slot always exists
            (1..=capacity as u32)
                .find(|slot| !last.iter().any(|record| record.slot == *slot))
                .unwrap_or(1)
        }
        _ => 1,
    }
}
