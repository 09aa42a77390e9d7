//! Pie partitioning and positional lookups.

use crate::domain::ListRecord;

/// Split records into consecutive pies of `capacity`.
///
/// The last pie may be shorter. No records, no pies.
///
/// # Examples
///
/// ```
/// use have_your_cake::allocator::pies;
/// use have_your_cake::domain::ListRecord;
///
/// let lists: Vec<_> = (0..10).map(|i| ListRecord::new("me", format!("l{i}"), vec![])).collect();
/// let chunks = pies(&lists, 8);
/// assert_eq!(chunks.len(), 2);
/// assert_eq!(chunks[1].len(), 2);
/// ```
pub fn pies(records: &[ListRecord], capacity: usize) -> Vec<&[ListRecord]> {
    records.chunks(capacity.max(1)).collect()
}

/// Number of pies needed for `count` records
pub fn pie_count(count: usize, capacity: usize) -> usize {
    count.div_ceil(capacity.max(1))
}

/// Records of pie `pie_index`; empty when that pie does not exist.
pub fn get_pie(records: &[ListRecord], pie_index: usize, capacity: usize) -> &[ListRecord] {
    let capacity = capacity.max(1);
    let start = pie_index.saturating_mul(capacity);
    if start >= records.len() {
        return &[];
    }
    let end = start.saturating_add(capacity).min(records.len());
    &records[start..end]
}

/// Index of the most recent pie.
///
/// An empty collection is reported as pie 0, the pie the next list will start.
///
/// # Examples
///
/// ```
/// use have_your_cake::allocator::current_pie_index;
///
/// assert_eq!(current_pie_index(0, 8), 0);
/// assert_eq!(current_pie_index(8, 8), 0);
/// assert_eq!(current_pie_index(9, 8), 1);
/// ```
pub fn current_pie_index(active_count: usize, capacity: usize) -> usize {
    active_count.saturating_sub(1) / capacity.max(1)
}

/// Overall index of the record drawn at `position` inside pie `pie_index`.
///
/// This is positional: the slot numbers of the pie play no part.
pub fn list_index_for(
    pie_index: usize,
    position: usize,
    active_count: usize,
    capacity: usize,
) -> Option<usize> {
    let overall = pie_index.checked_mul(capacity)?.checked_add(position)?;
    (overall < active_count).then_some(overall)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocator::MAX_LISTS_PER_PIE;

    fn records(n: usize) -> Vec<ListRecord> {
        (0..n)
            .map(|i| ListRecord::new("owner", format!("List {}", i), Vec::new()))
            .collect()
    }

    #[test]
    fn test_pies_chunks_in_order() {
        let lists = records(17);
        let chunks = pies(&lists, MAX_LISTS_PER_PIE);
        let sizes: Vec<_> = chunks.iter().map(|p| p.len()).collect();
        assert_eq!(sizes, vec![8, 8, 1]);
        assert_eq!(chunks[1][0].id, lists[8].id);
        assert!(pies(&[], MAX_LISTS_PER_PIE).is_empty());
    }

    #[test]
    fn test_pie_count() {
        assert_eq!(pie_count(0, 8), 0);
        assert_eq!(pie_count(1, 8), 1);
        assert_eq!(pie_count(8, 8), 1);
        assert_eq!(pie_count(9, 8), 2);
    }

    #[test]
    fn test_get_pie_bounds() {
        let lists = records(10);
        assert_eq!(get_pie(&lists, 0, 8).len(), 8);
        assert_eq!(get_pie(&lists, 1, 8).len(), 2);
        assert_eq!(get_pie(&lists, 1, 8)[0].id, lists[8].id);
        assert!(get_pie(&lists, 2, 8).is_empty());
        assert!(get_pie(&lists, usize::MAX, 8).is_empty());
    }

    #[test]
    fn test_current_pie_index() {
        assert_eq!(current_pie_index(0, 8), 0);
        assert_eq!(current_pie_index(1, 8), 0);
        assert_eq!(current_pie_index(8, 8), 0);
        assert_eq!(current_pie_index(9, 8), 1);
        assert_eq!(current_pie_index(16, 8), 1);
        assert_eq!(current_pie_index(17, 8), 2);
    }

    #[test]
    fn test_current_pie_index_monotonic_on_append() {
        let mut last = current_pie_index(0, 8);
        for count in 1..=40 {
            let index = current_pie_index(count, 8);
            assert!(index >= last);
            last = index;
        }
    }

    #[test]
    fn test_list_index_for() {
        assert_eq!(list_index_for(0, 0, 10, 8), Some(0));
        assert_eq!(list_index_for(1, 1, 10, 8), Some(9));
        assert_eq!(list_index_for(1, 2, 10, 8), None);
        assert_eq!(list_index_for(0, 0, 0, 8), None);
        assert_eq!(list_index_for(usize::MAX, 1, 10, 8), None);
    }
}
