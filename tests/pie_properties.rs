// Test code is allowed to panic on failure
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing, clippy::panic)]

//! Property-based tests for pie slot allocation.
//!
//! Random add/remove sequences are replayed against the allocator and the
//! in-memory store, checking that pies stay gap-free after every step.

use std::collections::HashSet;
use std::sync::Arc;

use proptest::prelude::*;

use have_your_cake::allocator::{
    assign_slot, current_pie_index, list_index_for, pies, remove_and_cascade, CascadeBasis,
};
use have_your_cake::{CakeConfig, HomeService, ListRecord, MemoryListStore};

#[derive(Debug, Clone)]
enum Op {
    Add,
    /// Remove the list at `seed % len`
    Remove(usize),
}

/// Strategy for sequences weighted towards adds so pies fill up.
fn ops() -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(
        prop_oneof![
            3 => Just(Op::Add),
            2 => any::<usize>().prop_map(Op::Remove),
        ],
        0..80,
    )
}

fn capacity() -> impl Strategy<Value = usize> {
    1..=10usize
}

fn record() -> ListRecord {
    ListRecord::new("owner", "list", Vec::new())
}

/// Every pie has distinct slots in range; every pie but the last uses them all.
fn check_pies(active: &[ListRecord], capacity: usize) -> Result<(), TestCaseError> {
    let all = pies(active, capacity);
    for (index, pie) in all.iter().enumerate() {
        let slots: HashSet<u32> = pie.iter().map(|r| r.slot).collect();
        prop_assert_eq!(slots.len(), pie.len(), "duplicate slot in pie {}", index);
        prop_assert!(
            slots.iter().all(|s| (1..=capacity as u32).contains(s)),
            "slot out of range in pie {}: {:?}",
            index,
            slots
        );
        if index + 1 < all.len() {
            prop_assert_eq!(pie.len(), capacity, "pie {} is not full", index);
        }
    }
    Ok(())
}

proptest! {
    /// Property: Pies before the last never have gaps.
    #[test]
    fn test_no_gaps_after_any_sequence(capacity in capacity(), ops in ops()) {
        let mut active: Vec<ListRecord> = Vec::new();

        for op in ops {
            match op {
                Op::Add => {
                    let mut list = record();
                    list.slot = assign_slot(&active, capacity);
                    active.push(list);
                }
                Op::Remove(seed) => {
                    if active.is_empty() {
                        continue;
                    }
                    let index = seed % active.len();
                    remove_and_cascade(&mut active, index, capacity, CascadeBasis::PreRemoval)
                        .unwrap();
                }
            }
            check_pies(&active, capacity)?;
        }
    }

    /// Property: The assigned slot is the smallest one the last pie lacks.
    #[test]
    fn test_assign_slot_is_smallest_free(capacity in capacity(), adds in 0..40usize) {
        let mut active: Vec<ListRecord> = Vec::new();
        for _ in 0..adds {
            let mut list = record();
            list.slot = assign_slot(&active, capacity);
            active.push(list);
        }

        let slot = assign_slot(&active, capacity);
        let last = pies(&active, capacity).last().copied().unwrap_or(&[]);
        let expected = if last.is_empty() || last.len() == capacity {
            1
        } else {
            (1..=capacity as u32)
                .find(|s| !last.iter().any(|r| r.slot == *s))
                .unwrap()
        };
        prop_assert_eq!(slot, expected);
        prop_assert_eq!(slot, assign_slot(&active, capacity));
    }

    /// Property: Adding never moves to an earlier pie, removing never to a later one.
    #[test]
    fn test_pie_index_moves_with_count(capacity in capacity(), count in 0..200usize) {
        let index = current_pie_index(count, capacity);
        prop_assert!(current_pie_index(count + 1, capacity) >= index);
        if count > 0 {
            prop_assert!(current_pie_index(count - 1, capacity) <= index);
            prop_assert!(index * capacity < count);
        } else {
            prop_assert_eq!(index, 0);
        }
    }

    /// Property: Positional lookup agrees with pie chunking.
    #[test]
    fn test_list_index_matches_pies(capacity in capacity(), count in 0..60usize) {
        let active: Vec<ListRecord> = (0..count).map(|_| record()).collect();
        for (pie_index, pie) in pies(&active, capacity).iter().enumerate() {
            for (position, list) in pie.iter().enumerate() {
                let index = list_index_for(pie_index, position, count, capacity).unwrap();
                prop_assert_eq!(active[index].id, list.id);
            }
        }
        prop_assert_eq!(list_index_for(count / capacity + 1, 0, count, capacity), None);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Property: After any sequence the store reloads to the same pies.
    #[test]
    fn test_store_matches_memory(capacity in capacity(), ops in ops()) {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(async {
            let store = Arc::new(MemoryListStore::new());
            let config = CakeConfig { capacity_per_pie: capacity, ..CakeConfig::default() };
            let mut home = HomeService::new(Arc::clone(&store), "owner", &config);

            for (step, op) in ops.into_iter().enumerate() {
                match op {
                    Op::Add => {
                        home.add_list(&format!("List {}", step), Vec::new()).await.unwrap();
                    }
                    Op::Remove(seed) => {
                        if home.lists().is_empty() {
                            continue;
                        }
                        let id = home.lists()[seed % home.lists().len()].id;
                        home.delete_list(id).await.unwrap();
                    }
                }
            }
            check_pies(home.lists(), capacity)?;

            let mut reloaded = HomeService::new(store, "owner", &config);
            reloaded.load().await.unwrap();
            prop_assert_eq!(reloaded.lists(), home.lists());
            prop_assert_eq!(reloaded.recently_deleted().len(), home.recently_deleted().len());
            prop_assert_eq!(reloaded.current_pie_index(), home.current_pie_index());
            Ok(())
        })?;
    }
}
