//! Pie Slot Allocation
//!
//! Active lists are cut into pies of a fixed capacity by their position in the
//! active order. Every list holds a slot number that is unique within its pie.
//! All functions here are pure and synchronous; callers serialize access to
//! the collections they pass in.
//!
//! - pie: partitioning and positional lookups
//! - assign: slot for a list about to be appended
//! - cascade: removal with slot re-numbering of the following pies
//! - layout: slice angles and slot assets for display

mod assign;
mod cascade;
mod layout;
mod pie;

use serde::{Deserialize, Serialize};

pub use assign::assign_slot;
pub use cascade::{remove_and_cascade, CascadeOutcome, Reassignment};
pub use layout::{displayable, slice_angles, slot_asset, PieSlice};
pub use pie::{current_pie_index, get_pie, list_index_for, pie_count, pies};

/// Maximum number of lists in one pie
pub const MAX_LISTS_PER_PIE: usize = 8;

/// Which record count decides that only one pie exists and the cascade can be skipped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CascadeBasis {
    /// Count before the removal: a removal that merges the last pie into the
    /// previous one still renumbers the merged record
    #[default]
    PreRemoval,
    /// Count after the removal. Legacy check; when exactly one record spills
    /// into the previous pie it keeps its old slot, which may duplicate one
    PostRemoval,
}
