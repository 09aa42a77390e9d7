//! List Entity
//!
//! A named list of items, shown as one slice of a pie ("cake").

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::entity::Entity;

/// Unique identifier of a list
pub type ListId = Uuid;

/// Identifier of the owning account, as handed out by the identity provider
pub type OwnerId = String;

/// One entry of a list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListItem {
    pub id: Uuid,
    pub name: String,
}

impl ListItem {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }

    /// Blank entries are dropped before persisting
    pub fn is_blank(&self) -> bool {
        self.name.trim().is_empty()
    }
}

/// A list and its place in the pies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListRecord {
    /// Unique identifier, never changes
    pub id: ListId,
    /// Display title
    pub title: String,
    /// Items in display order
    pub items: Vec<ListItem>,
    /// Slot within the record's pie (1-based), assigned by the allocator
    pub slot: u32,
    pub created_at: DateTime<Utc>,
    /// When the list was last moved to "recently deleted"
    pub deleted_at: Option<DateTime<Utc>>,
    pub is_deleted: bool,
    pub owner_id: OwnerId,
}

impl ListRecord {
    /// Create an active list with no slot yet (slot 0)
    pub fn new(owner_id: impl Into<OwnerId>, title: impl Into<String>, items: Vec<ListItem>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            items,
            slot: 0,
            created_at: Utc::now(),
            deleted_at: None,
            is_deleted: false,
            owner_id: owner_id.into(),
        }
    }

    /// Build items from raw names, dropping blank ones
    pub fn items_from_names<I, S>(names: I) -> Vec<ListItem>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        names
            .into_iter()
            .map(ListItem::new)
            .filter(|item| !item.is_blank())
            .collect()
    }

    /// Drop blank items in place
    pub fn retain_named_items(&mut self) {
        self.items.retain(|item| !item.is_blank());
    }

    pub fn mark_deleted(&mut self, at: DateTime<Utc>) {
        self.is_deleted = true;
        self.deleted_at = Some(at);
    }

    pub fn mark_restored(&mut self) {
        self.is_deleted = false;
        self.deleted_at = None;
    }

    /// Whether the slot lies in `1..=capacity`
    pub fn has_valid_slot(&self, capacity: usize) -> bool {
        self.slot >= 1 && (self.slot as usize) <= capacity
    }
}

impl Entity for ListRecord {
    type Id = ListId;

    fn id(&self) -> Self::Id {
        self.id
    }
}
