//! Home Service
//!
//! Owns the active and recently deleted lists of one owner. Every change goes
//! through `apply`, which updates memory first and returns the store writes
//! that `persist` then performs. A failed write is reported to the caller; the
//! in-memory change stays.

use chrono::Utc;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::allocator::{
    assign_slot, current_pie_index, displayable, get_pie, list_index_for, pies, remove_and_cascade,
    slice_angles, slot_asset, CascadeBasis, PieSlice, Reassignment,
};
use crate::config::CakeConfig;
use crate::domain::{DomainError, DomainResult, ListId, ListItem, ListRecord, OwnerId};
use crate::repository::ListStore;

use super::search::{search, SearchHit};

/// Service shared between tasks; the mutex serializes read-then-write sequences
pub type SharedHome<S> = Arc<Mutex<HomeService<S>>>;

/// What a soft delete did
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteOutcome {
    /// The list as it now sits in "recently deleted"
    pub deleted: ListRecord,
    /// Slot changes made to keep earlier pies complete
    pub reassignments: Vec<Reassignment>,
}

enum Mutation {
    Add(ListRecord),
    Edit {
        id: ListId,
        title: String,
        items: Vec<ListItem>,
    },
    SoftDelete(ListId),
    Restore(ListId),
    Purge(ListId),
}

enum StoreWrite {
    Create(ListRecord),
    Update(ListRecord),
    SoftDelete(ListRecord),
    Restore(ListRecord),
    Purge(ListRecord),
}

struct Applied {
    record: ListRecord,
    reassignments: Vec<Reassignment>,
    writes: Vec<StoreWrite>,
}

pub struct HomeService<S: ListStore> {
    store: Arc<S>,
    owner_id: OwnerId,
    capacity: usize,
    basis: CascadeBasis,
    lists: Vec<ListRecord>,
    recently_deleted: Vec<ListRecord>,
    current_pie_index: usize,
    loaded: bool,
}

impl<S: ListStore> HomeService<S> {
    pub fn new(store: Arc<S>, owner_id: impl Into<OwnerId>, config: &CakeConfig) -> Self {
        Self {
            store,
            owner_id: owner_id.into(),
            capacity: config.capacity_per_pie.max(1),
            basis: config.cascade_basis,
            lists: Vec::new(),
            recently_deleted: Vec::new(),
            current_pie_index: 0,
            loaded: false,
        }
    }

    pub fn into_shared(self) -> SharedHome<S> {
        Arc::new(Mutex::new(self))
    }

    // ========================
    // Loading
    // ========================

    /// Replace the in-memory lists with the store's
    pub async fn load(&mut self) -> DomainResult<()> {
        let (active, deleted) = self.store.load_all(&self.owner_id).await?;
        self.lists = active;
        self.recently_deleted = deleted;
        self.loaded = true;
        self.refresh_pie_index();
        log::info!(
            "loaded {} active and {} deleted lists for {}",
            self.lists.len(),
            self.recently_deleted.len(),
            self.owner_id
        );
        Ok(())
    }

    /// Load once; later calls are no-ops
    pub async fn load_if_needed(&mut self) -> DomainResult<()> {
        if self.loaded {
            return Ok(());
        }
        self.load().await
    }

    // ========================
    // Mutations
    // ========================

    /// Create a list at the next free slot
    pub async fn add_list(&mut self, title: &str, items: Vec<String>) -> DomainResult<ListRecord> {
        let title = checked_title(title)?;
        let record = ListRecord::new(
            self.owner_id.clone(),
            title,
            ListRecord::items_from_names(items),
        );

        let applied = self.apply(Mutation::Add(record))?;
        log::info!("added list {} at slot {}", applied.record.id, applied.record.slot);
        self.persist(applied.writes).await?;
        Ok(applied.record)
    }

    /// Change title and items; slot and pie stay as they are
    pub async fn update_list(
        &mut self,
        id: ListId,
        title: &str,
        items: Vec<ListItem>,
    ) -> DomainResult<ListRecord> {
        let title = checked_title(title)?;
        let applied = self.apply(Mutation::Edit {
            id,
            title: title.to_string(),
            items,
        })?;
        self.persist(applied.writes).await?;
        Ok(applied.record)
    }

    /// Move a list to "recently deleted", renumbering later pies
    pub async fn delete_list(&mut self, id: ListId) -> DomainResult<DeleteOutcome> {
        let applied = self.apply(Mutation::SoftDelete(id))?;
        log::info!(
            "deleted list {}, {} slot(s) reassigned",
            id,
            applied.reassignments.len()
        );
        self.persist(applied.writes).await?;
        Ok(DeleteOutcome {
            deleted: applied.record,
            reassignments: applied.reassignments,
        })
    }

    /// Bring a list back from "recently deleted" with a fresh slot
    pub async fn restore_list(&mut self, id: ListId) -> DomainResult<ListRecord> {
        let applied = self.apply(Mutation::Restore(id))?;
        log::info!("restored list {} at slot {}", id, applied.record.slot);
        self.persist(applied.writes).await?;
        Ok(applied.record)
    }

    /// Remove a list from "recently deleted" and the store for good
    pub async fn permanently_delete_list(&mut self, id: ListId) -> DomainResult<ListRecord> {
        let applied = self.apply(Mutation::Purge(id))?;
        log::info!("permanently deleted list {}", id);
        self.persist(applied.writes).await?;
        Ok(applied.record)
    }

    /// The only place the collections change
    fn apply(&mut self, mutation: Mutation) -> DomainResult<Applied> {
        let applied = match mutation {
            Mutation::Add(mut record) => {
                record.slot = assign_slot(&self.lists, self.capacity);
                self.lists.push(record.clone());
                Applied {
                    writes: vec![StoreWrite::Create(record.clone())],
                    record,
                    reassignments: Vec::new(),
                }
            }
            Mutation::Edit { id, title, items } => {
                let record = self
                    .lists
                    .iter_mut()
                    .find(|list| list.id == id)
                    .ok_or_else(|| not_found(id))?;
                record.title = title;
                record.items = items;
                record.retain_named_items();
                let record = record.clone();
                Applied {
                    writes: vec![StoreWrite::Update(record.clone())],
                    record,
                    reassignments: Vec::new(),
                }
            }
            Mutation::SoftDelete(id) => {
                let index = self
                    .lists
                    .iter()
                    .position(|list| list.id == id)
                    .ok_or_else(|| not_found(id))?;
                let outcome = remove_and_cascade(&mut self.lists, index, self.capacity, self.basis)?;

                let mut deleted = outcome.removed;
                deleted.mark_deleted(Utc::now());
                self.recently_deleted.push(deleted.clone());

                let mut writes = vec![StoreWrite::SoftDelete(deleted.clone())];
                writes.extend(
                    outcome
                        .reassignments
                        .iter()
                        .filter_map(|change| self.lists.iter().find(|list| list.id == change.id))
                        .map(|list| StoreWrite::Update(list.clone())),
                );
                Applied {
                    record: deleted,
                    reassignments: outcome.reassignments,
                    writes,
                }
            }
            Mutation::Restore(id) => {
                let index = self
                    .recently_deleted
                    .iter()
                    .position(|list| list.id == id)
                    .ok_or_else(|| not_found(id))?;
                let mut record = self.recently_deleted.remove(index);
                record.mark_restored();
                record.slot = assign_slot(&self.lists, self.capacity);
                self.lists.push(record.clone());
                Applied {
                    writes: vec![StoreWrite::Restore(record.clone())],
                    record,
                    reassignments: Vec::new(),
                }
            }
            Mutation::Purge(id) => {
                let index = self
                    .recently_deleted
                    .iter()
                    .position(|list| list.id == id)
                    .ok_or_else(|| not_found(id))?;
                let record = self.recently_deleted.remove(index);
                Applied {
                    writes: vec![StoreWrite::Purge(record.clone())],
                    record,
                    reassignments: Vec::new(),
                }
            }
        };

        self.refresh_pie_index();
        Ok(applied)
    }

    /// Perform every write; the first failure is returned after all were tried
    async fn persist(&self, writes: Vec<StoreWrite>) -> DomainResult<()> {
        let mut first_error = None;
        for write in writes {
            let (id, result) = match write {
                StoreWrite::Create(list) => (list.id, self.store.create(&list).await),
                StoreWrite::Update(list) => (list.id, self.store.update(&list).await),
                StoreWrite::SoftDelete(list) => (list.id, self.store.delete_list(&list, false).await),
                StoreWrite::Restore(list) => (list.id, self.store.restore(&list).await),
                StoreWrite::Purge(list) => (list.id, self.store.delete_list(&list, true).await),
            };
            if let Err(e) = result {
                log::error!("store write for list {} failed: {}", id, e);
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn refresh_pie_index(&mut self) {
        self.current_pie_index = current_pie_index(self.lists.len(), self.capacity);
    }

    // ========================
    // Queries
    // ========================

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Active lists in pie order
    pub fn lists(&self) -> &[ListRecord] {
        &self.lists
    }

    pub fn recently_deleted(&self) -> &[ListRecord] {
        &self.recently_deleted
    }

    /// Index of the most recent pie (0 when there are no lists)
    pub fn current_pie_index(&self) -> usize {
        self.current_pie_index
    }

    pub fn find(&self, id: ListId) -> Option<&ListRecord> {
        self.lists.iter().find(|list| list.id == id)
    }

    pub fn pies(&self) -> Vec<&[ListRecord]> {
        pies(&self.lists, self.capacity)
    }

    /// Recently deleted lists grouped the same way as active ones
    pub fn deleted_pies(&self) -> Vec<&[ListRecord]> {
        pies(&self.recently_deleted, self.capacity)
    }

    /// Lists of deleted pie `pie_index` that can be drawn with a cake image
    pub fn deleted_pie(&self, pie_index: usize) -> Vec<&ListRecord> {
        displayable(get_pie(&self.recently_deleted, pie_index, self.capacity), self.capacity)
    }

    pub fn pie(&self, pie_index: usize) -> &[ListRecord] {
        get_pie(&self.lists, pie_index, self.capacity)
    }

    /// Overall index of the list drawn at `position` of pie `pie_index`
    pub fn list_index(&self, pie_index: usize, position: usize) -> Option<usize> {
        list_index_for(pie_index, position, self.lists.len(), self.capacity)
    }

    pub fn list_at(&self, pie_index: usize, position: usize) -> Option<&ListRecord> {
        self.list_index(pie_index, position)
            .and_then(|index| self.lists.get(index))
    }

    pub fn pie_slices(&self, pie_index: usize) -> Vec<PieSlice> {
        slice_angles(self.pie(pie_index))
    }

    /// Cake image name for a list's slot
    pub fn asset_for(&self, list: &ListRecord) -> DomainResult<String> {
        slot_asset(list, self.capacity)
    }

    /// Search the active lists
    pub fn search(&self, query: &str) -> Vec<SearchHit> {
        search(&self.lists, query)
    }
}

fn checked_title(title: &str) -> DomainResult<&str> {
    let title = title.trim();
    if title.is_empty() {
        return Err(DomainError::InvalidInput("List title cannot be empty.".to_string()));
    }
    Ok(title)
}

fn not_found(id: ListId) -> DomainError {
    DomainError::NotFound(format!("List {} not found", id))
}
