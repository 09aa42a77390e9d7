//! In-Memory List Store
//!
//! Keeps lists in process memory, for guest sessions and tests. Writes can be
//! made to fail on demand to exercise store-failure handling.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

use crate::domain::{DomainError, DomainResult, ListId, ListRecord};
use super::traits::{ListStore, Repository};

/// In-memory implementation of the list store
#[derive(Default)]
pub struct MemoryListStore {
    /// Insertion order doubles as the active order
    lists: Mutex<Vec<ListRecord>>,
    fail_writes: AtomicBool,
}

impl MemoryListStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following create/update/delete fail (or succeed again)
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Copy of everything stored, in store order
    pub async fn snapshot(&self) -> Vec<ListRecord> {
        self.lists.lock().await.clone()
    }

    fn check_writable(&self) -> DomainResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(DomainError::Store("store is rejecting writes".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Repository<ListRecord> for MemoryListStore {
    async fn create(&self, entity: &ListRecord) -> DomainResult<()> {
        self.check_writable()?;
        let mut lists = self.lists.lock().await;
        if lists.iter().any(|list| list.id == entity.id) {
            return Err(DomainError::Store(format!("List {} already exists", entity.id)));
        }
        lists.push(entity.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: ListId) -> DomainResult<Option<ListRecord>> {
        let lists = self.lists.lock().await;
        Ok(lists.iter().find(|list| list.id == id).cloned())
    }

    async fn update(&self, entity: &ListRecord) -> DomainResult<()> {
        self.check_writable()?;
        let mut lists = self.lists.lock().await;
        let index = lists
            .iter()
            .position(|list| list.id == entity.id && list.owner_id == entity.owner_id)
            .ok_or_else(|| DomainError::NotFound(format!("List {} not found", entity.id)))?;

        if lists[index].is_deleted && !entity.is_deleted {
            // Restored lists re-enter at the end of the active order
            lists.remove(index);
            lists.push(entity.clone());
        } else {
            lists[index] = entity.clone();
        }
        Ok(())
    }

    async fn delete(&self, id: ListId) -> DomainResult<()> {
        self.check_writable()?;
        let mut lists = self.lists.lock().await;
        let before = lists.len();
        lists.retain(|list| list.id != id);
        if lists.len() == before {
            return Err(DomainError::NotFound(format!("List {} not found", id)));
        }
        Ok(())
    }
}

#[async_trait]
impl ListStore for MemoryListStore {
    async fn find_owned(&self, owner_id: &str, id: ListId) -> DomainResult<Option<ListRecord>> {
        let lists = self.lists.lock().await;
        Ok(lists
            .iter()
            .find(|list| list.id == id && list.owner_id == owner_id)
            .cloned())
    }

    async fn purge(&self, list: &ListRecord) -> DomainResult<()> {
        self.check_writable()?;
        let mut lists = self.lists.lock().await;
        let before = lists.len();
        lists.retain(|stored| !(stored.id == list.id && stored.owner_id == list.owner_id));
        if lists.len() == before {
            return Err(DomainError::NotFound(format!(
                "List {} not found for {}",
                list.id, list.owner_id
            )));
        }
        Ok(())
    }

    async fn load_all(&self, owner_id: &str) -> DomainResult<(Vec<ListRecord>, Vec<ListRecord>)> {
        let lists = self.lists.lock().await;
        let (deleted, active): (Vec<_>, Vec<_>) = lists
            .iter()
            .filter(|list| list.owner_id == owner_id)
            .cloned()
            .partition(|list| list.is_deleted);

        let mut deleted = deleted;
        deleted.sort_by_key(|list| list.deleted_at);
        Ok((active, deleted))
    }
}
