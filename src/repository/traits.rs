//! Repository Layer - Core Traits
//!
//! Defines the abstract interfaces for data access.
//! Implementations can use SQLite, in-memory, etc.

use async_trait::async_trait;

use crate::domain::{DomainResult, Entity, ListId, ListRecord};

/// Core repository trait for CRUD operations
///
/// Generic over any Entity type.
/// All operations are async to support various backends.
#[async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    /// Create a new entity
    async fn create(&self, entity: &T) -> DomainResult<()>;

    /// Find entity by ID
    async fn find_by_id(&self, id: T::Id) -> DomainResult<Option<T>>;

    /// Update an existing entity
    async fn update(&self, entity: &T) -> DomainResult<()>;

    /// Delete entity by ID for good
    async fn delete(&self, id: T::Id) -> DomainResult<()>;
}

/// Store of lists, scoped by owner
///
/// Active lists are returned in active order: creation order, with restored
/// lists moved to the end.
#[async_trait]
pub trait ListStore: Repository<ListRecord> {
    /// All lists of an owner, split into (active, recently deleted)
    async fn load_all(&self, owner_id: &str) -> DomainResult<(Vec<ListRecord>, Vec<ListRecord>)>;

    /// Find a list only if it belongs to `owner_id`
    async fn find_owned(&self, owner_id: &str, id: ListId) -> DomainResult<Option<ListRecord>>;

    /// Remove a list for good; `NotFound` unless both id and owner match
    async fn purge(&self, list: &ListRecord) -> DomainResult<()>;

    /// Soft delete (flag the record) or remove it permanently
    async fn delete_list(&self, list: &ListRecord, permanently: bool) -> DomainResult<()> {
        if permanently {
            self.purge(list).await
        } else {
            let mut deleted = list.clone();
            if !deleted.is_deleted {
                deleted.mark_deleted(chrono::Utc::now());
            }
            self.update(&deleted).await
        }
    }

    /// Bring a soft-deleted record back into the active lists
    async fn restore(&self, list: &ListRecord) -> DomainResult<()> {
        let mut restored = list.clone();
        restored.mark_restored();
        self.update(&restored).await
    }
}
