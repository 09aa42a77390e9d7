//! List Repository
//!
//! SQLite-backed implementation of [`ListStore`]. Items are stored as a JSON
//! column; `seq` keeps the active order per owner.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use crate::domain::{DomainError, DomainResult, ListId, ListItem, ListRecord};
use super::db::SharedConnection;
use super::traits::{ListStore, Repository};

const LIST_COLUMNS: &str = "id, owner_id, title, slot, items, created_at, deleted_at, is_deleted";

/// SQLite implementation of the list store
pub struct ListRepository {
    conn: SharedConnection,
}

impl ListRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }
}

fn connection(guard: &Option<Connection>) -> DomainResult<&Connection> {
    guard
        .as_ref()
        .ok_or_else(|| DomainError::Store("Database not initialized".to_string()))
}

fn store_err(e: rusqlite::Error) -> DomainError {
    DomainError::Store(e.to_string())
}

fn encode_items(items: &[ListItem]) -> DomainResult<String> {
    serde_json::to_string(items).map_err(|e| DomainError::Store(format!("Failed to encode items: {}", e)))
}

#[async_trait]
impl Repository<ListRecord> for ListRepository {
    async fn create(&self, entity: &ListRecord) -> DomainResult<()> {
        let guard = self.conn.lock().await;
        let conn = connection(&guard)?;

        conn.execute(
            "INSERT INTO lists (id, owner_id, title, slot, items, created_at, deleted_at, is_deleted, seq)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8,
                     (SELECT COALESCE(MAX(seq), 0) + 1 FROM lists WHERE owner_id = ?2))",
            params![
                entity.id.to_string(),
                entity.owner_id,
                entity.title,
                entity.slot,
                encode_items(&entity.items)?,
                entity.created_at.timestamp_millis(),
                entity.deleted_at.map(|at| at.timestamp_millis()),
                entity.is_deleted,
            ],
        )
        .map_err(store_err)?;

        Ok(())
    }

    async fn find_by_id(&self, id: ListId) -> DomainResult<Option<ListRecord>> {
        let guard = self.conn.lock().await;
        let conn = connection(&guard)?;

        let mut stmt = conn
            .prepare(&format!("SELECT {} FROM lists WHERE id = ?", LIST_COLUMNS))
            .map_err(store_err)?;
        let mut rows = stmt.query(params![id.to_string()]).map_err(store_err)?;

        match rows.next().map_err(store_err)? {
            Some(row) => Ok(Some(row_to_list(row)?)),
            None => Ok(None),
        }
    }

    async fn update(&self, entity: &ListRecord) -> DomainResult<()> {
        let guard = self.conn.lock().await;
        let conn = connection(&guard)?;

        // A restored list goes to the end of the active order
        let changed = conn
            .execute(
                "UPDATE lists SET title = ?1, slot = ?2, items = ?3, deleted_at = ?4, is_deleted = ?5,
                     seq = CASE WHEN is_deleted = 1 AND ?5 = 0
                                THEN (SELECT COALESCE(MAX(seq), 0) + 1 FROM lists WHERE owner_id = ?7)
                                ELSE seq END
                 WHERE id = ?6 AND owner_id = ?7",
                params![
                    entity.title,
                    entity.slot,
                    encode_items(&entity.items)?,
                    entity.deleted_at.map(|at| at.timestamp_millis()),
                    entity.is_deleted,
                    entity.id.to_string(),
                    entity.owner_id,
                ],
            )
            .map_err(store_err)?;

        if changed == 0 {
            return Err(DomainError::NotFound(format!("List {} not found", entity.id)));
        }
        Ok(())
    }

    async fn delete(&self, id: ListId) -> DomainResult<()> {
        let guard = self.conn.lock().await;
        let conn = connection(&guard)?;

        let changed = conn
            .execute("DELETE FROM lists WHERE id = ?", params![id.to_string()])
            .map_err(store_err)?;

        if changed == 0 {
            return Err(DomainError::NotFound(format!("List {} not found", id)));
        }
        Ok(())
    }
}

#[async_trait]
impl ListStore for ListRepository {
    async fn find_owned(&self, owner_id: &str, id: ListId) -> DomainResult<Option<ListRecord>> {
        let guard = self.conn.lock().await;
        let conn = connection(&guard)?;

        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM lists WHERE id = ? AND owner_id = ?",
                LIST_COLUMNS
            ))
            .map_err(store_err)?;
        let mut rows = stmt.query(params![id.to_string(), owner_id]).map_err(store_err)?;

        match rows.next().map_err(store_err)? {
            Some(row) => Ok(Some(row_to_list(row)?)),
            None => Ok(None),
        }
    }

    async fn purge(&self, list: &ListRecord) -> DomainResult<()> {
        let guard = self.conn.lock().await;
        let conn = connection(&guard)?;

        let changed = conn
            .execute(
                "DELETE FROM lists WHERE id = ? AND owner_id = ?",
                params![list.id.to_string(), list.owner_id],
            )
            .map_err(store_err)?;

        if changed == 0 {
            return Err(DomainError::NotFound(format!(
                "List {} not found for {}",
                list.id, list.owner_id
            )));
        }
        Ok(())
    }

    async fn load_all(&self, owner_id: &str) -> DomainResult<(Vec<ListRecord>, Vec<ListRecord>)> {
        let guard = self.conn.lock().await;
        let conn = connection(&guard)?;

        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM lists WHERE owner_id = ? ORDER BY seq ASC, created_at ASC",
                LIST_COLUMNS
            ))
            .map_err(store_err)?;
        let mut rows = stmt.query(params![owner_id]).map_err(store_err)?;

        let mut active = Vec::new();
        let mut deleted = Vec::new();
        while let Some(row) = rows.next().map_err(store_err)? {
            let list = row_to_list(row)?;
            if list.is_deleted {
                deleted.push(list);
            } else {
                active.push(list);
            }
        }

        // Recently deleted shows in deletion order
        deleted.sort_by_key(|list| list.deleted_at);
        log::debug!(
            "loaded {} active and {} deleted lists for {}",
            active.len(),
            deleted.len(),
            owner_id
        );
        Ok((active, deleted))
    }
}

/// Convert a database row to ListRecord
fn row_to_list(row: &Row<'_>) -> DomainResult<ListRecord> {
    let id: String = row.get(0).map_err(store_err)?;
    let items: String = row.get(4).map_err(store_err)?;
    let created_at: i64 = row.get(5).map_err(store_err)?;
    let deleted_at: Option<i64> = row.get(6).map_err(store_err)?;

    Ok(ListRecord {
        id: Uuid::parse_str(&id).map_err(|e| DomainError::Store(format!("Bad list id {}: {}", id, e)))?,
        owner_id: row.get(1).map_err(store_err)?,
        title: row.get(2).map_err(store_err)?,
        slot: row.get(3).map_err(store_err)?,
        items: serde_json::from_str(&items)
            .map_err(|e| DomainError::Store(format!("Bad items for list {}: {}", id, e)))?,
        created_at: from_millis(created_at)?,
        deleted_at: deleted_at.map(from_millis).transpose()?,
        is_deleted: row.get(7).map_err(store_err)?,
    })
}

fn from_millis(ms: i64) -> DomainResult<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms)
        .ok_or_else(|| DomainError::Store(format!("Timestamp out of range: {}", ms)))
}
