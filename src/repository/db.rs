//! Database Connection and Setup
//!
//! Manages the SQLite connection and migrations.

use rusqlite::Connection;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::{DomainError, DomainResult};

/// Shared, lazily initialized connection
pub type SharedConnection = Arc<Mutex<Option<Connection>>>;

/// Database state wrapper
#[derive(Clone, Default)]
pub struct DbState {
    pub conn: SharedConnection,
}

impl DbState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle for repositories; they fail with "Database not initialized" until a connection is set
    pub fn connection(&self) -> SharedConnection {
        Arc::clone(&self.conn)
    }
}

/// Open the database at `db_path` (`:memory:` for a private in-memory one) and migrate it
pub async fn init_db(db_path: &Path) -> DomainResult<DbState> {
    let conn = if db_path == Path::new(":memory:") {
        Connection::open_in_memory()
    } else {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| DomainError::Store(format!("Failed to create {}: {}", parent.display(), e)))?;
        }
        Connection::open(db_path)
    }
    .map_err(|e| DomainError::Store(format!("Failed to open db: {}", e)))?;

    run_migrations(&conn)?;
    log::info!("database ready at {}", db_path.display());

    let state = DbState::new();
    *state.conn.lock().await = Some(conn);
    Ok(state)
}

/// Check if a column exists in a table
fn column_exists(conn: &Connection, table: &str, column: &str) -> bool {
    let query = format!("PRAGMA table_info({})", table);
    let Ok(mut stmt) = conn.prepare(&query) else {
        return false;
    };
    let Ok(mut rows) = stmt.query([]) else {
        return false;
    };
    while let Ok(Some(row)) = rows.next() {
        if let Ok(name) = row.get::<_, String>(1) {
            if name == column {
                return true;
            }
        }
    }
    false
}

/// Run database migrations
fn run_migrations(conn: &Connection) -> DomainResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS lists (
            id TEXT PRIMARY KEY,
            owner_id TEXT NOT NULL,
            title TEXT NOT NULL,
            slot INTEGER NOT NULL DEFAULT 0,
            items TEXT NOT NULL DEFAULT '[]',
            created_at INTEGER NOT NULL,
            is_deleted INTEGER NOT NULL DEFAULT 0
        )",
        [],
    )
    .map_err(|e| DomainError::Store(e.to_string()))?;

    // Columns added after the first schema
    if !column_exists(conn, "lists", "deleted_at") {
        conn.execute("ALTER TABLE lists ADD COLUMN deleted_at INTEGER", [])
            .map_err(|e| DomainError::Store(format!("Failed to add deleted_at: {}", e)))?;
    }

    if !column_exists(conn, "lists", "seq") {
        conn.execute("ALTER TABLE lists ADD COLUMN seq INTEGER NOT NULL DEFAULT 0", [])
            .map_err(|e| DomainError::Store(format!("Failed to add seq: {}", e)))?;
    }

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_lists_owner ON lists(owner_id, is_deleted, seq)",
        [],
    )
    .map_err(|e| DomainError::Store(e.to_string()))?;

    Ok(())
}
