//! Database Connection and Setup
//!
//! Manages the SQLite connection, pragmas and migrations, and maps SQLite
//! failures onto domain errors.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use rusqlite::{Connection, ErrorCode};
use tokio::sync::Mutex;

use crate::domain::DomainError;

/// Database state wrapper
///
/// Cloning shares the connection. Calls through one `DbState` are
/// serialized by its mutex; separate `DbState`s on the same file contend
/// through SQLite's own locking.
#[derive(Clone)]
pub struct DbState {
    conn: Arc<Mutex<Connection>>,
}

impl DbState {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Shared handle to the connection
    pub fn connection(&self) -> Arc<Mutex<Connection>> {
        self.conn.clone()
    }
}

impl From<rusqlite::Error> for DomainError {
    fn from(e: rusqlite::Error) -> Self {
        match e.sqlite_error_code() {
            Some(ErrorCode::DatabaseBusy) | Some(ErrorCode::DatabaseLocked) => {
                DomainError::TransactionConflict(e.to_string())
            }
            _ => DomainError::Internal(e.to_string()),
        }
    }
}

/// Milliseconds since the epoch, used for created_at/updated_at
pub(crate) fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Rowid of the last insert on `conn`, as an entity id
pub(crate) fn inserted_id(conn: &Connection) -> Result<u32, DomainError> {
    let rowid = conn.last_insert_rowid();
    u32::try_from(rowid).map_err(|_| DomainError::Internal(format!("row id {} out of range", rowid)))
}

/// Initialize database with path
pub async fn init_db(db_path: &Path, busy_timeout: Duration) -> Result<DbState, DomainError> {
    let conn = Connection::open(db_path)?;
    conn.busy_timeout(busy_timeout)?;
    conn.pragma_update(None, "foreign_keys", "ON")?;

    if db_path != Path::new(":memory:") {
        let mode: String = conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
        log::debug!("journal mode for {}: {}", db_path.display(), mode);
    }

    run_migrations(&conn)?;
    log::info!("database ready at {}", db_path.display());

    Ok(DbState::new(conn))
}

/// Check if a column exists in a table
fn column_exists(conn: &Connection, table: &str, column: &str) -> Result<bool, DomainError> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Run database migrations
fn run_migrations(conn: &Connection) -> Result<(), DomainError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS containers (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            position INTEGER NOT NULL DEFAULT 0,
            created_at INTEGER,
            updated_at INTEGER
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            container_id INTEGER NOT NULL REFERENCES containers(id) ON DELETE CASCADE,
            title TEXT NOT NULL,
            position INTEGER NOT NULL DEFAULT 0,
            created_at INTEGER,
            updated_at INTEGER
        )",
        [],
    )?;

    // Descriptions were added after the first schema
    if !column_exists(conn, "items", "content")? {
        conn.execute("ALTER TABLE items ADD COLUMN content TEXT", [])?;
    }

    // No UNIQUE on (container_id, position): shifting passes through duplicates
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_items_container ON items(container_id, position)",
        [],
    )?;

    Ok(())
}
