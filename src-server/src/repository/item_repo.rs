//! Item Repository Implementation
//!
//! SQLite-backed implementation of Repository<Item>, plus the row-level
//! reads the reorder service runs inside its transactions.

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::{DomainError, DomainResult, Item};
use super::container_repo::container_exists;
use super::db::{inserted_id, now_millis};
use super::traits::Repository;

const ITEM_COLUMNS: &str = "id, container_id, title, content, position, created_at, updated_at";

/// SQLite implementation of Item repository
pub struct ItemRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ItemRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// Items of one container, ordered by position
    pub async fn list_by_container(&self, container_id: u32) -> DomainResult<Vec<Item>> {
        let conn = self.conn.lock().await;
        items_in_container(&conn, container_id)
    }
}

#[async_trait]
impl Repository<Item> for ItemRepository {
    async fn create(&self, entity: &Item) -> DomainResult<Item> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        if !container_exists(&tx, entity.container_id)? {
            return Err(DomainError::container_not_found(entity.container_id));
        }

        // Append: equals the sibling count while the container is dense
        let position: i32 = tx.query_row(
            "SELECT COALESCE(MAX(position), -1) + 1 FROM items WHERE container_id = ?",
            params![entity.container_id],
            |row| row.get(0),
        )?;

        let now = now_millis();
        tx.execute(
            "INSERT INTO items (container_id, title, content, position, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
            params![entity.container_id, entity.title, entity.content, position, now, now],
        )?;
        let id = inserted_id(&tx)?;
        tx.commit()?;

        let mut item = entity.clone();
        item.id = id;
        item.order = position;
        item.created_at = Some(now);
        item.updated_at = Some(now);
        Ok(item)
    }

    async fn find_by_id(&self, id: u32) -> DomainResult<Option<Item>> {
        let conn = self.conn.lock().await;
        fetch_item(&conn, id)
    }

    async fn list(&self) -> DomainResult<Vec<Item>> {
        let conn = self.conn.lock().await;
        fetch_all_items(&conn)
    }

    async fn update(&self, entity: &Item) -> DomainResult<Item> {
        let conn = self.conn.lock().await;

        // Payload only: container_id and position belong to the move operation
        let changed = conn.execute(
            "UPDATE items SET title = ?, content = ?, updated_at = ? WHERE id = ?",
            params![entity.title, entity.content, now_millis(), entity.id],
        )?;
        if changed == 0 {
            return Err(DomainError::item_not_found(entity.id));
        }

        fetch_item(&conn, entity.id)?.ok_or_else(|| DomainError::item_not_found(entity.id))
    }

    async fn delete(&self, id: u32) -> DomainResult<()> {
        let conn = self.conn.lock().await;

        // Leaves a gap in the container; the next move through it closes it
        let deleted = conn.execute("DELETE FROM items WHERE id = ?", params![id])?;
        if deleted == 0 {
            return Err(DomainError::item_not_found(id));
        }
        Ok(())
    }
}

/// Read one item
pub(crate) fn fetch_item(conn: &Connection, id: u32) -> DomainResult<Option<Item>> {
    let item = conn
        .query_row(
            &format!("SELECT {} FROM items WHERE id = ?", ITEM_COLUMNS),
            params![id],
            row_to_item,
        )
        .optional()?;
    Ok(item)
}

/// Every item, grouped by container and ordered by position
pub(crate) fn fetch_all_items(conn: &Connection) -> DomainResult<Vec<Item>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM items ORDER BY container_id, position, id",
        ITEM_COLUMNS
    ))?;
    let items = stmt
        .query_map([], row_to_item)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(items)
}

/// All items of a container, ordered by position (ties by id)
pub(crate) fn items_in_container(conn: &Connection, container_id: u32) -> DomainResult<Vec<Item>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM items WHERE container_id = ? ORDER BY position, id",
        ITEM_COLUMNS
    ))?;
    let items = stmt
        .query_map(params![container_id], row_to_item)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(items)
}

/// Convert a database row to Item
fn row_to_item(row: &Row<'_>) -> rusqlite::Result<Item> {
    Ok(Item {
        id: row.get(0)?,
        container_id: row.get(1)?,
        title: row.get(2)?,
        content: row.get(3)?,
        order: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}
