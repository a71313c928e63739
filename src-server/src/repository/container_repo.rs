//! Container Repository Implementation
//!
//! SQLite-backed implementation of Repository<Container> and the board read.

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::{BoardColumn, Container, DomainError, DomainResult, Item};
use super::db::{inserted_id, now_millis};
use super::item_repo::fetch_all_items;
use super::traits::Repository;

const CONTAINER_COLUMNS: &str = "id, name, position, created_at, updated_at";

/// SQLite implementation of Container repository
pub struct ContainerRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ContainerRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// Every container by order, each with its items by order
    pub async fn board(&self) -> DomainResult<Vec<BoardColumn>> {
        let conn = self.conn.lock().await;
        let containers = containers_on_board(&conn)?;

        let mut by_container: HashMap<u32, Vec<Item>> = HashMap::new();
        for item in fetch_all_items(&conn)? {
            by_container.entry(item.container_id).or_default().push(item);
        }

        Ok(containers
            .into_iter()
            .map(|container| BoardColumn {
                items: by_container.remove(&container.id).unwrap_or_default(),
                container,
            })
            .collect())
    }
}

#[async_trait]
impl Repository<Container> for ContainerRepository {
    async fn create(&self, entity: &Container) -> DomainResult<Container> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let position: i32 = tx.query_row(
            "SELECT COALESCE(MAX(position), -1) + 1 FROM containers",
            [],
            |row| row.get(0),
        )?;
        let now = now_millis();
        tx.execute(
            "INSERT INTO containers (name, position, created_at, updated_at) VALUES (?, ?, ?, ?)",
            params![entity.name, position, now, now],
        )?;
        let id = inserted_id(&tx)?;
        tx.commit()?;

        let mut container = entity.clone();
        container.id = id;
        container.order = position;
        container.created_at = Some(now);
        container.updated_at = Some(now);
        Ok(container)
    }

    async fn find_by_id(&self, id: u32) -> DomainResult<Option<Container>> {
        let conn = self.conn.lock().await;
        fetch_container(&conn, id)
    }

    async fn list(&self) -> DomainResult<Vec<Container>> {
        let conn = self.conn.lock().await;
        containers_on_board(&conn)
    }

    async fn update(&self, entity: &Container) -> DomainResult<Container> {
        let conn = self.conn.lock().await;
        let changed = conn.execute(
            "UPDATE containers SET name = ?, updated_at = ? WHERE id = ?",
            params![entity.name, now_millis(), entity.id],
        )?;
        if changed == 0 {
            return Err(DomainError::container_not_found(entity.id));
        }
        fetch_container(&conn, entity.id)?.ok_or_else(|| DomainError::container_not_found(entity.id))
    }

    async fn delete(&self, id: u32) -> DomainResult<()> {
        let conn = self.conn.lock().await;
        // Items go with it (ON DELETE CASCADE); the board keeps a gap
        let deleted = conn.execute("DELETE FROM containers WHERE id = ?", params![id])?;
        if deleted == 0 {
            return Err(DomainError::container_not_found(id));
        }
        Ok(())
    }
}

pub(crate) fn container_exists(conn: &Connection, id: u32) -> DomainResult<bool> {
    let found = conn
        .query_row("SELECT 1 FROM containers WHERE id = ?", params![id], |_| Ok(()))
        .optional()?;
    Ok(found.is_some())
}

pub(crate) fn fetch_container(conn: &Connection, id: u32) -> DomainResult<Option<Container>> {
    let container = conn
        .query_row(
            &format!("SELECT {} FROM containers WHERE id = ?", CONTAINER_COLUMNS),
            params![id],
            row_to_container,
        )
        .optional()?;
    Ok(container)
}

/// All containers ordered by position (ties by id)
pub(crate) fn containers_on_board(conn: &Connection) -> DomainResult<Vec<Container>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM containers ORDER BY position, id",
        CONTAINER_COLUMNS
    ))?;
    let containers = stmt
        .query_map([], row_to_container)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(containers)
}

fn row_to_container(row: &Row<'_>) -> rusqlite::Result<Container> {
    Ok(Container {
        id: row.get(0)?,
        name: row.get(1)?,
        order: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}
