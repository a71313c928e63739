//! Position Operations
//!
//! Statement-level helpers for the ordering columns. They run on whatever
//! connection or transaction they are handed and never open their own, so
//! the reorder service can compose them inside one atomic transaction.

use rusqlite::{params, Connection};

use crate::domain::{Container, DomainResult, Item};
use super::item_repo::items_in_container;

/// Number of items currently in a container
pub(crate) fn count_items(conn: &Connection, container_id: u32) -> DomainResult<usize> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM items WHERE container_id = ?",
        params![container_id],
        |row| row.get(0),
    )?;
    Ok(count as usize)
}

/// Persist each item's `order` as its position; unchanged rows are skipped
pub(crate) fn write_item_orders(conn: &Connection, items: &[Item], now: i64) -> DomainResult<usize> {
    let mut stmt = conn.prepare(
        "UPDATE items SET position = ?1, updated_at = ?2 WHERE id = ?3 AND position <> ?1",
    )?;
    let mut written = 0;
    for item in items {
        written += stmt.execute(params![item.order, now, item.id])?;
    }
    Ok(written)
}

/// Persist each container's `order` as its board position
pub(crate) fn write_container_orders(
    conn: &Connection,
    containers: &[Container],
    now: i64,
) -> DomainResult<usize> {
    let mut stmt = conn.prepare(
        "UPDATE containers SET position = ?1, updated_at = ?2 WHERE id = ?3 AND position <> ?1",
    )?;
    let mut written = 0;
    for container in containers {
        written += stmt.execute(params![container.order, now, container.id])?;
    }
    Ok(written)
}

/// Rewrite a container to 0..n-1 if deletions left gaps. No-op when dense.
pub(crate) fn compact_items(conn: &Connection, container_id: u32, now: i64) -> DomainResult<usize> {
    let mut items = items_in_container(conn, container_id)?;
    if dense_order::renumber(&mut items) == 0 {
        return Ok(0);
    }
    let written = write_item_orders(conn, &items, now)?;
    log::debug!("compacted container {}: {} rows rewritten", container_id, written);
    Ok(written)
}

/// Close the gap left by a departing item: shift later siblings up by one
pub(crate) fn close_gap(conn: &Connection, container_id: u32, after: i32, now: i64) -> DomainResult<usize> {
    let shifted = conn.execute(
        "UPDATE items SET position = position - 1, updated_at = ? WHERE container_id = ? AND position > ?",
        params![now, container_id, after],
    )?;
    Ok(shifted)
}

/// Open a slot at `from`: shift that sibling and all later ones down by one
pub(crate) fn open_gap(conn: &Connection, container_id: u32, from: i32, now: i64) -> DomainResult<usize> {
    let shifted = conn.execute(
        "UPDATE items SET position = position + 1, updated_at = ? WHERE container_id = ? AND position >= ?",
        params![now, container_id, from],
    )?;
    Ok(shifted)
}

/// Put an item into a container at a position
pub(crate) fn place_item(
    conn: &Connection,
    item_id: u32,
    container_id: u32,
    position: i32,
    now: i64,
) -> DomainResult<()> {
    conn.execute(
        "UPDATE items SET container_id = ?, position = ?, updated_at = ? WHERE id = ?",
        params![container_id, position, now, item_id],
    )?;
    Ok(())
}
