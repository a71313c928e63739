//! Reorder Service
//!
//! The only writer of `order` and `container_id`. Every call reads current
//! state, computes the new dense ordering and commits it in one IMMEDIATE
//! transaction. Conflicts with other connections surface as
//! `DomainError::TransactionConflict`; nothing is retried here.

use rusqlite::{Connection, TransactionBehavior};

use dense_order::clamp_index;

use crate::domain::{Container, DomainError, DomainResult, Item};
use crate::repository::positioning::{
    close_gap, compact_items, count_items, open_gap, place_item, write_container_orders,
    write_item_orders,
};
use crate::repository::{
    container_exists, containers_on_board, fetch_container, fetch_item, items_in_container,
    now_millis, DbState,
};

/// Validated item move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveItem {
    pub item_id: u32,
    /// Hint only; the item's stored container is authoritative
    pub source_container_id: Option<u32>,
    pub target_container_id: u32,
    /// Any integer; clamped against the target container
    pub target_index: i64,
}

/// Validated container move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveContainer {
    pub container_id: u32,
    pub target_index: i64,
}

/// Stateless per call: all consistency comes from the store's transaction
#[derive(Clone)]
pub struct ReorderService {
    db: DbState,
}

impl ReorderService {
    pub fn new(db: DbState) -> Self {
        Self { db }
    }

    /// Move an item within its container or into another one
    pub async fn move_item(&self, cmd: &MoveItem) -> DomainResult<Item> {
        let conn = self.db.connection();
        let mut conn = conn.lock().await;
        apply_move_item(&mut conn, cmd).map_err(|e| log_failure("item", cmd.item_id, e))
    }

    /// Move a container to a new board position
    pub async fn move_container(&self, cmd: &MoveContainer) -> DomainResult<Container> {
        let conn = self.db.connection();
        let mut conn = conn.lock().await;
        apply_move_container(&mut conn, cmd).map_err(|e| log_failure("container", cmd.container_id, e))
    }
}

fn log_failure(what: &str, id: u32, err: DomainError) -> DomainError {
    match &err {
        DomainError::TransactionConflict(msg) => log::warn!("move {} {} conflicted: {}", what, id, msg),
        DomainError::Internal(msg) => log::error!("move {} {} failed: {}", what, id, msg),
        _ => log::debug!("move {} {} rejected: {}", what, id, err),
    }
    err
}

fn apply_move_item(conn: &mut Connection, cmd: &MoveItem) -> DomainResult<Item> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let item = fetch_item(&tx, cmd.item_id)?.ok_or_else(|| DomainError::item_not_found(cmd.item_id))?;
    let target = cmd.target_container_id;
    if !container_exists(&tx, target)? {
        return Err(DomainError::container_not_found(target));
    }

    let source = item.container_id;
    if let Some(claimed) = cmd.source_container_id.filter(|claimed| *claimed != source) {
        log::debug!(
            "item {}: client claimed source {} but it lives in {}; using {}",
            item.id, claimed, source, source
        );
    }

    let now = now_millis();
    let index = if source == target {
        // Rewrite the whole sequence: remove, clamp, insert, renumber
        let mut siblings = items_in_container(&tx, source)?;
        let bounded = clamp_index(cmd.target_index, siblings.len());
        let index = dense_order::reposition(&mut siblings, item.id, bounded as i64)
            .ok_or_else(|| DomainError::Internal(format!("item {} missing from its container", item.id)))?;
        write_item_orders(&tx, &siblings, now)?;
        index
    } else {
        // Gaps from deletions would break the shift arithmetic below
        compact_items(&tx, source, now)?;
        compact_items(&tx, target, now)?;
        let old_order = fetch_item(&tx, item.id)?
            .map(|current| current.order)
            .ok_or_else(|| DomainError::item_not_found(item.id))?;

        let bounded = clamp_index(cmd.target_index, count_items(&tx, target)?);
        close_gap(&tx, source, old_order, now)?;
        open_gap(&tx, target, bounded as i32, now)?;
        place_item(&tx, item.id, target, bounded as i32, now)?;
        bounded
    };

    let updated = fetch_item(&tx, item.id)?.ok_or_else(|| DomainError::item_not_found(item.id))?;
    tx.commit()?;

    log::debug!(
        "moved item {} from container {} to container {} at {} (requested {})",
        item.id, source, target, index, cmd.target_index
    );
    Ok(updated)
}

fn apply_move_container(conn: &mut Connection, cmd: &MoveContainer) -> DomainResult<Container> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    if fetch_container(&tx, cmd.container_id)?.is_none() {
        return Err(DomainError::container_not_found(cmd.container_id));
    }

    let mut containers = containers_on_board(&tx)?;
    let bounded = clamp_index(cmd.target_index, containers.len());
    let index = dense_order::reposition(&mut containers, cmd.container_id, bounded as i64)
        .ok_or_else(|| DomainError::container_not_found(cmd.container_id))?;
    write_container_orders(&tx, &containers, now_millis())?;

    let updated = fetch_container(&tx, cmd.container_id)?
        .ok_or_else(|| DomainError::container_not_found(cmd.container_id))?;
    tx.commit()?;

    log::debug!(
        "moved container {} to {} (requested {})",
        cmd.container_id, index, cmd.target_index
    );
    Ok(updated)
}
