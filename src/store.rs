//! Board State
//!
//! The client's copy of the board. A plain owned value: sessions hold one
//! each and pass it around explicitly, so several boards can live in one
//! process without sharing anything.

use dense_order::{position_of, reposition, sort_by_order, transfer};

use crate::error::ClientError;
use crate::models::{Column, Item};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardState {
    columns: Vec<Column>,
}

impl BoardState {
    /// Columns and cards are sorted by their order on the way in
    pub fn new(mut columns: Vec<Column>) -> Self {
        sort_by_order(&mut columns);
        for column in columns.iter_mut() {
            sort_by_order(&mut column.items);
        }
        Self { columns }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn into_columns(self) -> Vec<Column> {
        self.columns
    }

    pub fn column(&self, container_id: u32) -> Option<&Column> {
        self.columns.iter().find(|c| c.id() == container_id)
    }

    fn column_index(&self, container_id: u32) -> Option<usize> {
        position_of(&self.columns, container_id)
    }

    /// Container id and index of an item
    pub fn locate(&self, item_id: u32) -> Option<(u32, usize)> {
        self.columns.iter().find_map(|column| {
            position_of(&column.items, item_id).map(|index| (column.id(), index))
        })
    }

    pub fn item(&self, item_id: u32) -> Option<&Item> {
        self.columns
            .iter()
            .flat_map(|c| c.items.iter())
            .find(|i| i.id == item_id)
    }

    /// Move an item to `index` in `container_id`, renumbering every column
    /// it touched. Returns the clamped index it landed on.
    pub fn place_item(&mut self, item_id: u32, container_id: u32, index: i64) -> Result<usize, ClientError> {
        let (from_id, _) = self.locate(item_id).ok_or(ClientError::UnknownItem(item_id))?;
        let from = self
            .column_index(from_id)
            .ok_or(ClientError::UnknownContainer(from_id))?;
        let to = self
            .column_index(container_id)
            .ok_or(ClientError::UnknownContainer(container_id))?;

        if from == to {
            return reposition(&mut self.columns[to].items, item_id, index)
                .ok_or(ClientError::UnknownItem(item_id));
        }

        let mut source = std::mem::take(&mut self.columns[from].items);
        let landed = transfer(&mut source, &mut self.columns[to].items, item_id, index);
        self.columns[from].items = source;

        let landed = landed.ok_or(ClientError::UnknownItem(item_id))?;
        self.columns[to].items[landed].container_id = container_id;
        Ok(landed)
    }

    /// Move a column to `index` on the board
    pub fn place_column(&mut self, container_id: u32, index: i64) -> Result<usize, ClientError> {
        reposition(&mut self.columns, container_id, index).ok_or(ClientError::UnknownContainer(container_id))
    }

    /// Whether the board and every column hold exactly 0..n-1
    pub fn is_dense(&self) -> bool {
        dense_order::is_dense(self.columns.iter().map(|c| c.container.order))
            && self
                .columns
                .iter()
                .all(|c| dense_order::is_dense(c.items.iter().map(|i| i.order)))
    }
}
