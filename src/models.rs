//! Frontend Models
//!
//! Data structures matching backend entities. Timestamps the server sends
//! are ignored; the board only needs identity, payload and order.

use dense_order::Ordered;
use serde::{Deserialize, Serialize};

/// Card (matches backend)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: u32,
    pub container_id: u32,
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
    pub order: i32,
}

/// Column header (matches backend)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Container {
    pub id: u32,
    pub name: String,
    pub order: i32,
}

/// Column with its cards, as returned by `board.load`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    #[serde(flatten)]
    pub container: Container,
    #[serde(default)]
    pub items: Vec<Item>,
}

impl Column {
    pub fn id(&self) -> u32 {
        self.container.id
    }

    pub fn item_ids(&self) -> Vec<u32> {
        self.items.iter().map(|i| i.id).collect()
    }
}

impl Ordered for Item {
    type Key = u32;

    fn key(&self) -> u32 {
        self.id
    }

    fn order(&self) -> i32 {
        self.order
    }

    fn set_order(&mut self, order: i32) {
        self.order = order;
    }
}

impl Ordered for Column {
    type Key = u32;

    fn key(&self) -> u32 {
        self.container.id
    }

    fn order(&self) -> i32 {
        self.container.order
    }

    fn set_order(&mut self, order: i32) {
        self.container.order = order;
    }
}
