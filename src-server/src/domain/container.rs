//! Container Entity
//!
//! A board column. Containers never nest; the board is the implicit parent
//! of all containers and their `order` is dense across the board.

use dense_order::Ordered;
use serde::{Deserialize, Serialize};
use super::entity::{DomainError, Entity};
use super::item::Item;

/// A column on the board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Container {
    pub id: u32,
    pub name: String,
    /// Position on the board, dense 0..n-1
    pub order: i32,
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
}

impl Container {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            order: 0,
            created_at: None,
            updated_at: None,
        }
    }
}

impl Entity for Container {
    type Id = u32;

    fn id(&self) -> Self::Id {
        self.id
    }

    fn not_found(id: u32) -> DomainError {
        DomainError::container_not_found(id)
    }
}

impl Ordered for Container {
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

/// A container together with its items, ordered by `order`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardColumn {
    #[serde(flatten)]
    pub container: Container,
    pub items: Vec<Item>,
}
