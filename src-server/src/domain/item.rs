//! Item Entity
//!
//! A card inside exactly one container. Only the move operation changes
//! `container_id` and `order`; title and content are opaque payload.

use dense_order::Ordered;
use serde::{Deserialize, Serialize};
use super::entity::{DomainError, Entity};

/// A card on the board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Unique identifier
    pub id: u32,
    /// Owning container
    pub container_id: u32,
    pub title: String,
    /// Optional description (plain text)
    pub content: Option<String>,
    /// Position within siblings, dense 0..n-1
    pub order: i32,
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
}

impl Item {
    /// Create a new item; id and order are assigned on insert
    pub fn new(container_id: u32, title: impl Into<String>) -> Self {
        Self {
            id: 0,
            container_id,
            title: title.into(),
            content: None,
            order: 0,
            created_at: None,
            updated_at: None,
        }
    }
}

impl Entity for Item {
    type Id = u32;

    fn id(&self) -> Self::Id {
        self.id
    }

    fn not_found(id: u32) -> DomainError {
        DomainError::item_not_found(id)
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
