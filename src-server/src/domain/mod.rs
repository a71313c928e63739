//! Domain Layer
//!
//! Contains all domain entities and core abstractions.
//! This layer has no storage dependencies; only serde, thiserror and the
//! shared ordering primitives.

mod entity;
mod container;
mod item;

pub use entity::{Entity, DomainError, DomainResult};
pub use container::{BoardColumn, Container};
pub use item::Item;
