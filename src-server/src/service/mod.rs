//! Service Layer
//!
//! Transactional operations composed from repository statements.

mod reorder;

pub use reorder::{MoveContainer, MoveItem, ReorderService};
