//! Domain Layer - Core Entity Trait
//!
//! This trait defines the basic contract for all domain entities.
//! All entities must have a unique ID and be thread-safe.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Core trait for all domain entities
pub trait Entity: Sized + Send + Sync + Clone {
    /// The type of the entity's unique identifier
    type Id: Copy + Eq + std::hash::Hash + Send + Sync + 'static;

    /// Returns the entity's unique identifier
    fn id(&self) -> Self::Id;

    /// Error for a lookup of `id` that found nothing
    fn not_found(id: Self::Id) -> DomainError;
}

/// Common result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level errors
///
/// Serialized as `{"kind": .., "message": ..}` so the same value reaches the
/// client unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message", rename_all = "camelCase")]
pub enum DomainError {
    /// Item or container absent; raised before any mutation
    #[error("Not found: {0}")]
    NotFound(String),
    /// Malformed ids or index; raised before the store is touched
    #[error("Invalid input: {0}")]
    Validation(String),
    /// The store could not serialize against a concurrent move
    #[error("Transaction conflict: {0}")]
    TransactionConflict(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    /// Only conflicts are worth retrying; the service itself never does
    pub fn is_retryable(&self) -> bool {
        matches!(self, DomainError::TransactionConflict(_))
    }

    pub fn item_not_found(id: u32) -> Self {
        DomainError::NotFound(format!("Item {} not found", id))
    }

    pub fn container_not_found(id: u32) -> Self {
        DomainError::NotFound(format!("Container {} not found", id))
    }
}
