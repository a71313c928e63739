//! Repository Layer - Core Traits

use async_trait::async_trait;
use crate::domain::{DomainResult, Entity};

/// Basic storage of board entities.
///
/// `create` appends at the end of the siblings and `update` only touches
/// payload fields; ordering belongs to the reorder service. `update` and
/// `delete` report `NotFound` for missing rows.
#[async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    async fn create(&self, entity: &T) -> DomainResult<T>;

    async fn find_by_id(&self, id: T::Id) -> DomainResult<Option<T>>;

    /// Like `find_by_id`, but absence is an error
    async fn get(&self, id: T::Id) -> DomainResult<T> {
        self.find_by_id(id).await?.ok_or_else(|| T::not_found(id))
    }

    /// Everything, in board order
    async fn list(&self) -> DomainResult<Vec<T>>;

    async fn update(&self, entity: &T) -> DomainResult<T>;

    async fn delete(&self, id: T::Id) -> DomainResult<()>;
}
