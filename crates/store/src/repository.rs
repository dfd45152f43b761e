use std::sync::Arc;

use async_trait::async_trait;

use crate::Result;
use crate::entity::{Entity, TodoEntity};

/// Unit-of-work repository for one entity type.
///
/// Tracked reads and `add`/`update` register entities with the
/// repository's change tracker; nothing is written until `save_changes`.
/// `delete` is the exception and executes immediately.
#[async_trait]
pub trait Repository<E: Entity>: Send + Sync {
    /// Loads an entity and tracks it for later modification.
    async fn get_by_id(&self, id: E::Id) -> Result<Option<E>>;

    /// Loads an entity without tracking it.
    async fn get_by_id_no_tracking(&self, id: E::Id) -> Result<Option<E>>;

    /// Loads every entity and tracks them.
    async fn get_all(&self) -> Result<Vec<E>>;

    /// Loads every entity without tracking.
    async fn get_all_no_tracking(&self) -> Result<Vec<E>>;

    /// Registers an entity for insertion on the next save.
    async fn add(&self, entity: E) -> Result<E>;

    /// Registers several entities for insertion on the next save.
    async fn add_range(&self, entities: Vec<E>) -> Result<Vec<E>>;

    /// Records changes made to an entity so the next save writes them.
    async fn update(&self, entity: E) -> Result<E>;

    /// Deletes an entity immediately, returning the number of rows removed.
    async fn delete(&self, id: E::Id) -> Result<u64>;

    /// Runs save interceptors and writes every pending change.
    ///
    /// Returns the number of rows written.
    async fn save_changes(&self) -> Result<u64>;
}

/// Repository for to-do items.
#[async_trait]
pub trait TodoRepository: Repository<TodoEntity> {
    /// Loads every item, lowest priority value first, without tracking.
    async fn get_all_ordered_by_priority_no_tracking(&self) -> Result<Vec<TodoEntity>>;
}

#[async_trait]
impl<E: Entity, T: Repository<E> + ?Sized> Repository<E> for Arc<T> {
    async fn get_by_id(&self, id: E::Id) -> Result<Option<E>> {
        (**self).get_by_id(id).await
    }

    async fn get_by_id_no_tracking(&self, id: E::Id) -> Result<Option<E>> {
        (**self).get_by_id_no_tracking(id).await
    }

    async fn get_all(&self) -> Result<Vec<E>> {
        (**self).get_all().await
    }

    async fn get_all_no_tracking(&self) -> Result<Vec<E>> {
        (**self).get_all_no_tracking().await
    }

    async fn add(&self, entity: E) -> Result<E> {
        (**self).add(entity).await
    }

    async fn add_range(&self, entities: Vec<E>) -> Result<Vec<E>> {
        (**self).add_range(entities).await
    }

    async fn update(&self, entity: E) -> Result<E> {
        (**self).update(entity).await
    }

    async fn delete(&self, id: E::Id) -> Result<u64> {
        (**self).delete(id).await
    }

    async fn save_changes(&self) -> Result<u64> {
        (**self).save_changes().await
    }
}

#[async_trait]
impl<T: TodoRepository + ?Sized> TodoRepository for Arc<T> {
    async fn get_all_ordered_by_priority_no_tracking(&self) -> Result<Vec<TodoEntity>> {
        (**self).get_all_ordered_by_priority_no_tracking().await
    }
}
