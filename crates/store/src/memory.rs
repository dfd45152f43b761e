use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};

use crate::{
    ChangeTracker, EntityState, Result, StoreError, TodoEntity, TodoId,
    audit::SaveChangesInterceptor,
    entity::{Auditable, Entity},
    repository::{Repository, TodoRepository},
};

type Rows = Arc<RwLock<HashMap<TodoId, TodoEntity>>>;

/// In-memory to-do storage shared by all request sessions.
///
/// Used for local development and tests; provides the same repository
/// behavior as the PostgreSQL implementation.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    rows: Rows,
}

impl InMemoryStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a unit of work against this store.
    pub fn session(&self) -> InMemoryTodoRepository {
        InMemoryTodoRepository {
            rows: self.rows.clone(),
            tracker: Mutex::new(ChangeTracker::new()),
            interceptors: Vec::new(),
        }
    }

    /// Returns the number of stored items.
    pub async fn count(&self) -> usize {
        self.rows.read().await.len()
    }

    /// Returns a stored item without going through a session.
    pub async fn find(&self, id: TodoId) -> Option<TodoEntity> {
        self.rows.read().await.get(&id).cloned()
    }

    /// Removes every stored item.
    pub async fn clear(&self) {
        self.rows.write().await.clear();
    }
}

/// A unit of work over an [`InMemoryStore`].
pub struct InMemoryTodoRepository {
    rows: Rows,
    tracker: Mutex<ChangeTracker<TodoEntity>>,
    interceptors: Vec<Arc<dyn SaveChangesInterceptor<TodoEntity>>>,
}

impl InMemoryTodoRepository {
    /// Registers an interceptor run before every save.
    pub fn with_interceptor(
        mut self,
        interceptor: impl SaveChangesInterceptor<TodoEntity> + 'static,
    ) -> Self {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    async fn snapshot(&self) -> Vec<TodoEntity> {
        self.rows.read().await.values().cloned().collect()
    }
}

#[async_trait]
impl Repository<TodoEntity> for InMemoryTodoRepository {
    async fn get_by_id(&self, id: TodoId) -> Result<Option<TodoEntity>> {
        let mut tracker = self.tracker.lock().await;
        if let Some(tracked) = tracker.find(id) {
            return Ok(Some(tracked.clone()));
        }
        let row = self.rows.read().await.get(&id).cloned();
        Ok(row.map(|entity| tracker.track_unchanged(entity)))
    }

    async fn get_by_id_no_tracking(&self, id: TodoId) -> Result<Option<TodoEntity>> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn get_all(&self) -> Result<Vec<TodoEntity>> {
        let rows = self.snapshot().await;
        let mut tracker = self.tracker.lock().await;
        Ok(rows
            .into_iter()
            .map(|entity| tracker.track_unchanged(entity))
            .collect())
    }

    async fn get_all_no_tracking(&self) -> Result<Vec<TodoEntity>> {
        Ok(self.snapshot().await)
    }

    async fn add(&self, entity: TodoEntity) -> Result<TodoEntity> {
        self.tracker.lock().await.track_added(entity.clone());
        Ok(entity)
    }

    async fn add_range(&self, entities: Vec<TodoEntity>) -> Result<Vec<TodoEntity>> {
        let mut tracker = self.tracker.lock().await;
        for entity in &entities {
            tracker.track_added(entity.clone());
        }
        Ok(entities)
    }

    async fn update(&self, entity: TodoEntity) -> Result<TodoEntity> {
        self.tracker.lock().await.mark_modified(entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: TodoId) -> Result<u64> {
        self.tracker.lock().await.detach(id);
        let removed = self.rows.write().await.remove(&id);
        Ok(u64::from(removed.is_some()))
    }

    async fn save_changes(&self) -> Result<u64> {
        let mut tracker = self.tracker.lock().await;
        if !tracker.has_changes() {
            return Ok(0);
        }

        for interceptor in &self.interceptors {
            interceptor.saving_changes(&mut tracker);
        }

        let mut rows = self.rows.write().await;

        // Reject the whole batch before writing anything
        if let Some(duplicate) = tracker
            .pending()
            .find(|e| e.state() == EntityState::Added && rows.contains_key(&e.entity().id()))
        {
            return Err(StoreError::DuplicateKey(duplicate.entity().id().to_string()));
        }

        let mut affected = 0;
        for entry in tracker.pending() {
            let entity = entry.entity();
            match entry.state() {
                EntityState::Added => {
                    rows.insert(entity.id(), entity.clone());
                    affected += 1;
                }
                EntityState::Modified | EntityState::Unchanged => {
                    if let Some(row) = rows.get_mut(&entity.id()) {
                        *row = entity.clone();
                        affected += 1;
                    }
                }
            }
        }
        drop(rows);

        tracker.accept_all_changes();
        Ok(affected)
    }
}

#[async_trait]
impl TodoRepository for InMemoryTodoRepository {
    async fn get_all_ordered_by_priority_no_tracking(&self) -> Result<Vec<TodoEntity>> {
        let mut items = self.snapshot().await;
        items.sort_by(|a, b| {
            a.priority
                .cmp(&b.priority)
                .then(a.audit().created.cmp(&b.audit().created))
                .then(a.id().as_uuid().cmp(&b.id().as_uuid()))
        });
        Ok(items)
    }
}
