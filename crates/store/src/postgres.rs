use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    AuditStamp, ChangeTracker, EntityState, Result, StoreError, TodoEntity, TodoId,
    audit::SaveChangesInterceptor,
    entity::{Auditable, Entity},
    repository::{Repository, TodoRepository},
};

const SELECT_COLUMNS: &str = "SELECT id, title, note, priority, reminder, created, created_by, \
     last_modified, last_modified_by FROM todo_items";

/// PostgreSQL-backed to-do storage.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new PostgreSQL store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    /// Opens a unit of work against this store.
    pub fn session(&self) -> PostgresTodoRepository {
        PostgresTodoRepository {
            pool: self.pool.clone(),
            tracker: Mutex::new(ChangeTracker::new()),
            interceptors: Vec::new(),
        }
    }
}

/// A unit of work over a [`PostgresStore`].
///
/// Pending changes are written in a single transaction by `save_changes`.
pub struct PostgresTodoRepository {
    pool: PgPool,
    tracker: Mutex<ChangeTracker<TodoEntity>>,
    interceptors: Vec<Arc<dyn SaveChangesInterceptor<TodoEntity>>>,
}

impl PostgresTodoRepository {
    /// Registers an interceptor run before every save.
    pub fn with_interceptor(
        mut self,
        interceptor: impl SaveChangesInterceptor<TodoEntity> + 'static,
    ) -> Self {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    fn row_to_entity(row: PgRow) -> Result<TodoEntity> {
        Ok(TodoEntity::from_parts(
            TodoId::from_uuid(row.try_get::<Uuid, _>("id")?),
            row.try_get("title")?,
            row.try_get("note")?,
            row.try_get("priority")?,
            row.try_get("reminder")?,
            AuditStamp {
                created: row.try_get("created")?,
                created_by: row.try_get("created_by")?,
                last_modified: row.try_get("last_modified")?,
                last_modified_by: row.try_get("last_modified_by")?,
            },
        ))
    }

    async fn fetch_one(&self, id: TodoId) -> Result<Option<TodoEntity>> {
        let row: Option<PgRow> = sqlx::query(&format!("{SELECT_COLUMNS} WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_entity).transpose()
    }

    async fn fetch_all(&self, order_by: &str) -> Result<Vec<TodoEntity>> {
        let rows = sqlx::query(&format!("{SELECT_COLUMNS} ORDER BY {order_by}"))
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Self::row_to_entity).collect()
    }
}

#[async_trait]
impl Repository<TodoEntity> for PostgresTodoRepository {
    async fn get_by_id(&self, id: TodoId) -> Result<Option<TodoEntity>> {
        if let Some(tracked) = self.tracker.lock().await.find(id) {
            return Ok(Some(tracked.clone()));
        }
        let row = self.fetch_one(id).await?;
        let mut tracker = self.tracker.lock().await;
        Ok(row.map(|entity| tracker.track_unchanged(entity)))
    }

    async fn get_by_id_no_tracking(&self, id: TodoId) -> Result<Option<TodoEntity>> {
        self.fetch_one(id).await
    }

    async fn get_all(&self) -> Result<Vec<TodoEntity>> {
        let rows = self.fetch_all("id ASC").await?;
        let mut tracker = self.tracker.lock().await;
        Ok(rows
            .into_iter()
            .map(|entity| tracker.track_unchanged(entity))
            .collect())
    }

    async fn get_all_no_tracking(&self) -> Result<Vec<TodoEntity>> {
        self.fetch_all("id ASC").await
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
        let result = sqlx::query("DELETE FROM todo_items WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn save_changes(&self) -> Result<u64> {
        let mut tracker = self.tracker.lock().await;
        if !tracker.has_changes() {
            return Ok(0);
        }

        for interceptor in &self.interceptors {
            interceptor.saving_changes(&mut tracker);
        }

        let mut tx = self.pool.begin().await?;
        let mut affected = 0;

        for entry in tracker.pending() {
            let entity = entry.entity();
            let audit = entity.audit();

            let result = match entry.state() {
                EntityState::Added => sqlx::query(
                    r#"
                    INSERT INTO todo_items (id, title, note, priority, reminder,
                        created, created_by, last_modified, last_modified_by)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                    "#,
                ),
                EntityState::Modified | EntityState::Unchanged => sqlx::query(
                    r#"
                    UPDATE todo_items
                    SET title = $2, note = $3, priority = $4, reminder = $5,
                        created = $6, created_by = $7, last_modified = $8, last_modified_by = $9
                    WHERE id = $1
                    "#,
                ),
            }
            .bind(entity.id().as_uuid())
            .bind(&entity.title)
            .bind(&entity.note)
            .bind(entity.priority)
            .bind(entity.reminder)
            .bind(audit.created)
            .bind(&audit.created_by)
            .bind(audit.last_modified)
            .bind(&audit.last_modified_by)
            .execute(&mut *tx)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                    StoreError::DuplicateKey(entity.id().to_string())
                }
                e => StoreError::Database(e),
            })?;

            affected += result.rows_affected();
        }

        tx.commit().await?;
        tracker.accept_all_changes();

        tracing::debug!(affected, "changes saved");
        Ok(affected)
    }
}

#[async_trait]
impl TodoRepository for PostgresTodoRepository {
    async fn get_all_ordered_by_priority_no_tracking(&self) -> Result<Vec<TodoEntity>> {
        self.fetch_all("priority ASC, created ASC, id ASC").await
    }
}
