//! Persistence layer for the to-do service.
//!
//! Repositories are per-request units of work: reads may register entities
//! with a [`ChangeTracker`], and `save_changes` runs every registered
//! [`SaveChangesInterceptor`] over the pending entries before writing them.

pub mod audit;
pub mod entity;
pub mod error;
pub mod memory;
pub mod postgres;
pub mod repository;
pub mod tracker;

pub use audit::{
    AuditableEntityInterceptor, Clock, CurrentUser, FixedClock, SaveChangesInterceptor, SystemClock,
};
pub use common::{TodoId, UserId};
pub use entity::{AuditStamp, Auditable, Entity, TodoEntity, constraints};
pub use error::{Result, StoreError};
pub use memory::{InMemoryStore, InMemoryTodoRepository};
pub use postgres::{PostgresStore, PostgresTodoRepository};
pub use repository::{Repository, TodoRepository};
pub use tracker::{ChangeTracker, EntityEntry, EntityState};
