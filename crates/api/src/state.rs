//! Shared application state.

use std::sync::Arc;

use common::UserId;
use store::{
    AuditableEntityInterceptor, Clock, InMemoryStore, PostgresStore, SystemClock, TodoRepository,
};

/// The configured storage backend.
#[derive(Clone)]
pub enum TodoStore {
    InMemory(InMemoryStore),
    Postgres(PostgresStore),
}

impl TodoStore {
    pub fn name(&self) -> &'static str {
        match self {
            TodoStore::InMemory(_) => "inmemory",
            TodoStore::Postgres(_) => "postgres",
        }
    }
}

/// State shared by every request.
#[derive(Clone)]
pub struct AppState {
    store: TodoStore,
    clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(store: TodoStore) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    pub fn with_clock(store: TodoStore, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &TodoStore {
        &self.store
    }

    /// Opens a repository session for one request, with audit stamping
    /// attributed to `user`.
    pub fn session(&self, user: UserId) -> Arc<dyn TodoRepository> {
        let audit = AuditableEntityInterceptor::new(self.clock.clone(), Arc::new(user));
        match &self.store {
            TodoStore::InMemory(store) => Arc::new(store.session().with_interceptor(audit)),
            TodoStore::Postgres(store) => Arc::new(store.session().with_interceptor(audit)),
        }
    }
}
