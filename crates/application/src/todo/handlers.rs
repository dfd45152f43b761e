//! Handlers for the to-do requests.
//!
//! Each handler owns the repository session it was built with; a session
//! is meant to serve a single request.

use async_trait::async_trait;
use store::{Entity, TodoEntity, TodoRepository};

use super::commands::{CreateTodo, DeleteTodo, UpdateTodo};
use super::queries::{GetAllTodos, GetTodo};
use super::response::TodoResponse;
use crate::envelope::Envelope;
use crate::error::HandlerError;
use crate::handler::Handler;
use crate::messages::error_message;

pub struct CreateTodoHandler<R> {
    repository: R,
}

impl<R: TodoRepository> CreateTodoHandler<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl<R: TodoRepository> Handler<CreateTodo> for CreateTodoHandler<R> {
    #[tracing::instrument(skip(self))]
    async fn handle(&self, request: CreateTodo) -> Result<Envelope<TodoResponse>, HandlerError> {
        let entity = TodoEntity::new(
            request.title,
            request.priority,
            request.note,
            request.reminder,
        );
        let entity = self.repository.add(entity).await?;

        if self.repository.save_changes().await? == 0 {
            return Ok(Envelope::failure(error_message::SOMETHING_WENT_WRONG, None));
        }

        tracing::info!(todo_id = %entity.id(), "todo created");
        Ok(Envelope::success(TodoResponse::from(entity)))
    }
}

pub struct UpdateTodoHandler<R> {
    repository: R,
}

impl<R: TodoRepository> UpdateTodoHandler<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl<R: TodoRepository> Handler<UpdateTodo> for UpdateTodoHandler<R> {
    #[tracing::instrument(skip(self), fields(todo_id = %request.id))]
    async fn handle(&self, request: UpdateTodo) -> Result<Envelope<TodoResponse>, HandlerError> {
        let Some(mut entity) = self.repository.get_by_id(request.id).await? else {
            return Ok(Envelope::failure(error_message::NOT_FOUND, None));
        };

        entity.title = request.title;
        entity.priority = request.priority;
        entity.note = Some(request.note.unwrap_or_default());
        let entity = self.repository.update(entity).await?;

        if self.repository.save_changes().await? == 0 {
            return Ok(Envelope::failure(error_message::SOMETHING_WENT_WRONG, None));
        }

        tracing::info!("todo updated");
        Ok(Envelope::success(TodoResponse::from(entity)))
    }
}

pub struct DeleteTodoHandler<R> {
    repository: R,
}

impl<R: TodoRepository> DeleteTodoHandler<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl<R: TodoRepository> Handler<DeleteTodo> for DeleteTodoHandler<R> {
    #[tracing::instrument(skip(self), fields(todo_id = %request.id))]
    async fn handle(&self, request: DeleteTodo) -> Result<Envelope<bool>, HandlerError> {
        if self.repository.delete(request.id).await? == 0 {
            return Ok(Envelope::failure(error_message::NOT_FOUND, None));
        }

        tracing::info!("todo deleted");
        Ok(Envelope::success(true))
    }
}

pub struct GetTodoHandler<R> {
    repository: R,
}

impl<R: TodoRepository> GetTodoHandler<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl<R: TodoRepository> Handler<GetTodo> for GetTodoHandler<R> {
    #[tracing::instrument(skip(self), fields(todo_id = %request.id))]
    async fn handle(&self, request: GetTodo) -> Result<Envelope<TodoResponse>, HandlerError> {
        Ok(match self.repository.get_by_id_no_tracking(request.id).await? {
            Some(entity) => Envelope::success(TodoResponse::from(entity)),
            None => Envelope::failure(error_message::NOT_FOUND, None),
        })
    }
}

pub struct GetAllTodosHandler<R> {
    repository: R,
}

impl<R: TodoRepository> GetAllTodosHandler<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl<R: TodoRepository> Handler<GetAllTodos> for GetAllTodosHandler<R> {
    #[tracing::instrument(skip(self))]
    async fn handle(
        &self,
        _request: GetAllTodos,
    ) -> Result<Envelope<Vec<TodoResponse>>, HandlerError> {
        let items = self
            .repository
            .get_all_ordered_by_priority_no_tracking()
            .await?;

        tracing::debug!(count = items.len(), "todos listed");
        Ok(Envelope::success(
            items.into_iter().map(TodoResponse::from).collect(),
        ))
    }
}
