//! Builds the decorated pipeline for each to-do request.
//!
//! Callers never construct a bare handler; every entry point gets the
//! validation and unhandled-error decorators in the same order.

use store::TodoRepository;

use super::handlers::{
    CreateTodoHandler, DeleteTodoHandler, GetAllTodosHandler, GetTodoHandler, UpdateTodoHandler,
};
use crate::decorators::{Pipeline, decorate};

pub fn create_todo<R: TodoRepository>(repository: R) -> Pipeline<CreateTodoHandler<R>> {
    decorate(CreateTodoHandler::new(repository))
}

pub fn update_todo<R: TodoRepository>(repository: R) -> Pipeline<UpdateTodoHandler<R>> {
    decorate(UpdateTodoHandler::new(repository))
}

pub fn delete_todo<R: TodoRepository>(repository: R) -> Pipeline<DeleteTodoHandler<R>> {
    decorate(DeleteTodoHandler::new(repository))
}

pub fn get_todo<R: TodoRepository>(repository: R) -> Pipeline<GetTodoHandler<R>> {
    decorate(GetTodoHandler::new(repository))
}

pub fn get_all_todos<R: TodoRepository>(repository: R) -> Pipeline<GetAllTodosHandler<R>> {
    decorate(GetAllTodosHandler::new(repository))
}
