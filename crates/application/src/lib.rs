//! Application layer for the to-do service.
//!
//! This crate provides:
//! - The [`Envelope`] returned by every request
//! - The [`Validatable`] and [`Request`] traits for commands and queries
//! - The [`Handler`] contract and the decorators composed around it
//! - To-do commands, queries, handlers, and their registry

pub mod decorators;
pub mod envelope;
pub mod error;
pub mod handler;
pub mod messages;
pub mod request;
pub mod todo;

pub use decorators::{Pipeline, UnhandledErrorDecorator, ValidationDecorator, decorate};
pub use envelope::{Envelope, EnvelopeError};
pub use error::HandlerError;
pub use handler::Handler;
pub use request::{Request, RequestKind, Validatable, Validation};
pub use todo::{
    CreateTodo, CreateTodoHandler, DeleteTodo, DeleteTodoHandler, GetAllTodos,
    GetAllTodosHandler, GetTodo, GetTodoHandler, TodoResponse, UpdateTodo, UpdateTodoHandler,
};
