//! To-do item features.

pub mod commands;
pub mod handlers;
pub mod queries;
pub mod registry;
pub mod response;

pub use commands::{CreateTodo, DeleteTodo, UpdateTodo};
pub use handlers::{
    CreateTodoHandler, DeleteTodoHandler, GetAllTodosHandler, GetTodoHandler, UpdateTodoHandler,
};
pub use queries::{GetAllTodos, GetTodo};
pub use response::TodoResponse;
