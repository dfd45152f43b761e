//! Read-only to-do requests.

use common::TodoId;
use serde::{Deserialize, Serialize};

use super::response::TodoResponse;
use crate::messages::validator_message;
use crate::request::{Request, RequestKind, Validatable, Validation};

/// Fetches a single item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetTodo {
    pub id: TodoId,
}

impl GetTodo {
    pub fn new(id: TodoId) -> Self {
        Self { id }
    }
}

impl Validatable for GetTodo {
    fn validate(&self) -> Validation {
        if self.id.is_nil() {
            return Validation::invalid(validator_message::INVALID_ID);
        }
        Validation::Valid
    }
}

impl Request for GetTodo {
    type Response = TodoResponse;
    const KIND: RequestKind = RequestKind::Query;
}

/// Lists every item, most urgent (lowest priority value) first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetAllTodos;

impl Validatable for GetAllTodos {}

impl Request for GetAllTodos {
    type Response = Vec<TodoResponse>;
    const KIND: RequestKind = RequestKind::Query;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_rejects_nil_id() {
        assert_eq!(
            GetTodo::new(TodoId::nil()).validate().message(),
            Some(validator_message::INVALID_ID)
        );
        assert!(GetTodo::new(TodoId::new()).validate().is_valid());
    }

    #[test]
    fn get_all_is_always_valid() {
        assert!(GetAllTodos.validate().is_valid());
        assert_eq!(GetAllTodos::type_name(), "GetAllTodos");
    }
}
